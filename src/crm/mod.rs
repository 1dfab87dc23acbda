//! Storage-backed records: contacts, interactions, goals, settings, premium
//! state, push tokens, shared invites, and whole-dataset operations.
//!
//! Every function takes a borrowed [`rusqlite::Connection`] and is synchronous;
//! async callers wrap them in `spawn_blocking`. Reads that return contacts take
//! the request's `now` and fill in `connection_health`.

pub mod contacts;
pub mod data;
pub mod goals;
pub mod interactions;
pub mod premium;
pub mod push_tokens;
pub mod settings;
pub mod shared;
pub mod types;

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
    #[error("contact limit of {limit} reached for the {tier} plan")]
    LimitReached { tier: &'static str, limit: u32 },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrmError>;

impl CrmError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Storage form of a timestamp: fixed-width RFC 3339 in UTC, so that string
/// comparison in SQL matches chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read a JSON-encoded string list column, treating NULL or garbage as empty.
pub(crate) fn json_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let a = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let b = a + Duration::milliseconds(1);
        let c = a + Duration::days(1);
        assert!(format_timestamp(a) < format_timestamp(b));
        assert!(format_timestamp(b) < format_timestamp(c));
        assert_eq!(format_timestamp(a), "2026-03-15T12:00:00.000000Z");
    }

    #[test]
    fn json_list_tolerates_bad_input() {
        assert_eq!(json_list(Some(r#"["a","b"]"#.into())), vec!["a", "b"]);
        assert!(json_list(Some("not json".into())).is_empty());
        assert!(json_list(None).is_empty());
    }

    #[test]
    fn not_found_message_names_the_kind() {
        assert_eq!(CrmError::not_found("Contact", "x").to_string(), "Contact not found");
    }
}
