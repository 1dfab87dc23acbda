//! Outbound services: language model, speech-to-text, payments, and push.
//!
//! Each service sits behind a trait so the HTTP layer and tests can swap in
//! stubs. Failures are reported as [`IntegrationError`], never papered over
//! with placeholder content.

pub mod llm;
pub mod payment;
pub mod push;
pub mod speech;

use std::time::Duration;

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// No credentials or endpoint configured for the service.
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },
    /// Transport failure or non-success HTTP status.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },
    /// The service answered, but not with anything we can use.
    #[error("{service} returned an unusable response: {reason}")]
    Unusable { service: &'static str, reason: String },
}

impl IntegrationError {
    pub fn unavailable(service: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            service,
            reason: reason.to_string(),
        }
    }

    pub fn unusable(service: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Unusable {
            service,
            reason: reason.to_string(),
        }
    }
}

/// Shared reqwest client construction.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_default()
}

/// Strip a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model reply as JSON, tolerating a code fence around it.
pub fn parse_json_reply<T: DeserializeOwned>(
    service: &'static str,
    reply: &str,
) -> Result<T, IntegrationError> {
    serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| IntegrationError::unusable(service, format!("invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_variants_are_stripped() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fence("  ```json\n{}\n```  "), "{}");
    }

    #[test]
    fn parse_reports_unusable() {
        let ok: Vec<u32> = parse_json_reply("llm", "```json\n[1, 2]\n```").unwrap();
        assert_eq!(ok, vec![1, 2]);

        let err = parse_json_reply::<Vec<u32>>("llm", "sorry, I can't").unwrap_err();
        assert!(matches!(err, IntegrationError::Unusable { service: "llm", .. }));
    }
}
