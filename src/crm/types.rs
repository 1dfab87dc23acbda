//! Record types for contacts, interactions, goals, settings, and the premium
//! and sharing features.
//!
//! Database rows map 1:1 onto these structs; request payloads use the
//! `New*`/`*Update` variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health;

/// A tracked person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// UUID v7 primary key.
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Free-form bucket such as `"Family"` or `"Mentor"`. Not used for scoring.
    pub relationship_tag: String,
    /// Desired number of days between contacts. Always `>= 1` once stored.
    pub frequency_days: i64,
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub avatar_color: String,
    pub notes: Option<String>,
    /// RFC 3339 timestamp of the last logged interaction; `None` if never contacted.
    /// Travels as `last_interaction_at`, the name mobile clients read.
    #[serde(rename = "last_interaction_at", alias = "last_contact_at")]
    pub last_contact_at: Option<String>,
    #[serde(default)]
    pub interaction_count: u32,
    /// Derived on every read from `last_contact_at`, `frequency_days`, and the
    /// request's `now`. Whatever value is stored or imported is ignored.
    #[serde(default)]
    pub connection_health: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Contact {
    /// Recompute `connection_health` against `now`.
    pub fn with_health(mut self, now: DateTime<Utc>) -> Self {
        self.connection_health = self.health_at(now);
        self
    }

    /// Health score at `now` without touching the cached field.
    pub fn health_at(&self, now: DateTime<Utc>) -> f64 {
        health::connection_health(self.last_contact_at.as_deref(), self.frequency_days, now)
    }
}

/// Payload for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_tag")]
    pub relationship_tag: String,
    #[serde(default = "default_frequency")]
    pub frequency_days: i64,
    #[serde(default)]
    pub is_pinned: bool,
    pub avatar_color: Option<String>,
    pub notes: Option<String>,
}

fn default_tag() -> String {
    "Friend".into()
}

fn default_frequency() -> i64 {
    7
}

impl NewContact {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
            relationship_tag: default_tag(),
            frequency_days: default_frequency(),
            is_pinned: false,
            avatar_color: None,
            notes: None,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub relationship_tag: Option<String>,
    pub frequency_days: Option<i64>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
    pub avatar_color: Option<String>,
    pub notes: Option<String>,
}

/// Structured analysis of an interaction's free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionDigest {
    pub summary: String,
    pub key_highlights: Vec<String>,
    pub action_items: Vec<String>,
    pub emotional_cues: Vec<String>,
    pub promises: Vec<String>,
    pub important_dates: Vec<String>,
}

/// A logged touchpoint with a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub contact_id: String,
    /// `"call"`, `"text"`, `"note"`, …
    pub interaction_type: String,
    pub notes: Option<String>,
    pub voice_transcript: Option<String>,
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub key_highlights: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub emotional_cues: Vec<String>,
    #[serde(default)]
    pub promises: Vec<String>,
    #[serde(default)]
    pub important_dates: Vec<String>,
    pub duration_minutes: Option<i64>,
    pub created_at: String,
}

/// Payload for logging an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInteraction {
    pub contact_id: String,
    #[serde(default = "default_interaction_type")]
    pub interaction_type: String,
    pub notes: Option<String>,
    pub voice_transcript: Option<String>,
    pub duration_minutes: Option<i64>,
}

fn default_interaction_type() -> String {
    "note".into()
}

impl NewInteraction {
    /// Text worth sending to the summarizer: notes first, then the transcript.
    pub fn analyzable_text(&self) -> Option<&str> {
        [self.notes.as_deref(), self.voice_transcript.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
    }
}

/// Lifecycle state of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown goal status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub target_contact_ids: Vec<String>,
    /// Completion in `[0, 100]`.
    pub progress: f64,
    pub status: GoalStatus,
    pub target_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub target_contact_ids: Vec<String>,
    pub target_date: Option<String>,
}

/// User preferences. Only `low_pressure_mode` and `notification_intensity`
/// influence reminder selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// 0–100; below 30 only the more urgent reminders are surfaced.
    pub notification_intensity: i64,
    pub low_pressure_mode: bool,
    pub theme_mode: String,
    pub onboarding_completed: bool,
    pub privacy_mode: bool,
    pub data_encryption: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_intensity: 50,
            low_pressure_mode: false,
            theme_mode: "system".into(),
            onboarding_completed: false,
            privacy_mode: true,
            data_encryption: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub notification_intensity: Option<i64>,
    pub low_pressure_mode: Option<bool>,
    pub theme_mode: Option<String>,
    pub onboarding_completed: Option<bool>,
    pub privacy_mode: Option<bool>,
    pub data_encryption: Option<bool>,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Plus,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "plus" => Ok(Self::Plus),
            "premium" => Ok(Self::Premium),
            _ => Err(format!("Invalid plan: {s}")),
        }
    }
}

/// Shared-mode flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteMode {
    Couple,
    Coparent,
}

impl InviteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Couple => "couple",
            Self::Coparent => "coparent",
        }
    }
}

impl std::str::FromStr for InviteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "couple" => Ok(Self::Couple),
            "coparent" => Ok(Self::Coparent),
            _ => Err(format!("unknown shared mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedInvite {
    pub id: String,
    pub partner_name: String,
    pub partner_email: Option<String>,
    pub shared_contact_ids: Vec<String>,
    pub mode: InviteMode,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSharedInvite {
    pub partner_name: String,
    pub partner_email: Option<String>,
    #[serde(default)]
    pub shared_contact_ids: Vec<String>,
    #[serde(default = "default_invite_mode")]
    pub mode: InviteMode,
}

fn default_invite_mode() -> InviteMode {
    InviteMode::Couple
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushToken {
    pub token: String,
    pub device_id: Option<String>,
    pub platform: Option<String>,
    pub registered_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_defaults_from_json() {
        let c: NewContact = serde_json::from_str(r#"{"name": "Sam"}"#).unwrap();
        assert_eq!(c.relationship_tag, "Friend");
        assert_eq!(c.frequency_days, 7);
        assert!(!c.is_pinned);
    }

    #[test]
    fn contact_last_interaction_wire_name() {
        let json = r##"{
            "id": "c1", "name": "Sam", "phone": null, "email": null,
            "relationship_tag": "Friend", "frequency_days": 7, "is_pinned": false,
            "avatar_color": "#40916C", "notes": null,
            "last_interaction_at": "2026-01-01T00:00:00Z",
            "created_at": "2026-01-01T00:00:00Z", "updated_at": "2026-01-01T00:00:00Z"
        }"##;
        let c: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(c.last_contact_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert_eq!(c.connection_health, 0.0);

        let out = serde_json::to_value(&c).unwrap();
        assert_eq!(out["last_interaction_at"], "2026-01-01T00:00:00Z");
        assert!(out.get("last_contact_at").is_none());

        let renamed = json.replace("last_interaction_at", "last_contact_at");
        let c: Contact = serde_json::from_str(&renamed).unwrap();
        assert_eq!(c.last_contact_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn analyzable_text_prefers_notes_then_transcript() {
        let mut n: NewInteraction =
            serde_json::from_str(r#"{"contact_id": "c1", "notes": "  ", "voice_transcript": "hello there"}"#)
                .unwrap();
        assert_eq!(n.interaction_type, "note");
        assert_eq!(n.analyzable_text(), Some("hello there"));
        n.notes = Some("caught up over coffee".into());
        assert_eq!(n.analyzable_text(), Some("caught up over coffee"));
    }

    #[test]
    fn enum_round_trip_through_str() {
        assert_eq!("plus".parse::<Tier>().unwrap(), Tier::Plus);
        assert!("gold".parse::<Tier>().unwrap_err().contains("Invalid plan"));
        assert_eq!("completed".parse::<GoalStatus>().unwrap().as_str(), "completed");
        assert_eq!("coparent".parse::<InviteMode>().unwrap(), InviteMode::Coparent);
    }
}
