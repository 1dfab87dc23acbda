//! Reminder selection: which contacts deserve a nudge right now.
//!
//! Contacts below [`REMINDER_BELOW`] become candidates. Two independent
//! dampening knobs from [`Settings`] can each suppress a candidate; neither can
//! force one through. Survivors are ranked most-urgent first and capped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::elapsed_days;
use crate::crm::types::{Contact, Settings};

/// Only contacts scoring below this are considered.
pub const REMINDER_BELOW: f64 = 40.0;
/// Contacts scoring below this get the `warm` tier.
pub const WARM_BELOW: f64 = 15.0;
/// In low-pressure mode, candidates scoring above this are suppressed.
pub const LOW_PRESSURE_MAX_HEALTH: f64 = 20.0;
/// Intensity below this counts as "quiet".
pub const QUIET_INTENSITY_BELOW: i64 = 30;
/// With quiet intensity, candidates scoring above this are suppressed.
pub const QUIET_MAX_HEALTH: f64 = 25.0;
/// Maximum number of reminders returned.
pub const MAX_REMINDERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Drifting; a light nudge.
    Gentle,
    /// Well past due; a warmer, more direct nudge.
    Warm,
}

impl Priority {
    pub fn for_health(health: f64) -> Self {
        if health < WARM_BELOW {
            Self::Warm
        } else {
            Self::Gentle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gentle => "gentle",
            Self::Warm => "warm",
        }
    }

    /// Fixed message template for this tier.
    pub fn message(&self, contact_name: &str) -> String {
        match self {
            Self::Warm => format!(
                "It's been too long since you talked with {contact_name}. A warm call could mean a lot right now."
            ),
            Self::Gentle => format!(
                "It's been a while since you connected with {contact_name}. Maybe a quick message?"
            ),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One actionable reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// Stable per contact: `reminder-<contact_id>`.
    pub id: String,
    pub contact_id: String,
    pub contact_name: String,
    pub relationship_tag: String,
    pub avatar_color: String,
    pub message: String,
    pub health: f64,
    /// Whole days past the cadence; 0 when not yet overdue or never contacted.
    pub days_overdue: i64,
    pub priority: Priority,
    pub status: String,
}

/// Ranked, capped reminders plus the uncapped count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderBatch {
    pub reminders: Vec<Reminder>,
    pub total: usize,
}

/// Whether the user's dampening settings suppress a candidate at `health`.
pub fn is_suppressed(health: f64, settings: &Settings) -> bool {
    if settings.low_pressure_mode && health > LOW_PRESSURE_MAX_HEALTH {
        return true;
    }
    settings.notification_intensity < QUIET_INTENSITY_BELOW && health > QUIET_MAX_HEALTH
}

/// `max(0, floor(elapsed_days - frequency_days))`.
pub fn days_overdue(last_contact_at: Option<&str>, frequency_days: i64, now: DateTime<Utc>) -> i64 {
    last_contact_at
        .and_then(|raw| elapsed_days(raw, now))
        .map(|elapsed| (elapsed - frequency_days as f64).floor().max(0.0) as i64)
        .unwrap_or(0)
}

/// Select reminders for the active contacts under the given settings.
pub fn select(contacts: &[Contact], settings: &Settings, now: DateTime<Utc>) -> ReminderBatch {
    let mut reminders: Vec<Reminder> = contacts
        .iter()
        .filter_map(|contact| {
            let health = contact.health_at(now);
            if health >= REMINDER_BELOW || is_suppressed(health, settings) {
                return None;
            }
            let priority = Priority::for_health(health);
            Some(Reminder {
                id: format!("reminder-{}", contact.id),
                contact_id: contact.id.clone(),
                contact_name: contact.name.clone(),
                relationship_tag: contact.relationship_tag.clone(),
                avatar_color: contact.avatar_color.clone(),
                message: priority.message(&contact.name),
                health,
                days_overdue: days_overdue(
                    contact.last_contact_at.as_deref(),
                    contact.frequency_days,
                    now,
                ),
                priority,
                status: "pending".into(),
            })
        })
        .collect();

    reminders.sort_by(|a, b| a.health.total_cmp(&b.health));
    let total = reminders.len();
    reminders.truncate(MAX_REMINDERS);

    tracing::debug!(total, returned = reminders.len(), "reminders selected");
    ReminderBatch { reminders, total }
}
