//! Connection-health scoring.
//!
//! A contact's health is a linear decay from 100 (just contacted) to 0 (as
//! overdue as its cadence or worse), rounded to one decimal:
//!
//! ```text
//! health = clamp((1 - elapsed_days / frequency_days) * 100, 0, 100)
//! ```
//!
//! The score is never stored; every reader recomputes it against a single
//! `now` captured once per request so that one response is internally
//! consistent. [`dashboard`] and [`reminders`] are the two aggregate consumers.

pub mod dashboard;
pub mod reminders;

use chrono::{DateTime, NaiveDateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Health score in `[0.0, 100.0]` for a contact last reached at
/// `last_contact_at` with a desired cadence of `frequency_days`.
///
/// Never contacted, unparseable timestamps, and non-positive cadences all
/// score `0.0`. The last case is a data-integrity fault (the write path
/// rejects it) and is logged rather than propagated so one bad record cannot
/// take down a dashboard.
pub fn connection_health(
    last_contact_at: Option<&str>,
    frequency_days: i64,
    now: DateTime<Utc>,
) -> f64 {
    let Some(raw) = last_contact_at else {
        return 0.0;
    };

    if frequency_days <= 0 {
        tracing::warn!(frequency_days, "non-positive contact frequency, scoring as 0");
        return 0.0;
    }

    match elapsed_days(raw, now) {
        Some(elapsed) => health_from_elapsed(elapsed, frequency_days),
        None => {
            tracing::debug!(timestamp = %raw, "unparseable last-contact timestamp, scoring as 0");
            0.0
        }
    }
}

/// The decay curve itself, for an already-computed elapsed time.
///
/// Negative `elapsed_days` (clock skew) saturate at 100.
pub fn health_from_elapsed(elapsed_days: f64, frequency_days: i64) -> f64 {
    if frequency_days <= 0 || !elapsed_days.is_finite() {
        return 0.0;
    }
    let raw = (1.0 - elapsed_days / frequency_days as f64) * 100.0;
    round1(raw.clamp(0.0, 100.0))
}

/// Fractional days between `last_contact_at` and `now`. Negative if the
/// timestamp lies in the future.
pub fn elapsed_days(last_contact_at: &str, now: DateTime<Utc>) -> Option<f64> {
    let last = parse_timestamp(last_contact_at)?;
    let millis = (now - last).num_milliseconds() as f64;
    Some(millis / 1000.0 / SECONDS_PER_DAY)
}

/// Parse an ISO 8601 timestamp. `Z`, `+00:00`, any other explicit offset, and
/// no offset at all (read as UTC) are accepted.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
