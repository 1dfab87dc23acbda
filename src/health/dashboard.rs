//! Fleet-wide views over connection health: the dashboard summary and the
//! home-screen widget.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::round1;
use crate::crm::types::Contact;

/// Contacts scoring below this are listed under `needs_attention`.
pub const NEEDS_ATTENTION_BELOW: f64 = 30.0;
/// At most this many contacts are listed under `needs_attention`.
pub const NEEDS_ATTENTION_LIMIT: usize = 5;
/// Trailing window for `weekly_interactions`, in days.
pub const WEEK_DAYS: i64 = 7;
/// Trailing window for `monthly_interactions`, in days.
pub const MONTH_DAYS: i64 = 30;
/// Most pinned contacts shown on the widget.
pub const WIDGET_PINNED_LIMIT: usize = 4;
/// Most lowest-health contacts shown on the widget.
pub const WIDGET_TOP_LIMIT: usize = 3;

/// Compact per-contact health entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactHealth {
    pub id: String,
    pub name: String,
    pub health: f64,
    pub relationship_tag: String,
}

/// Response of `GET /api/dashboard`. Every field is always present.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub overall_score: f64,
    pub total_contacts: usize,
    pub needs_attention: Vec<ContactHealth>,
    pub suggested_contact: Option<ContactHealth>,
    pub weekly_interactions: u64,
    pub monthly_interactions: u64,
    pub category_breakdown: HashMap<String, u64>,
}

impl DashboardSummary {
    fn empty() -> Self {
        Self {
            overall_score: 0.0,
            total_contacts: 0,
            needs_attention: Vec::new(),
            suggested_contact: None,
            weekly_interactions: 0,
            monthly_interactions: 0,
            category_breakdown: HashMap::new(),
        }
    }
}

/// A contact paired with its score for one pass.
struct Scored<'a> {
    contact: &'a Contact,
    health: f64,
}

impl Scored<'_> {
    fn entry(&self) -> ContactHealth {
        ContactHealth {
            id: self.contact.id.clone(),
            name: self.contact.name.clone(),
            health: self.health,
            relationship_tag: self.contact.relationship_tag.clone(),
        }
    }
}

fn score_all(contacts: &[Contact], now: DateTime<Utc>) -> Vec<Scored<'_>> {
    contacts
        .iter()
        .map(|contact| Scored {
            contact,
            health: contact.health_at(now),
        })
        .collect()
}

fn mean_score(scored: &[Scored<'_>]) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }
    let sum: f64 = scored.iter().map(|s| s.health).sum();
    round1(sum / scored.len() as f64)
}

/// Lowest-health contact among the pinned ones, or among everyone when
/// nothing is pinned. Pinning is a hard filter, not a bonus.
fn suggest<'a, 'b>(scored: &'b [Scored<'a>]) -> Option<&'b Scored<'a>> {
    let any_pinned = scored.iter().any(|s| s.contact.is_pinned);
    scored
        .iter()
        .filter(|s| !any_pinned || s.contact.is_pinned)
        .min_by(|a, b| a.health.total_cmp(&b.health))
}

/// Build the dashboard for the active contact set.
///
/// `count_since` answers "how many interactions were logged at or after this
/// instant"; it is called once for the weekly and once for the monthly window,
/// and not at all for an empty contact set.
pub fn summarize<E>(
    contacts: &[Contact],
    now: DateTime<Utc>,
    mut count_since: impl FnMut(DateTime<Utc>) -> Result<u64, E>,
) -> Result<DashboardSummary, E> {
    if contacts.is_empty() {
        return Ok(DashboardSummary::empty());
    }

    let scored = score_all(contacts, now);

    let mut at_risk: Vec<&Scored<'_>> = scored
        .iter()
        .filter(|s| s.health < NEEDS_ATTENTION_BELOW)
        .collect();
    at_risk.sort_by(|a, b| a.health.total_cmp(&b.health));
    let needs_attention = at_risk
        .into_iter()
        .take(NEEDS_ATTENTION_LIMIT)
        .map(Scored::entry)
        .collect();

    let mut category_breakdown = HashMap::new();
    for contact in contacts {
        *category_breakdown
            .entry(contact.relationship_tag.clone())
            .or_insert(0u64) += 1;
    }

    let weekly_interactions = count_since(now - Duration::days(WEEK_DAYS))?;
    let monthly_interactions = count_since(now - Duration::days(MONTH_DAYS))?;

    Ok(DashboardSummary {
        overall_score: mean_score(&scored),
        total_contacts: contacts.len(),
        needs_attention,
        suggested_contact: suggest(&scored).map(Scored::entry),
        weekly_interactions,
        monthly_interactions,
        category_breakdown,
    })
}

/// Pinned-contact tile in the widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetContact {
    pub id: String,
    pub name: String,
    pub health: f64,
    pub avatar_color: String,
    pub relationship_tag: String,
}

/// Response of `GET /api/widget/data`.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetData {
    pub overall_score: f64,
    pub pinned_contacts: Vec<WidgetContact>,
    /// Most at-risk contacts overall, most urgent first.
    pub top_contacts: Vec<WidgetContact>,
    pub suggested_name: Option<String>,
}

/// Compact home-screen view built from the same scores as the dashboard.
pub fn widget(contacts: &[Contact], now: DateTime<Utc>) -> WidgetData {
    let scored = score_all(contacts, now);
    let tile = |s: &Scored<'_>| WidgetContact {
        id: s.contact.id.clone(),
        name: s.contact.name.clone(),
        health: s.health,
        avatar_color: s.contact.avatar_color.clone(),
        relationship_tag: s.contact.relationship_tag.clone(),
    };

    let pinned_contacts = scored
        .iter()
        .filter(|s| s.contact.is_pinned)
        .take(WIDGET_PINNED_LIMIT)
        .map(tile)
        .collect();

    let mut by_health: Vec<&Scored<'_>> = scored.iter().collect();
    by_health.sort_by(|a, b| a.health.total_cmp(&b.health));
    let top_contacts = by_health
        .into_iter()
        .take(WIDGET_TOP_LIMIT)
        .map(tile)
        .collect();

    WidgetData {
        overall_score: mean_score(&scored),
        pinned_contacts,
        top_contacts,
        suggested_name: suggest(&scored).map(|s| s.contact.name.clone()),
    }
}
