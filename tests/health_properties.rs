mod helpers;

use chrono::Duration;
use proptest::prelude::*;
use touchbase::crm::types::Settings;
use touchbase::health::reminders::{self, Priority, MAX_REMINDERS};
use touchbase::health::dashboard::{self, NEEDS_ATTENTION_LIMIT};
use touchbase::health::{connection_health, health_from_elapsed};

use helpers::{contact, fixed_now};

fn no_counts(_: chrono::DateTime<chrono::Utc>) -> Result<u64, std::convert::Infallible> {
    Ok(0)
}

#[test]
fn never_contacted_scores_zero() {
    for f in [1, 7, 30, 365] {
        assert_eq!(connection_health(None, f, fixed_now()), 0.0);
    }
}

#[test]
fn half_cadence_scores_fifty() {
    let c = contact("half", Some(fixed_now() - Duration::hours(84)), 7);
    assert_eq!(c.health_at(fixed_now()), 50.0);
}

#[test]
fn empty_dashboard_is_fully_populated() {
    let summary = dashboard::summarize(&[], fixed_now(), no_counts).unwrap();
    assert_eq!(summary.overall_score, 0.0);
    assert!(summary.needs_attention.is_empty());
    assert!(summary.suggested_contact.is_none());
    assert!(summary.category_breakdown.is_empty());
    assert_eq!(summary.total_contacts, 0);
}

#[test]
fn pinned_contact_wins_the_suggestion() {
    let now = fixed_now();
    // A: pinned at 60, B: unpinned at 10
    let mut a = contact("A", Some(now - Duration::hours(4 * 24)), 10);
    a.is_pinned = true;
    let b = contact("B", Some(now - Duration::hours(9 * 24)), 10);
    assert_eq!(a.health_at(now), 60.0);
    assert_eq!(b.health_at(now), 10.0);

    let summary = dashboard::summarize(&[a, b], now, no_counts).unwrap();
    assert_eq!(summary.suggested_contact.unwrap().name, "A");
}

#[test]
fn low_pressure_suppresses_mild_reminders() {
    let now = fixed_now();
    // health 25
    let c = contact("mild", Some(now - Duration::hours(18 * 24)), 24);
    assert_eq!(c.health_at(now), 25.0);
    let settings = Settings {
        low_pressure_mode: true,
        ..Settings::default()
    };
    assert!(reminders::select(&[c], &settings, now).reminders.is_empty());
}

#[test]
fn urgent_contact_gets_a_warm_reminder() {
    let now = fixed_now();
    let c = contact("urgent", Some(now - Duration::hours(9 * 24)), 10);
    let batch = reminders::select(&[c], &Settings::default(), now);
    assert_eq!(batch.reminders.len(), 1);
    assert_eq!(batch.reminders[0].priority, Priority::Warm);
}

proptest! {
    #[test]
    fn contact_at_now_scores_full(f in 1i64..1000) {
        prop_assert_eq!(health_from_elapsed(0.0, f), 100.0);
    }

    #[test]
    fn full_cadence_scores_zero(f in 1i64..1000) {
        prop_assert_eq!(health_from_elapsed(f as f64, f), 0.0);
    }

    #[test]
    fn health_is_bounded(elapsed in -1.0e6f64..1.0e6, f in 1i64..1000) {
        let h = health_from_elapsed(elapsed, f);
        prop_assert!((0.0..=100.0).contains(&h));
    }

    #[test]
    fn health_never_rises_with_time(a in 0.0f64..500.0, b in 0.0f64..500.0, f in 1i64..400) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(health_from_elapsed(early, f) >= health_from_elapsed(late, f));
    }

    #[test]
    fn healthy_contacts_get_no_reminders(hours in proptest::collection::vec(0i64..100, 0..30)) {
        let now = fixed_now();
        // a 42-day cadence keeps anything under 100h at 90 or above
        let contacts: Vec<_> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| contact(&format!("c{i}"), Some(now - Duration::hours(*h)), 42))
            .collect();
        prop_assert!(contacts.iter().all(|c| c.health_at(now) >= 40.0));
        let batch = reminders::select(&contacts, &Settings::default(), now);
        prop_assert!(batch.reminders.is_empty());
        prop_assert_eq!(batch.total, 0);
    }

    #[test]
    fn aggregates_are_capped_and_sorted(days in proptest::collection::vec(0i64..40, 0..40)) {
        let now = fixed_now();
        let contacts: Vec<_> = days
            .iter()
            .enumerate()
            .map(|(i, d)| contact(&format!("c{i}"), Some(now - Duration::days(*d)), 30))
            .collect();

        let summary = dashboard::summarize(&contacts, now, no_counts).unwrap();
        prop_assert!(summary.needs_attention.len() <= NEEDS_ATTENTION_LIMIT);
        prop_assert!(summary
            .needs_attention
            .windows(2)
            .all(|w| w[0].health <= w[1].health));

        let batch = reminders::select(&contacts, &Settings::default(), now);
        let qualifying = contacts.iter().filter(|c| c.health_at(now) < 40.0).count();
        prop_assert!(batch.reminders.len() <= MAX_REMINDERS);
        prop_assert_eq!(batch.total, qualifying);
        prop_assert!(batch.reminders.windows(2).all(|w| w[0].health <= w[1].health));
    }
}
