//! Whole-dataset operations: export, delete-all, and sample-data seeding.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;

use super::types::{
    Contact, Goal, Interaction, InteractionDigest, NewContact, NewInteraction, Settings,
    SettingsUpdate, SharedInvite,
};
use super::{contacts, format_timestamp, goals, interactions, settings, shared, Result};

/// Everything the user owns, as one JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub contacts: Vec<Contact>,
    pub interactions: Vec<Interaction>,
    pub goals: Vec<Goal>,
    pub settings: Settings,
    pub shared_invites: Vec<SharedInvite>,
    pub exported_at: String,
}

pub fn export_all(conn: &Connection, now: DateTime<Utc>) -> Result<Export> {
    let mut all_contacts = contacts::list_contacts(conn, false, None, now)?;
    all_contacts.extend(contacts::list_contacts(conn, true, None, now)?);

    let export = Export {
        contacts: all_contacts,
        interactions: interactions::list_all(conn)?,
        goals: goals::list_goals(conn, None)?,
        settings: settings::get_settings(conn)?,
        shared_invites: shared::list_invites(conn)?,
        exported_at: format_timestamp(now),
    };
    tracing::info!(
        contacts = export.contacts.len(),
        interactions = export.interactions.len(),
        "data exported"
    );
    Ok(export)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteCounts {
    pub contacts: usize,
    pub interactions: usize,
    pub goals: usize,
    pub shared_invites: usize,
}

/// Remove all personal data and reset settings to defaults. Billing records
/// (orders and the subscription) are kept.
pub fn delete_all(conn: &mut Connection) -> Result<DeleteCounts> {
    let tx = conn.transaction()?;
    let counts = DeleteCounts {
        interactions: tx.execute("DELETE FROM interactions", [])?,
        contacts: tx.execute("DELETE FROM contacts", [])?,
        goals: tx.execute("DELETE FROM goals", [])?,
        shared_invites: tx.execute("DELETE FROM shared_invites", [])?,
    };
    tx.execute("DELETE FROM settings", [])?;
    tx.execute("INSERT INTO settings (id) VALUES ('default')", [])?;
    tx.commit()?;

    tracing::warn!(
        contacts = counts.contacts,
        interactions = counts.interactions,
        goals = counts.goals,
        "all user data deleted"
    );
    Ok(counts)
}

struct SampleContact {
    name: &'static str,
    tag: &'static str,
    frequency_days: i64,
    pinned: bool,
    phone: &'static str,
    /// Hours before `now` of each sample interaction, oldest first.
    touches_hours_ago: &'static [i64],
}

const SAMPLE_CONTACTS: [SampleContact; 6] = [
    SampleContact {
        name: "Mom",
        tag: "Family",
        frequency_days: 3,
        pinned: true,
        phone: "+1234567890",
        touches_hours_ago: &[240, 120, 30],
    },
    SampleContact {
        name: "Dad",
        tag: "Family",
        frequency_days: 5,
        pinned: true,
        phone: "+1234567891",
        touches_hours_ago: &[400, 130],
    },
    SampleContact {
        name: "Sarah",
        tag: "Friend",
        frequency_days: 7,
        pinned: true,
        phone: "+1234567892",
        touches_hours_ago: &[500, 290],
    },
    SampleContact {
        name: "Alex",
        tag: "Friend",
        frequency_days: 14,
        pinned: false,
        phone: "+1234567893",
        touches_hours_ago: &[620],
    },
    SampleContact {
        name: "Dr. Williams",
        tag: "Mentor",
        frequency_days: 30,
        pinned: false,
        phone: "+1234567894",
        touches_hours_ago: &[700, 300],
    },
    SampleContact {
        name: "Jamie",
        tag: "Partner",
        frequency_days: 1,
        pinned: true,
        phone: "+1234567895",
        touches_hours_ago: &[50, 20, 6],
    },
];

const SAMPLE_NOTES: [&str; 5] = [
    "Had a great chat about their weekend plans.",
    "Quick check-in, they seemed happy.",
    "Talked about upcoming birthday celebration.",
    "Discussed their new job, very excited.",
    "They mentioned feeling stressed about work.",
];

const SAMPLE_TYPES: [&str; 3] = ["call", "text", "note"];

#[derive(Debug, Clone, Serialize)]
pub struct SeedOutcome {
    pub message: String,
    pub contact_ids: Vec<String>,
    /// Contacts already present when seeding was skipped.
    pub count: u64,
}

/// Populate an empty database with sample contacts and interactions.
/// Does nothing when any contact already exists.
pub fn seed(conn: &mut Connection, now: DateTime<Utc>) -> Result<SeedOutcome> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::info!(existing, "seed skipped, contacts already present");
        return Ok(SeedOutcome {
            message: "Data already seeded".into(),
            contact_ids: Vec::new(),
            count: existing as u64,
        });
    }

    let mut contact_ids = Vec::with_capacity(SAMPLE_CONTACTS.len());
    let mut note_index = 0usize;

    for (i, sample) in SAMPLE_CONTACTS.iter().enumerate() {
        let new = NewContact {
            phone: Some(sample.phone.into()),
            relationship_tag: sample.tag.into(),
            frequency_days: sample.frequency_days,
            is_pinned: sample.pinned,
            avatar_color: Some(contacts::AVATAR_COLORS[i % contacts::AVATAR_COLORS.len()].into()),
            ..NewContact::named(sample.name)
        };
        let created_at = now - Duration::days(60);
        let contact = contacts::create_contact(conn, &new, created_at)?;

        for &hours in sample.touches_hours_ago {
            let interaction = NewInteraction {
                contact_id: contact.id.clone(),
                interaction_type: SAMPLE_TYPES[note_index % SAMPLE_TYPES.len()].into(),
                notes: Some(SAMPLE_NOTES[note_index % SAMPLE_NOTES.len()].into()),
                voice_transcript: None,
                duration_minutes: Some(5 + (note_index as i64 * 7) % 40),
            };
            let digest = InteractionDigest {
                summary: "A warm conversation covering recent updates.".into(),
                key_highlights: vec!["Caught up on recent news".into()],
                emotional_cues: vec!["warm".into(), "connected".into()],
                ..Default::default()
            };
            interactions::create_interaction(
                conn,
                &interaction,
                Some(&digest),
                now - Duration::hours(hours),
            )?;
            note_index += 1;
        }
        contact_ids.push(contact.id);
    }

    settings::update_settings(
        conn,
        &SettingsUpdate {
            onboarding_completed: Some(false),
            ..Default::default()
        },
    )?;

    tracing::info!(contacts = contact_ids.len(), "sample data seeded");
    Ok(SeedOutcome {
        message: format!("Seeded {} contacts with interactions", contact_ids.len()),
        count: contact_ids.len() as u64,
        contact_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::types::NewGoal;
    use crate::db;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn seed_is_deterministic_and_idempotent() {
        let mut conn = db::open_memory_database().unwrap();
        let first = seed(&mut conn, now()).unwrap();
        assert_eq!(first.contact_ids.len(), 6);

        let again = seed(&mut conn, now()).unwrap();
        assert!(again.contact_ids.is_empty());
        assert_eq!(again.count, 6);
        assert_eq!(again.message, "Data already seeded");

        let mut other = db::open_memory_database().unwrap();
        seed(&mut other, now()).unwrap();
        let healths = |c: &Connection| -> Vec<(String, f64)> {
            contacts::list_active(c, now())
                .unwrap()
                .into_iter()
                .map(|c| (c.name, c.connection_health))
                .collect()
        };
        assert_eq!(healths(&conn), healths(&other));
    }

    #[test]
    fn seeded_contacts_have_consistent_counts() {
        let mut conn = db::open_memory_database().unwrap();
        seed(&mut conn, now()).unwrap();
        let all = contacts::list_active(&conn, now()).unwrap();
        let mom = all.iter().find(|c| c.name == "Mom").unwrap();
        assert_eq!(mom.interaction_count, 3);
        // Last touch 30 hours ago on a 3-day cadence.
        assert_eq!(mom.connection_health, 58.3);
        assert_eq!(all.iter().filter(|c| c.is_pinned).count(), 4);
        assert_eq!(interactions::list_all(&conn).unwrap().len(), 13);
    }

    #[test]
    fn delete_all_clears_personal_data_and_resets_settings() {
        let mut conn = db::open_memory_database().unwrap();
        seed(&mut conn, now()).unwrap();
        goals::create_goal(
            &conn,
            &NewGoal {
                title: "Weekly calls".into(),
                description: None,
                target_contact_ids: vec![],
                target_date: None,
            },
            now(),
        )
        .unwrap();
        settings::update_settings(
            &conn,
            &SettingsUpdate {
                low_pressure_mode: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let counts = delete_all(&mut conn).unwrap();
        assert_eq!(counts.contacts, 6);
        assert_eq!(counts.interactions, 13);
        assert_eq!(counts.goals, 1);

        let export = export_all(&conn, now()).unwrap();
        assert!(export.contacts.is_empty());
        assert!(export.interactions.is_empty());
        assert!(export.goals.is_empty());
        assert_eq!(export.settings, Settings::default());
    }

    #[test]
    fn export_includes_archived_contacts() {
        let mut conn = db::open_memory_database().unwrap();
        seed(&mut conn, now()).unwrap();
        let alex = contacts::list_active(&conn, now())
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Alex")
            .unwrap();
        contacts::update_contact(
            &conn,
            &alex.id,
            &crate::crm::types::ContactUpdate {
                is_archived: Some(true),
                ..Default::default()
            },
            now(),
        )
        .unwrap();

        let export = export_all(&conn, now()).unwrap();
        assert_eq!(export.contacts.len(), 6);
        assert_eq!(export.exported_at, format_timestamp(now()));
    }
}
