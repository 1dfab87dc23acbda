//! Interaction logging and activity counts.
//!
//! Logging an interaction is the only way a contact's `last_contact_at`
//! advances, so the insert and the contact bump happen in one transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::types::{Interaction, InteractionDigest, NewInteraction};
use super::{format_timestamp, CrmError, Result};

const INTERACTION_COLUMNS: &str = "id, contact_id, interaction_type, notes, voice_transcript, \
     ai_summary, digest, duration_minutes, created_at";

fn row_to_interaction(row: &Row<'_>) -> rusqlite::Result<Interaction> {
    let digest_json: Option<String> = row.get(6)?;
    let digest: InteractionDigest = digest_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    Ok(Interaction {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        interaction_type: row.get(2)?,
        notes: row.get(3)?,
        voice_transcript: row.get(4)?,
        ai_summary: row.get(5)?,
        key_highlights: digest.key_highlights,
        action_items: digest.action_items,
        emotional_cues: digest.emotional_cues,
        promises: digest.promises,
        important_dates: digest.important_dates,
        duration_minutes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Store an interaction and advance the contact's `last_contact_at` to `now`.
///
/// `digest` is the optional summarizer output; an empty summary is stored as NULL.
pub fn create_interaction(
    conn: &mut Connection,
    new: &NewInteraction,
    digest: Option<&InteractionDigest>,
    now: DateTime<Utc>,
) -> Result<Interaction> {
    if let Some(minutes) = new.duration_minutes {
        if minutes < 0 {
            return Err(CrmError::Invalid(format!(
                "duration_minutes must not be negative, got {minutes}"
            )));
        }
    }

    let id = uuid::Uuid::now_v7().to_string();
    let stamp = format_timestamp(now);
    let ai_summary = digest
        .map(|d| d.summary.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let digest_json = digest.map(serde_json::to_string).transpose()?;

    let tx = conn.transaction()?;

    let bumped = tx.execute(
        "UPDATE contacts SET last_contact_at = ?1, interaction_count = interaction_count + 1, \
         updated_at = ?1 WHERE id = ?2",
        params![stamp, new.contact_id],
    )?;
    if bumped == 0 {
        return Err(CrmError::not_found("Contact", &new.contact_id));
    }

    tx.execute(
        "INSERT INTO interactions (id, contact_id, interaction_type, notes, voice_transcript, \
         ai_summary, digest, duration_minutes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            new.contact_id,
            new.interaction_type,
            new.notes,
            new.voice_transcript,
            ai_summary,
            digest_json,
            new.duration_minutes,
            stamp,
        ],
    )?;

    tx.commit()?;

    tracing::info!(
        interaction_id = %id,
        contact_id = %new.contact_id,
        kind = %new.interaction_type,
        summarized = ai_summary.is_some(),
        "interaction logged"
    );

    get_interaction(conn, &id)
}

pub fn get_interaction(conn: &Connection, id: &str) -> Result<Interaction> {
    let sql = format!("SELECT {INTERACTION_COLUMNS} FROM interactions WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_interaction)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(CrmError::not_found("Interaction", id)),
    }
}

/// Interactions for one contact, newest first.
pub fn list_for_contact(conn: &Connection, contact_id: &str, limit: usize) -> Result<Vec<Interaction>> {
    let sql = format!(
        "SELECT {INTERACTION_COLUMNS} FROM interactions WHERE contact_id = ?1 \
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![contact_id, limit as i64], row_to_interaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Every interaction, oldest first. Used by export.
pub fn list_all(conn: &Connection) -> Result<Vec<Interaction>> {
    let sql = format!("SELECT {INTERACTION_COLUMNS} FROM interactions ORDER BY created_at ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], row_to_interaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Number of interactions logged at or after `since`.
pub fn count_since(conn: &Connection, since: DateTime<Utc>) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM interactions WHERE created_at >= ?1",
        params![format_timestamp(since)],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::contacts::{create_contact, delete_contact, get_contact};
    use crate::crm::types::NewContact;
    use crate::db;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn note(contact_id: &str, text: &str) -> NewInteraction {
        NewInteraction {
            contact_id: contact_id.into(),
            interaction_type: "call".into(),
            notes: Some(text.into()),
            voice_transcript: None,
            duration_minutes: Some(15),
        }
    }

    #[test]
    fn logging_resets_health_and_bumps_count() {
        let mut conn = db::open_memory_database().unwrap();
        let start = now() - Duration::days(10);
        let c = create_contact(&conn, &NewContact::named("Mom"), start).unwrap();
        assert_eq!(get_contact(&conn, &c.id, now()).unwrap().connection_health, 0.0);

        create_interaction(&mut conn, &note(&c.id, "called"), None, now()).unwrap();
        let after = get_contact(&conn, &c.id, now()).unwrap();
        assert_eq!(after.connection_health, 100.0);
        assert_eq!(after.interaction_count, 1);
        assert_eq!(after.last_contact_at, Some(format_timestamp(now())));
    }

    #[test]
    fn unknown_contact_is_not_found_and_nothing_is_stored() {
        let mut conn = db::open_memory_database().unwrap();
        let err = create_interaction(&mut conn, &note("ghost", "hi"), None, now()).unwrap_err();
        assert!(matches!(err, CrmError::NotFound { .. }));
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn digest_round_trips_through_storage() {
        let mut conn = db::open_memory_database().unwrap();
        let c = create_contact(&conn, &NewContact::named("Sarah"), now()).unwrap();
        let digest = InteractionDigest {
            summary: "Talked about the new job.".into(),
            key_highlights: vec!["new job".into()],
            promises: vec!["send resume tips".into()],
            ..Default::default()
        };
        let i = create_interaction(&mut conn, &note(&c.id, "long call"), Some(&digest), now()).unwrap();
        assert_eq!(i.ai_summary.as_deref(), Some("Talked about the new job."));
        assert_eq!(i.key_highlights, vec!["new job"]);
        assert_eq!(i.promises, vec!["send resume tips"]);
        assert!(i.action_items.is_empty());
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let mut conn = db::open_memory_database().unwrap();
        let c = create_contact(&conn, &NewContact::named("Alex"), now()).unwrap();
        for day in (0..5).rev() {
            let at = now() - Duration::days(day);
            create_interaction(&mut conn, &note(&c.id, &format!("day {day}")), None, at).unwrap();
        }
        let listed = list_for_contact(&conn, &c.id, 3).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].notes.as_deref(), Some("day 0"));
        assert_eq!(listed[2].notes.as_deref(), Some("day 2"));
    }

    #[test]
    fn count_since_uses_inclusive_lower_bound() {
        let mut conn = db::open_memory_database().unwrap();
        let c = create_contact(&conn, &NewContact::named("Dad"), now()).unwrap();
        for days_ago in [0, 3, 7, 20, 40] {
            create_interaction(&mut conn, &note(&c.id, "x"), None, now() - Duration::days(days_ago))
                .unwrap();
        }
        assert_eq!(count_since(&conn, now() - Duration::days(7)).unwrap(), 3);
        assert_eq!(count_since(&conn, now() - Duration::days(30)).unwrap(), 4);
    }

    #[test]
    fn deleting_contact_cascades() {
        let mut conn = db::open_memory_database().unwrap();
        let c = create_contact(&conn, &NewContact::named("Jamie"), now()).unwrap();
        create_interaction(&mut conn, &note(&c.id, "x"), None, now()).unwrap();
        delete_contact(&conn, &c.id).unwrap();
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn negative_duration_is_invalid() {
        let mut conn = db::open_memory_database().unwrap();
        let c = create_contact(&conn, &NewContact::named("Sam"), now()).unwrap();
        let mut bad = note(&c.id, "x");
        bad.duration_minutes = Some(-1);
        assert!(matches!(
            create_interaction(&mut conn, &bad, None, now()),
            Err(CrmError::Invalid(_))
        ));
    }
}
