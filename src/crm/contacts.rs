//! Contact CRUD.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{Contact, ContactUpdate, NewContact};
use super::{format_timestamp, premium, CrmError, Result};

pub const AVATAR_COLORS: [&str; 10] = [
    "#2D6A4F", "#40916C", "#52B788", "#95D5B2", "#457B9D", "#E9C46A", "#F4A261", "#E76F51",
    "#264653", "#A8DADC",
];

const CONTACT_COLUMNS: &str = "id, name, phone, email, relationship_tag, frequency_days, \
     is_pinned, is_archived, avatar_color, notes, last_contact_at, interaction_count, \
     created_at, updated_at";

/// Palette colour derived from the name, so the same name always gets the same colour.
pub fn avatar_color_for(name: &str) -> &'static str {
    let sum: usize = name.bytes().map(usize::from).sum();
    AVATAR_COLORS[sum % AVATAR_COLORS.len()]
}

pub(crate) fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        relationship_tag: row.get(4)?,
        frequency_days: row.get(5)?,
        is_pinned: row.get(6)?,
        is_archived: row.get(7)?,
        avatar_color: row.get(8)?,
        notes: row.get(9)?,
        last_contact_at: row.get(10)?,
        interaction_count: row.get(11)?,
        connection_health: 0.0,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn validate_frequency(frequency_days: i64) -> Result<()> {
    if frequency_days < 1 {
        return Err(CrmError::Invalid(format!(
            "frequency_days must be at least 1, got {frequency_days}"
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CrmError::Invalid("name must not be empty".into()));
    }
    Ok(())
}

/// Insert a new contact. A contact starts out never-contacted, so its health is 0.
pub fn create_contact(conn: &Connection, new: &NewContact, now: DateTime<Utc>) -> Result<Contact> {
    validate_name(&new.name)?;
    validate_frequency(new.frequency_days)?;

    let id = uuid::Uuid::now_v7().to_string();
    let stamp = format_timestamp(now);
    let avatar_color = new
        .avatar_color
        .clone()
        .unwrap_or_else(|| avatar_color_for(&new.name).to_string());

    conn.execute(
        "INSERT INTO contacts (id, name, phone, email, relationship_tag, frequency_days, \
         is_pinned, is_archived, avatar_color, notes, last_contact_at, interaction_count, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, NULL, 0, ?10, ?10)",
        params![
            id,
            new.name.trim(),
            new.phone,
            new.email,
            new.relationship_tag,
            new.frequency_days,
            new.is_pinned,
            avatar_color,
            new.notes,
            stamp,
        ],
    )?;

    tracing::info!(contact_id = %id, tag = %new.relationship_tag, "contact created");
    get_contact(conn, &id, now)
}

/// Fetch one contact with health computed at `now`.
pub fn get_contact(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<Contact> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_contact)
        .optional()?
        .map(|c| c.with_health(now))
        .ok_or_else(|| CrmError::not_found("Contact", id))
}

/// List contacts by archived flag and optional tag, pinned first.
pub fn list_contacts(
    conn: &Connection,
    archived: bool,
    tag: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Contact>> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts \
         WHERE is_archived = ?1 AND (?2 IS NULL OR relationship_tag = ?2) \
         ORDER BY is_pinned DESC, created_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let contacts = stmt
        .query_map(params![archived, tag], row_to_contact)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contacts.into_iter().map(|c| c.with_health(now)).collect())
}

/// All non-archived contacts: the snapshot fed to the dashboard and reminders.
pub fn list_active(conn: &Connection, now: DateTime<Utc>) -> Result<Vec<Contact>> {
    list_contacts(conn, false, None, now)
}

/// Number of non-archived contacts.
pub fn count_active(conn: &Connection) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE is_archived = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

/// Apply a partial update and return the updated contact.
pub fn update_contact(
    conn: &Connection,
    id: &str,
    update: &ContactUpdate,
    now: DateTime<Utc>,
) -> Result<Contact> {
    let mut contact = get_contact(conn, id, now)?;

    if let Some(name) = &update.name {
        validate_name(name)?;
        contact.name = name.trim().to_string();
    }
    if let Some(frequency_days) = update.frequency_days {
        validate_frequency(frequency_days)?;
        contact.frequency_days = frequency_days;
    }
    if let Some(phone) = &update.phone {
        contact.phone = Some(phone.clone());
    }
    if let Some(email) = &update.email {
        contact.email = Some(email.clone());
    }
    if let Some(tag) = &update.relationship_tag {
        contact.relationship_tag = tag.clone();
    }
    if let Some(pinned) = update.is_pinned {
        contact.is_pinned = pinned;
    }
    if let Some(archived) = update.is_archived {
        // Restoring from the archive takes an active slot.
        if contact.is_archived && !archived {
            premium::ensure_contact_capacity(conn, now)?;
        }
        contact.is_archived = archived;
    }
    if let Some(color) = &update.avatar_color {
        contact.avatar_color = color.clone();
    }
    if let Some(notes) = &update.notes {
        contact.notes = Some(notes.clone());
    }

    conn.execute(
        "UPDATE contacts SET name = ?1, phone = ?2, email = ?3, relationship_tag = ?4, \
         frequency_days = ?5, is_pinned = ?6, is_archived = ?7, avatar_color = ?8, notes = ?9, \
         updated_at = ?10 WHERE id = ?11",
        params![
            contact.name,
            contact.phone,
            contact.email,
            contact.relationship_tag,
            contact.frequency_days,
            contact.is_pinned,
            contact.is_archived,
            contact.avatar_color,
            contact.notes,
            format_timestamp(now),
            id,
        ],
    )?;

    tracing::debug!(contact_id = %id, "contact updated");
    get_contact(conn, id, now)
}

/// Delete a contact and (via `ON DELETE CASCADE`) its interactions.
pub fn delete_contact(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(CrmError::not_found("Contact", id));
    }
    tracing::info!(contact_id = %id, "contact deleted");
    Ok(())
}
