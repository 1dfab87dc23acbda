//! Shared-mode invitations for couples and co-parents.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::types::{InviteMode, NewSharedInvite, SharedInvite};
use super::{format_timestamp, json_list, CrmError, Result};

fn row_to_invite(row: &Row<'_>) -> rusqlite::Result<SharedInvite> {
    let mode: String = row.get(4)?;
    let mode = mode.parse::<InviteMode>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;
    Ok(SharedInvite {
        id: row.get(0)?,
        partner_name: row.get(1)?,
        partner_email: row.get(2)?,
        shared_contact_ids: json_list(row.get(3)?),
        mode,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Record a pending invitation.
pub fn create_invite(
    conn: &Connection,
    new: &NewSharedInvite,
    now: DateTime<Utc>,
) -> Result<SharedInvite> {
    if new.partner_name.trim().is_empty() {
        return Err(CrmError::Invalid("partner_name must not be empty".into()));
    }

    let invite = SharedInvite {
        id: uuid::Uuid::now_v7().to_string(),
        partner_name: new.partner_name.trim().to_string(),
        partner_email: new.partner_email.clone(),
        shared_contact_ids: new.shared_contact_ids.clone(),
        mode: new.mode,
        status: "pending".into(),
        created_at: format_timestamp(now),
    };

    conn.execute(
        "INSERT INTO shared_invites (id, partner_name, partner_email, shared_contact_ids, mode, \
         status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            invite.id,
            invite.partner_name,
            invite.partner_email,
            serde_json::to_string(&invite.shared_contact_ids)?,
            invite.mode.as_str(),
            invite.status,
            invite.created_at,
        ],
    )?;

    tracing::info!(
        invite_id = %invite.id,
        mode = invite.mode.as_str(),
        shared = invite.shared_contact_ids.len(),
        "shared invite created"
    );
    Ok(invite)
}

/// All invitations, newest first.
pub fn list_invites(conn: &Connection) -> Result<Vec<SharedInvite>> {
    let mut stmt = conn.prepare(
        "SELECT id, partner_name, partner_email, shared_contact_ids, mode, status, created_at \
         FROM shared_invites ORDER BY created_at DESC",
    )?;
    let invites = stmt
        .query_map([], row_to_invite)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(invites)
}
