//! Registered device push tokens.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::types::PushToken;
use super::{format_timestamp, CrmError, Result};

/// Insert or refresh a token. Re-registering keeps known device details when
/// the new request omits them.
pub fn register(
    conn: &Connection,
    token: &str,
    device_id: Option<&str>,
    platform: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PushToken> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CrmError::Invalid("token must not be empty".into()));
    }
    let stamp = format_timestamp(now);
    conn.execute(
        "INSERT INTO push_tokens (token, device_id, platform, registered_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(token) DO UPDATE SET \
             device_id = COALESCE(excluded.device_id, device_id), \
             platform = COALESCE(excluded.platform, platform), \
             registered_at = excluded.registered_at",
        params![token, device_id, platform, stamp],
    )?;
    tracing::info!(platform = platform.unwrap_or("unknown"), "push token registered");

    let registered = conn.query_row(
        "SELECT token, device_id, platform, registered_at FROM push_tokens WHERE token = ?1",
        params![token],
        |row| {
            Ok(PushToken {
                token: row.get(0)?,
                device_id: row.get(1)?,
                platform: row.get(2)?,
                registered_at: row.get(3)?,
            })
        },
    )?;
    Ok(registered)
}

pub fn list(conn: &Connection) -> Result<Vec<PushToken>> {
    let mut stmt = conn.prepare(
        "SELECT token, device_id, platform, registered_at FROM push_tokens ORDER BY registered_at",
    )?;
    let tokens = stmt
        .query_map([], |row| {
            Ok(PushToken {
                token: row.get(0)?,
                device_id: row.get(1)?,
                platform: row.get(2)?,
                registered_at: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tokens)
}

/// Drop tokens the relay reported as no longer registered.
pub fn remove(conn: &Connection, tokens: &[String]) -> Result<usize> {
    let mut removed = 0;
    for token in tokens {
        removed += conn.execute("DELETE FROM push_tokens WHERE token = ?1", params![token])?;
    }
    if removed > 0 {
        tracing::info!(removed, "stale push tokens removed");
    }
    Ok(removed)
}
