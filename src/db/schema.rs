//! SQL DDL for all touchbase tables.
//!
//! Defines `contacts`, `interactions`, `goals`, `settings`, `push_tokens`,
//! `payment_orders`, `subscription`, `shared_invites`, and `schema_meta`. All
//! DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for the core tables.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT,
    email TEXT,
    relationship_tag TEXT NOT NULL DEFAULT 'Friend',
    frequency_days INTEGER NOT NULL DEFAULT 7 CHECK(frequency_days > 0),
    is_pinned INTEGER NOT NULL DEFAULT 0,
    is_archived INTEGER NOT NULL DEFAULT 0,
    avatar_color TEXT NOT NULL,
    notes TEXT,
    last_contact_at TEXT,
    interaction_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contacts_archived ON contacts(is_archived);
CREATE INDEX IF NOT EXISTS idx_contacts_tag ON contacts(relationship_tag);

CREATE TABLE IF NOT EXISTS interactions (
    id TEXT PRIMARY KEY,
    contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    interaction_type TEXT NOT NULL DEFAULT 'note',
    notes TEXT,
    voice_transcript TEXT,
    ai_summary TEXT,
    digest TEXT,
    duration_minutes INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_interactions_contact ON interactions(contact_id);
CREATE INDEX IF NOT EXISTS idx_interactions_created ON interactions(created_at);

CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    target_contact_ids TEXT NOT NULL DEFAULT '[]',
    progress REAL NOT NULL DEFAULT 0.0,
    status TEXT NOT NULL DEFAULT 'active',
    target_date TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goals_status ON goals(status);

-- Single-row user settings (id = 'default')
CREATE TABLE IF NOT EXISTS settings (
    id TEXT PRIMARY KEY,
    notification_intensity INTEGER NOT NULL DEFAULT 50
        CHECK(notification_intensity >= 0 AND notification_intensity <= 100),
    low_pressure_mode INTEGER NOT NULL DEFAULT 0,
    theme_mode TEXT NOT NULL DEFAULT 'system',
    onboarding_completed INTEGER NOT NULL DEFAULT 0,
    privacy_mode INTEGER NOT NULL DEFAULT 1,
    data_encryption INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS push_tokens (
    token TEXT PRIMARY KEY,
    device_id TEXT,
    platform TEXT,
    registered_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payment_orders (
    order_id TEXT PRIMARY KEY,
    plan_id TEXT NOT NULL,
    amount INTEGER NOT NULL,
    currency TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'created' CHECK(status IN ('created','paid')),
    payment_id TEXT,
    test_mode INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Single-row subscription state (id = 'default')
CREATE TABLE IF NOT EXISTS subscription (
    id TEXT PRIMARY KEY,
    plan_id TEXT NOT NULL DEFAULT 'free',
    status TEXT NOT NULL DEFAULT 'inactive',
    amount INTEGER NOT NULL DEFAULT 0,
    currency TEXT NOT NULL DEFAULT 'INR',
    order_id TEXT,
    payment_id TEXT,
    started_at TEXT,
    expires_at TEXT
);

CREATE TABLE IF NOT EXISTS shared_invites (
    id TEXT PRIMARY KEY,
    partner_name TEXT NOT NULL,
    partner_email TEXT,
    shared_contact_ids TEXT NOT NULL DEFAULT '[]',
    mode TEXT NOT NULL CHECK(mode IN ('couple','coparent')),
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for expected in [
            "contacts",
            "interactions",
            "goals",
            "settings",
            "push_tokens",
            "payment_orders",
            "subscription",
            "shared_invites",
            "schema_meta",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table {expected}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn non_positive_frequency_is_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO contacts (id, name, frequency_days, avatar_color, created_at, updated_at) \
             VALUES ('c1', 'Zero', 0, '#40916C', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
