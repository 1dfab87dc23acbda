//! Single-row user settings.

use rusqlite::{params, Connection};

use super::types::{Settings, SettingsUpdate};
use super::{CrmError, Result};

const THEME_MODES: [&str; 3] = ["system", "light", "dark"];

/// Current settings. The row is created on first read if a migration has not
/// already inserted it.
pub fn get_settings(conn: &Connection) -> Result<Settings> {
    conn.execute("INSERT OR IGNORE INTO settings (id) VALUES ('default')", [])?;
    let settings = conn.query_row(
        "SELECT notification_intensity, low_pressure_mode, theme_mode, onboarding_completed, \
         privacy_mode, data_encryption FROM settings WHERE id = 'default'",
        [],
        |row| {
            Ok(Settings {
                notification_intensity: row.get(0)?,
                low_pressure_mode: row.get(1)?,
                theme_mode: row.get(2)?,
                onboarding_completed: row.get(3)?,
                privacy_mode: row.get(4)?,
                data_encryption: row.get(5)?,
            })
        },
    )?;
    Ok(settings)
}

/// Apply a partial update and return the resulting settings.
pub fn update_settings(conn: &Connection, update: &SettingsUpdate) -> Result<Settings> {
    let mut settings = get_settings(conn)?;

    if let Some(intensity) = update.notification_intensity {
        if !(0..=100).contains(&intensity) {
            return Err(CrmError::Invalid(format!(
                "notification_intensity must be between 0 and 100, got {intensity}"
            )));
        }
        settings.notification_intensity = intensity;
    }
    if let Some(theme) = &update.theme_mode {
        if !THEME_MODES.contains(&theme.as_str()) {
            return Err(CrmError::Invalid(format!("unknown theme_mode: {theme}")));
        }
        settings.theme_mode = theme.clone();
    }
    if let Some(v) = update.low_pressure_mode {
        settings.low_pressure_mode = v;
    }
    if let Some(v) = update.onboarding_completed {
        settings.onboarding_completed = v;
    }
    if let Some(v) = update.privacy_mode {
        settings.privacy_mode = v;
    }
    if let Some(v) = update.data_encryption {
        settings.data_encryption = v;
    }

    conn.execute(
        "UPDATE settings SET notification_intensity = ?1, low_pressure_mode = ?2, \
         theme_mode = ?3, onboarding_completed = ?4, privacy_mode = ?5, data_encryption = ?6 \
         WHERE id = 'default'",
        params![
            settings.notification_intensity,
            settings.low_pressure_mode,
            settings.theme_mode,
            settings.onboarding_completed,
            settings.privacy_mode,
            settings.data_encryption,
        ],
    )?;

    tracing::debug!(
        intensity = settings.notification_intensity,
        low_pressure = settings.low_pressure_mode,
        "settings updated"
    );
    Ok(settings)
}
