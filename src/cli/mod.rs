pub mod dashboard;
pub mod doctor;
pub mod export;
pub mod reminders;
pub mod reset;
pub mod seed;

use anyhow::Result;
use rusqlite::Connection;

use touchbase::config::TouchConfig;
use touchbase::db;

/// Open the configured database for a one-shot command.
pub(crate) fn open(config: &TouchConfig) -> Result<Connection> {
    db::open_database(config.resolved_db_path())
}

/// A fixed-width text bar for a 0–100 score.
pub(crate) fn health_bar(health: f64) -> String {
    let filled = (health.clamp(0.0, 100.0) / 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bar_scales_to_ten_cells() {
        assert_eq!(health_bar(0.0), "[----------]");
        assert_eq!(health_bar(100.0), "[##########]");
        assert_eq!(health_bar(54.0), "[#####-----]");
        assert_eq!(health_bar(250.0), "[##########]");
    }
}
