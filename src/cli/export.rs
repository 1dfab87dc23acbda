use anyhow::Result;
use chrono::Utc;

use touchbase::config::TouchConfig;
use touchbase::crm::data;

/// Export contacts, interactions, goals, settings, and invites as JSON to stdout.
pub fn export(config: &TouchConfig) -> Result<()> {
    let conn = super::open(config)?;
    let export = data::export_all(&conn, Utc::now())?;

    let json = serde_json::to_string_pretty(&export)?;
    println!("{json}");

    tracing::info!(
        contacts = export.contacts.len(),
        interactions = export.interactions.len(),
        goals = export.goals.len(),
        "export complete"
    );
    Ok(())
}
