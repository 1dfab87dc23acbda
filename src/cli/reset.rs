//! CLI `reset` command: delete all personal data after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use touchbase::config::TouchConfig;
use touchbase::crm::data;

/// Delete all contacts, interactions, goals, and invites after user confirmation.
pub fn reset(config: &TouchConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete ALL contacts, interactions, goals, and invites.");
    println!("Settings return to their defaults. Billing records are kept.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let mut conn = super::open(config)?;
    let deleted = data::delete_all(&mut conn)?;

    println!(
        "Deleted {} contacts, {} interactions, {} goals, {} invites. Reset complete.",
        deleted.contacts, deleted.interactions, deleted.goals, deleted.shared_invites
    );
    Ok(())
}
