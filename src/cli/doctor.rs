//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use touchbase::config::TouchConfig;
use touchbase::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &TouchConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `touchbase serve` or `touchbase seed` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Touch Health Report");
    println!("===================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Integrations:");
    println!(
        "  Language model:  {}",
        configured(!config.llm.api_key.is_empty(), &config.llm.model)
    );
    println!(
        "  Speech:          {}",
        configured(!config.speech_api_key().is_empty(), &config.speech.model)
    );
    println!(
        "  Payments:        {}",
        if config.payment.test_mode() { "test mode" } else { "live" }
    );
    println!();
    println!("Row counts:");
    println!("  Contacts:        {}", report.contact_count);
    println!("  Interactions:    {}", report.interaction_count);
    println!("  Goals:           {}", report.goal_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.touchbase/touchbase.db");
        println!("  2. Or keep a JSON copy of what is still readable:");
        println!("     touchbase export > backup.json");
    }

    Ok(())
}

fn configured(ok: bool, model: &str) -> String {
    if ok {
        format!("configured ({model})")
    } else {
        "not configured".to_string()
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
