use anyhow::Result;
use chrono::Utc;

use touchbase::config::TouchConfig;
use touchbase::crm::{contacts, settings};
use touchbase::health::reminders;

/// List pending reminders, most urgent first, honoring notification settings.
pub fn reminders(config: &TouchConfig) -> Result<()> {
    let conn = super::open(config)?;
    let now = Utc::now();

    let active = contacts::list_active(&conn, now)?;
    let prefs = settings::get_settings(&conn)?;
    let batch = reminders::select(&active, &prefs, now);

    if batch.reminders.is_empty() {
        println!("No reminders. Every connection is in good shape.");
        return Ok(());
    }

    println!("Pending reminders ({})", batch.total);
    println!("{}", "=".repeat(40));
    for r in &batch.reminders {
        let overdue = if r.days_overdue > 0 {
            format!("{}d overdue", r.days_overdue)
        } else {
            "due".to_string()
        };
        println!(
            "  [{:<6}] {:<20} {:>5.1}  {}",
            r.priority.as_str(),
            r.contact_name,
            r.health,
            overdue
        );
        println!("           {}", r.message);
    }

    Ok(())
}
