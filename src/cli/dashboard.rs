//! CLI `dashboard` command: print the connection-health overview.

use anyhow::Result;
use chrono::Utc;

use touchbase::config::TouchConfig;
use touchbase::crm::{contacts, interactions};
use touchbase::health::dashboard;

use super::health_bar;

/// Print overall health, contacts needing attention, and activity counts.
pub fn dashboard(config: &TouchConfig) -> Result<()> {
    let conn = super::open(config)?;
    let now = Utc::now();

    let active = contacts::list_active(&conn, now)?;
    let summary = dashboard::summarize(&active, now, |since| {
        interactions::count_since(&conn, since)
    })?;

    println!("Touch Dashboard");
    println!("{}", "=".repeat(40));
    println!(
        "  Overall health:      {:>5.1} {}",
        summary.overall_score,
        health_bar(summary.overall_score)
    );
    println!("  Contacts:            {}", summary.total_contacts);
    println!("  Interactions (7d):   {}", summary.weekly_interactions);
    println!("  Interactions (30d):  {}", summary.monthly_interactions);
    println!();

    if summary.total_contacts == 0 {
        println!("No contacts yet. Run `touchbase seed` to add sample data.");
        return Ok(());
    }

    println!("Contacts:");
    for contact in &active {
        println!(
            "  {:<20} {:>5.1} {}  ({})",
            contact.name,
            contact.connection_health,
            health_bar(contact.connection_health),
            contact.relationship_tag
        );
    }
    println!();

    if !summary.needs_attention.is_empty() {
        println!("Needs attention:");
        for entry in &summary.needs_attention {
            println!("  {:<20} {:>5.1}", entry.name, entry.health);
        }
        println!();
    }

    let mut categories: Vec<_> = summary.category_breakdown.iter().collect();
    categories.sort();
    println!("By relationship:");
    for (tag, count) in categories {
        println!("  {tag:<12} {count}");
    }

    if let Some(ref suggested) = summary.suggested_contact {
        println!();
        println!("Reach out to {} today.", suggested.name);
    }

    Ok(())
}
