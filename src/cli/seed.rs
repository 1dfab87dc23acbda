use anyhow::Result;
use chrono::Utc;

use touchbase::config::TouchConfig;
use touchbase::crm::data;

/// Insert the sample data set unless contacts already exist.
pub fn seed(config: &TouchConfig) -> Result<()> {
    let mut conn = super::open(config)?;
    let outcome = data::seed(&mut conn, Utc::now())?;

    if outcome.contact_ids.is_empty() {
        println!("{} ({} contacts present). Nothing to do.", outcome.message, outcome.count);
    } else {
        println!("{}: {} contacts.", outcome.message, outcome.contact_ids.len());
    }
    Ok(())
}
