mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use touchbase::config::TouchConfig;
use touchbase::server;

#[derive(Parser)]
#[command(name = "touchbase", version, about = "Personal relationship tracker and Touch API server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the JSON API over HTTP
    Serve,
    /// Print the connection-health dashboard
    Dashboard,
    /// List contacts that are due a reminder
    Reminders,
    /// Export all personal data as JSON to stdout
    Export,
    /// Insert sample contacts and interactions into an empty database
    Seed,
    /// Delete all personal data (asks for confirmation)
    Reset,
    /// Run database diagnostics
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TouchConfig::load()?;

    // Log to stderr so stdout stays clean for `export`.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Dashboard => cli::dashboard::dashboard(&config)?,
        Command::Reminders => cli::reminders::reminders(&config)?,
        Command::Export => cli::export::export(&config)?,
        Command::Seed => cli::seed::seed(&config)?,
        Command::Reset => cli::reset::reset(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
