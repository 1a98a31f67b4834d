//! Foresight CLI - Predictive analytics for personal finance history
//!
//! Usage:
//!   foresight --history data.json report         Run every analysis
//!   foresight --csv export.csv forecast --horizon 90
//!   foresight --history data.json goals --json   Goal predictions as JSON

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let session = commands::open_session(&commands::SessionOptions {
        history: cli.history.as_deref(),
        csv: cli.csv.as_deref(),
        user: cli.user.as_deref(),
        config: cli.config.as_deref(),
        now: cli.now.as_deref(),
    })?;
    let json = cli.json;

    match cli.command {
        Commands::Forecast { horizon } => commands::cmd_forecast(&session, horizon, json),
        Commands::Goals => commands::cmd_goals(&session, json),
        Commands::Cashflow { balance } => commands::cmd_cashflow(&session, balance, json),
        Commands::Anomalies => commands::cmd_anomalies(&session, json),
        Commands::Patterns => commands::cmd_patterns(&session, json),
        Commands::Savings => commands::cmd_savings(&session, json),
        Commands::Recommendations => commands::cmd_recommendations(&session, json),
        Commands::Context => commands::cmd_context(&session, json),
        Commands::Report => commands::cmd_report(&session, json),
    }
}
