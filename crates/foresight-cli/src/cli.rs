//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foresight_core::ForecastHorizon;

/// Foresight - See where your money is heading
#[derive(Parser)]
#[command(name = "foresight")]
#[command(about = "Predictive analytics over personal finance history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON history file (transactions, goals, stats)
    #[arg(long, global = true, conflicts_with = "csv")]
    pub history: Option<PathBuf>,

    /// Transaction CSV export (no goals or stats)
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    /// Only analyze records belonging to this user
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Threshold config override (TOML)
    ///
    /// Without this flag the data-dir override is used when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD or RFC 3339); defaults to the current time
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast spending per category
    Forecast {
        /// Horizon in days: 30 or 90
        #[arg(long, default_value = "30")]
        horizon: ForecastHorizon,
    },

    /// Predict whether active goals will be reached
    Goals,

    /// Project the balance over the next 90 days
    Cashflow {
        /// Starting balance (defaults to total savings from the history file)
        #[arg(short, long)]
        balance: Option<f64>,
    },

    /// Detect spending spikes, income drops, and goals at risk
    Anomalies,

    /// Analyze spending patterns
    Patterns,

    /// Find ways to spend less
    Savings,

    /// Show the prioritized recommendation list
    Recommendations,

    /// Print the spending-pattern context block for an AI assistant
    Context,

    /// Run every analysis
    Report,
}
