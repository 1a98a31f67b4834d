//! Core command utilities
//!
//! This module contains:
//! - `open_session` - Load history, config, and the reference time once per run
//! - `load_history` - Read a JSON or CSV history file
//! - `resolve_now` - Parse the `--now` override

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use foresight_core::models::parse_timestamp;
use foresight_core::{
    AnalyticsConfig, AnalyticsEngine, ConfigSource, CsvHistoryProvider, History, IngestStats,
    JsonHistoryProvider,
};
use tracing::{debug, info, warn};

/// Global flags that shape every command
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionOptions<'a> {
    pub history: Option<&'a Path>,
    pub csv: Option<&'a Path>,
    pub user: Option<&'a str>,
    pub config: Option<&'a Path>,
    pub now: Option<&'a str>,
}

/// Everything a command needs to run one analysis
pub struct Session {
    pub history: History,
    pub engine: AnalyticsEngine,
    pub now: DateTime<Utc>,
}

pub fn open_session(options: &SessionOptions<'_>) -> Result<Session> {
    let now = resolve_now(options.now)?;
    let history = load_history(options.history, options.csv, options.user)?;

    let (config, source) =
        AnalyticsConfig::load(options.config).context("Failed to load analytics config")?;
    match source {
        ConfigSource::Embedded => debug!("Using built-in analytics thresholds"),
        ConfigSource::File(path) => info!(path = %path.display(), "Using analytics config"),
    }

    Ok(Session {
        history,
        engine: AnalyticsEngine::with_config(config),
        now,
    })
}

/// Read a history file, optionally narrowing it to one user
pub fn load_history(
    json_path: Option<&Path>,
    csv_path: Option<&Path>,
    user: Option<&str>,
) -> Result<History> {
    let (history, stats) = match (json_path, csv_path) {
        (Some(path), _) => JsonHistoryProvider::new(path)
            .read()
            .with_context(|| format!("Failed to load history from {}", path.display()))?,
        (None, Some(path)) => CsvHistoryProvider::new(path)
            .read()
            .with_context(|| format!("Failed to import transactions from {}", path.display()))?,
        (None, None) => bail!("No history given. Use --history <file.json> or --csv <file.csv>"),
    };

    log_ingest(&stats);

    Ok(match user {
        Some(user_id) => history.for_user(user_id),
        None => history,
    })
}

fn log_ingest(stats: &IngestStats) {
    info!(
        transactions = stats.transactions_loaded,
        goals = stats.goals_loaded,
        "Loaded history"
    );
    if stats.transactions_skipped > 0 || stats.goals_skipped > 0 {
        warn!(
            transactions = stats.transactions_skipped,
            goals = stats.goals_skipped,
            "Skipped records without a usable date or type"
        );
    }
    if stats.amounts_defaulted > 0 {
        warn!(
            count = stats.amounts_defaulted,
            "Unparseable amounts treated as zero"
        );
    }
}

/// Reference time for the analysis; the wall clock when not overridden
pub fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(value) => parse_timestamp(value)
            .with_context(|| format!("Invalid --now value: {} (use YYYY-MM-DD)", value)),
    }
}
