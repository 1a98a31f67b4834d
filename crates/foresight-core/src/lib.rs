//! Foresight Core Library
//!
//! Predictive analytics over a user's personal finance history:
//! - Validated transaction, goal, and stats records
//! - History providers (in-memory, JSON files, CSV import)
//! - Spending forecasts, goal predictions, and cash-flow projections
//! - Anomaly detection and spending pattern analysis
//! - Savings opportunities, composed recommendations, and AI context
//! - Threshold configuration with embedded defaults

pub mod analytics;
pub mod config;
pub mod error;
pub mod history;
pub mod models;

/// Test utilities including history fixture builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    Anomaly, AnomalyType, AnalyticsEngine, AnalyticsReport, CashFlowForecast, Confidence,
    ForecastHorizon, GoalPrediction, RiskLevel, SavingsOpportunity, Severity, SpendingForecast,
    SpendingInsights, Trend,
};
pub use config::{AnalyticsConfig, ConfigSource};
pub use error::{Error, Result};
pub use history::{
    CsvHistoryProvider, History, HistoryProvider, IngestStats, JsonHistoryProvider, RawHistory,
};
pub use models::{GoalRecord, GoalStatus, StatsSnapshot, TransactionRecord, TransactionType};
