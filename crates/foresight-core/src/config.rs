//! Analytics thresholds
//!
//! Every statistical cutoff the engine uses (spike multipliers, the
//! recurring-expense CV limit, the $100 spike floor, and so on) is a named,
//! overridable value here rather than a literal in the analysis code.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/foresight/config/analytics.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Spending forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub lookback_multiplier: i64,
    pub max_lookback_days: i64,
    pub trend_threshold_percent: f64,
    pub high_confidence_max_cv: f64,
    pub medium_confidence_max_cv: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_multiplier: 3,
            max_lookback_days: 180,
            trend_threshold_percent: 10.0,
            high_confidence_max_cv: 0.3,
            medium_confidence_max_cv: 0.6,
        }
    }
}

/// Goal prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoalConfig {
    pub savings_window_days: i64,
    pub excellent_capacity_ratio: f64,
    pub on_track_base_probability: f64,
    pub on_track_max_probability: f64,
    pub off_track_min_probability: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            savings_window_days: 30,
            excellent_capacity_ratio: 1.5,
            on_track_base_probability: 70.0,
            on_track_max_probability: 95.0,
            off_track_min_probability: 10.0,
        }
    }
}

/// Cash-flow projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CashFlowConfig {
    pub trailing_days: i64,
    pub projection_days: i64,
    pub sample_interval_days: i64,
    pub high_risk_months: f64,
    pub medium_risk_months: f64,
}

impl Default for CashFlowConfig {
    fn default() -> Self {
        Self {
            trailing_days: 30,
            projection_days: 90,
            sample_interval_days: 7,
            high_risk_months: 1.0,
            medium_risk_months: 3.0,
        }
    }
}

/// Anomaly detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnomalyConfig {
    pub recent_days: i64,
    pub baseline_days: i64,
    pub spike_warning_multiplier: f64,
    pub spike_critical_multiplier: f64,
    pub spike_min_recent_total: f64,
    pub income_drop_ratio: f64,
    pub goal_risk_probability: f64,
    pub goal_critical_probability: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            recent_days: 7,
            baseline_days: 23,
            spike_warning_multiplier: 1.5,
            spike_critical_multiplier: 2.0,
            spike_min_recent_total: 100.0,
            income_drop_ratio: 0.5,
            goal_risk_probability: 50.0,
            goal_critical_probability: 25.0,
        }
    }
}

/// Spending pattern analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    pub lookback_days: i64,
    /// Band a category must move by (percent) to count as rising or falling
    pub trend_threshold_percent: f64,
    pub min_expense_records: usize,
    pub recurring_min_transactions: usize,
    pub recurring_max_cv: f64,
    pub weekly_max_interval_days: f64,
    pub quarterly_min_interval_days: f64,
    pub small_purchase_threshold: f64,
    pub impulsive_per_week: f64,
    pub unusual_std_devs: f64,
    pub cluster_min_purchases: usize,
    pub max_unusual: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            lookback_days: 180,
            trend_threshold_percent: 10.0,
            min_expense_records: 5,
            recurring_min_transactions: 3,
            recurring_max_cv: 0.3,
            weekly_max_interval_days: 10.0,
            quarterly_min_interval_days: 60.0,
            small_purchase_threshold: 20.0,
            impulsive_per_week: 5.0,
            unusual_std_devs: 2.0,
            cluster_min_purchases: 3,
            max_unusual: 5,
        }
    }
}

/// Recommendation generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationConfig {
    pub max_recommendations: usize,
    pub overspending_share_percent: f64,
    pub weekend_bias_share_percent: f64,
    pub concentration_share_percent: f64,
    pub late_month_share_percent: f64,
    /// Share of a recurring charge a review typically recovers
    pub recurring_review_rate: f64,
    /// Share of small-purchase spend that is realistic to cut
    pub impulse_reduction_rate: f64,
    /// Share of the weekend excess that is realistic to cut
    pub weekend_reduction_rate: f64,
    /// Savings opportunities worth less than this per month are dropped
    pub min_monthly_savings: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 5,
            overspending_share_percent: 30.0,
            weekend_bias_share_percent: 40.0,
            concentration_share_percent: 40.0,
            late_month_share_percent: 40.0,
            recurring_review_rate: 0.25,
            impulse_reduction_rate: 0.5,
            weekend_reduction_rate: 0.2,
            min_monthly_savings: 1.0,
        }
    }
}

/// All analytics thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    pub forecast: ForecastConfig,
    pub goals: GoalConfig,
    pub cash_flow: CashFlowConfig,
    pub anomalies: AnomalyConfig,
    pub patterns: PatternConfig,
    pub recommendations: RecommendationConfig,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl AnalyticsConfig {
    /// Load configuration (explicit path, then data-dir override, then embedded)
    ///
    /// An explicit path that does not exist is an error; a missing data-dir
    /// override is not.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::NotFound(format!("Config file {}", path.display())));
            }
            return Self::from_file(path).map(|c| (c, ConfigSource::File(path.to_path_buf())));
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                let config = Self::from_file(&default_path)?;
                return Ok((config, ConfigSource::File(default_path)));
            }
        }

        Ok((Self::embedded()?, ConfigSource::Embedded))
    }

    /// The compiled-in defaults
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "Loaded analytics config override");
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: AnalyticsConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject threshold combinations that would make tiers overlap or windows empty
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.forecast.lookback_multiplier < 1 || self.forecast.max_lookback_days < 1 {
            problems.push("forecast lookback must be positive");
        }
        if self.forecast.medium_confidence_max_cv < self.forecast.high_confidence_max_cv {
            problems.push("forecast.medium_confidence_max_cv must be >= high_confidence_max_cv");
        }
        if self.goals.savings_window_days < 1 {
            problems.push("goals.savings_window_days must be positive");
        }
        if self.cash_flow.trailing_days < 1
            || self.cash_flow.projection_days < 1
            || self.cash_flow.sample_interval_days < 1
        {
            problems.push("cash_flow windows must be positive");
        }
        if self.cash_flow.medium_risk_months < self.cash_flow.high_risk_months {
            problems.push("cash_flow.medium_risk_months must be >= high_risk_months");
        }
        if self.anomalies.recent_days < 1 || self.anomalies.baseline_days < 1 {
            problems.push("anomaly windows must be positive");
        }
        if self.anomalies.spike_critical_multiplier < self.anomalies.spike_warning_multiplier {
            problems.push("anomalies.spike_critical_multiplier must be >= spike_warning_multiplier");
        }
        if self.anomalies.goal_critical_probability > self.anomalies.goal_risk_probability {
            problems.push("anomalies.goal_critical_probability must be <= goal_risk_probability");
        }
        if self.patterns.lookback_days < 1 {
            problems.push("patterns.lookback_days must be positive");
        }
        if self.patterns.recurring_min_transactions < 2 {
            problems.push("patterns.recurring_min_transactions must be at least 2");
        }
        let rates = [
            self.recommendations.recurring_review_rate,
            self.recommendations.impulse_reduction_rate,
            self.recommendations.weekend_reduction_rate,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            problems.push("recommendations reduction rates must be within 0.0-1.0");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("foresight").join("config").join("analytics.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let embedded = AnalyticsConfig::embedded().unwrap();
        assert_eq!(embedded, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AnalyticsConfig::parse(
            r#"
            [anomalies]
            spike_min_recent_total = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(config.anomalies.spike_min_recent_total, 250.0);
        assert_eq!(config.anomalies.spike_warning_multiplier, 1.5);
        assert_eq!(config.patterns, PatternConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = AnalyticsConfig::parse("[anomalies]\nspike_multiplier = 3.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_inverted_tiers_rejected() {
        let result = AnalyticsConfig::parse(
            "[forecast]\nhigh_confidence_max_cv = 0.8\nmedium_confidence_max_cv = 0.5\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_reduction_rate_out_of_range_rejected() {
        let result = AnalyticsConfig::parse("[recommendations]
impulse_reduction_rate = 1.5
");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[recommendations]\nmax_recommendations = 3").unwrap();

        let (config, source) = AnalyticsConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.recommendations.max_recommendations, 3);
        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = AnalyticsConfig::load(Some(Path::new("/nonexistent/analytics.toml")));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
