//! Spending Forecaster
//!
//! Projects near-term spend per category from recent per-transaction
//! averages, adjusted by the category's half-over-half trend.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ForecastConfig;
use crate::models::TransactionRecord;

use super::stats::{self, Window};
use super::types::{ForecastHorizon, SpendingForecast};

/// Forecasts spending per category over a 30 or 90 day horizon
pub struct SpendingForecaster {
    config: ForecastConfig,
}

impl SpendingForecaster {
    pub fn new() -> Self {
        Self::with_config(ForecastConfig::default())
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Days of history considered for a horizon
    pub fn lookback_days(&self, horizon: ForecastHorizon) -> i64 {
        (horizon.days() * self.config.lookback_multiplier).min(self.config.max_lookback_days)
    }

    /// Forecast every category with expenses in the lookback window
    ///
    /// Sorted by predicted amount, largest first. Categories tie-break by name
    /// so the order is stable across calls.
    pub fn forecast(
        &self,
        transactions: &[TransactionRecord],
        horizon: ForecastHorizon,
        now: DateTime<Utc>,
    ) -> Vec<SpendingForecast> {
        let window = Window::trailing(now, self.lookback_days(horizon));
        let grouped = stats::group_by_category(
            transactions
                .iter()
                .filter(|t| t.is_expense() && window.contains(t.date)),
        );

        let scale = horizon.days() as f64 / 30.0;

        let mut forecasts: Vec<SpendingForecast> = grouped
            .into_iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(category, series)| {
                let historical_average = stats::mean(&series.amounts);
                let trend =
                    stats::half_split_trend(&series.amounts, self.config.trend_threshold_percent);
                let confidence = stats::confidence_from_cv(
                    stats::coefficient_of_variation(&series.amounts),
                    self.config.high_confidence_max_cv,
                    self.config.medium_confidence_max_cv,
                );

                SpendingForecast {
                    category,
                    horizon_days: horizon.days() as u32,
                    historical_average,
                    predicted_amount: historical_average * (1.0 + trend.percent / 100.0) * scale,
                    trend: trend.trend,
                    trend_percent: trend.percent,
                    confidence,
                    sample_count: series.len(),
                }
            })
            .collect();

        forecasts.sort_by(|a, b| {
            b.predicted_amount
                .partial_cmp(&a.predicted_amount)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        debug!(
            horizon = horizon.days(),
            categories = forecasts.len(),
            "Spending forecast complete"
        );

        forecasts
    }
}

impl Default for SpendingForecaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{Confidence, Trend};
    use crate::test_utils::{fixed_now, HistoryBuilder};

    #[test]
    fn test_lookback_is_capped() {
        let forecaster = SpendingForecaster::new();
        assert_eq!(forecaster.lookback_days(ForecastHorizon::Days30), 90);
        assert_eq!(forecaster.lookback_days(ForecastHorizon::Days90), 180);
    }

    #[test]
    fn test_steady_category_forecast() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .repeating(1, 10, 6, 40.0, "Groceries")
            .build();

        let forecasts =
            SpendingForecaster::new().forecast(&history.transactions, ForecastHorizon::Days30, now);

        assert_eq!(forecasts.len(), 1);
        let f = &forecasts[0];
        assert_eq!(f.category, "Groceries");
        assert_eq!(f.sample_count, 6);
        assert_eq!(f.trend, Trend::Stable);
        assert_eq!(f.confidence, Confidence::High);
        assert!((f.predicted_amount - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizon_scales_linearly() {
        let now = fixed_now();
        // All samples inside the 90-day window so both horizons see the same data
        let history = HistoryBuilder::new(now)
            .expense(5, 30.0, "Dining")
            .expense(20, 60.0, "Dining")
            .expense(40, 45.0, "Dining")
            .expense(70, 25.0, "Dining")
            .build();
        let forecaster = SpendingForecaster::new();

        let short = forecaster.forecast(&history.transactions, ForecastHorizon::Days30, now);
        let long = forecaster.forecast(&history.transactions, ForecastHorizon::Days90, now);

        assert_eq!(short[0].historical_average, long[0].historical_average);
        assert!((long[0].predicted_amount - 3.0 * short[0].predicted_amount).abs() < 1e-9);
    }

    #[test]
    fn test_rising_trend_raises_prediction() {
        let now = fixed_now();
        // Chronological: 20, 20, 40, 40 (latest first in the builder)
        let history = HistoryBuilder::new(now)
            .expense(1, 40.0, "Fuel")
            .expense(10, 40.0, "Fuel")
            .expense(20, 20.0, "Fuel")
            .expense(30, 20.0, "Fuel")
            .build();

        let forecasts =
            SpendingForecaster::new().forecast(&history.transactions, ForecastHorizon::Days30, now);

        let f = &forecasts[0];
        assert_eq!(f.trend, Trend::Increasing);
        assert!((f.trend_percent - 100.0).abs() < 1e-9);
        // average 30 × (1 + 1.0) × 1
        assert!((f.predicted_amount - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_income_and_old_expenses() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(3, 5000.0)
            .expense(120, 900.0, "Travel")
            .expense(2, 15.0, "Coffee")
            .build();

        let forecasts =
            SpendingForecaster::new().forecast(&history.transactions, ForecastHorizon::Days30, now);

        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].category, "Coffee");
        // Single sample: stable, zero spread
        assert_eq!(forecasts[0].trend, Trend::Stable);
        assert_eq!(forecasts[0].confidence, Confidence::High);
    }

    #[test]
    fn test_sorted_by_prediction() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .expense(1, 10.0, "Small")
            .expense(2, 500.0, "Rent")
            .expense(3, 80.0, "Utilities")
            .build();

        let forecasts =
            SpendingForecaster::new().forecast(&history.transactions, ForecastHorizon::Days30, now);
        let order: Vec<_> = forecasts.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(order, vec!["Rent", "Utilities", "Small"]);
    }

    #[test]
    fn test_empty_history() {
        let forecasts =
            SpendingForecaster::new().forecast(&[], ForecastHorizon::Days90, fixed_now());
        assert!(forecasts.is_empty());
    }
}
