//! Anomaly Detector
//!
//! Three independent, stateless rules:
//! - **Spending spike** - last week's daily spend well above the prior baseline
//! - **Income drop** - last week's daily income under half the prior baseline
//! - **Goal at risk** - active goals unlikely to be reached on time

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::AnomalyConfig;
use crate::models::{GoalRecord, TransactionRecord};

use super::goal_predictor::GoalAchievementPredictor;
use super::stats::{self, Window};
use super::types::{Anomaly, AnomalyType, GoalPrediction, Severity};

/// Detects spending spikes, income drops, and goals at risk
pub struct AnomalyDetector {
    config: AnomalyConfig,
    predictor: GoalAchievementPredictor,
}

/// Average daily flows for the recent and baseline windows
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowRates {
    recent_total_expenses: f64,
    recent_daily_expenses: f64,
    baseline_daily_expenses: f64,
    recent_daily_income: f64,
    baseline_daily_income: f64,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::with_config(AnomalyConfig::default())
    }

    pub fn with_config(config: AnomalyConfig) -> Self {
        Self {
            config,
            predictor: GoalAchievementPredictor::new(),
        }
    }

    /// Use a specific predictor for the goal-at-risk rule
    pub fn with_goal_predictor(mut self, predictor: GoalAchievementPredictor) -> Self {
        self.predictor = predictor;
        self
    }

    /// Run every rule, most severe first
    pub fn detect(
        &self,
        transactions: &[TransactionRecord],
        goals: &[GoalRecord],
        now: DateTime<Utc>,
    ) -> Vec<Anomaly> {
        let predictions = self.predictor.predict(goals, transactions, now);
        self.detect_with_predictions(transactions, &predictions, now)
    }

    /// Same as [`detect`](Self::detect) with goal predictions already computed
    pub fn detect_with_predictions(
        &self,
        transactions: &[TransactionRecord],
        predictions: &[GoalPrediction],
        now: DateTime<Utc>,
    ) -> Vec<Anomaly> {
        let rates = self.window_rates(transactions, now);

        let mut anomalies: Vec<Anomaly> = Vec::new();
        anomalies.extend(self.spending_spike(&rates, now));
        anomalies.extend(self.income_drop(&rates, now));
        anomalies.extend(self.goals_at_risk(predictions, now));

        // Stable sort keeps rule order within a severity
        anomalies.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));

        debug!(count = anomalies.len(), "Anomaly detection complete");

        anomalies
    }

    fn window_rates(&self, transactions: &[TransactionRecord], now: DateTime<Utc>) -> WindowRates {
        let recent_window = Window::trailing(now, self.config.recent_days);
        let baseline_window = recent_window.preceding(self.config.baseline_days);

        let recent = stats::flow_totals(transactions, recent_window);
        let baseline = stats::flow_totals(transactions, baseline_window);

        let recent_days = self.config.recent_days as f64;
        let baseline_days = self.config.baseline_days as f64;

        WindowRates {
            recent_total_expenses: recent.expenses,
            recent_daily_expenses: recent.expenses / recent_days,
            baseline_daily_expenses: baseline.expenses / baseline_days,
            recent_daily_income: recent.income / recent_days,
            baseline_daily_income: baseline.income / baseline_days,
        }
    }

    fn spending_spike(&self, rates: &WindowRates, now: DateTime<Utc>) -> Option<Anomaly> {
        if rates.recent_total_expenses <= self.config.spike_min_recent_total {
            return None;
        }

        let baseline = rates.baseline_daily_expenses;
        let recent = rates.recent_daily_expenses;
        if recent <= baseline * self.config.spike_warning_multiplier {
            return None;
        }

        let severity = if recent > baseline * self.config.spike_critical_multiplier {
            Severity::Critical
        } else {
            Severity::Warning
        };

        let description = if baseline > 0.0 {
            format!(
                "You've spent ${:.0}/day over the last {} days, {:.1}× your usual ${:.0}/day.",
                recent,
                self.config.recent_days,
                recent / baseline,
                baseline
            )
        } else {
            format!(
                "You've spent ${:.0} over the last {} days with no spending in the weeks before.",
                rates.recent_total_expenses, self.config.recent_days
            )
        };

        let mut anomaly = Anomaly::new(
            AnomalyType::SpendingSpike,
            severity,
            "Spending Spike",
            description,
            "Review this week's purchases and pause non-essential spending.",
            now,
        );
        if baseline > 0.0 {
            anomaly = anomaly.with_metric(recent / baseline);
        }
        Some(anomaly)
    }

    fn income_drop(&self, rates: &WindowRates, now: DateTime<Utc>) -> Option<Anomaly> {
        let baseline = rates.baseline_daily_income;
        let recent = rates.recent_daily_income;
        if baseline <= 0.0 || recent >= baseline * self.config.income_drop_ratio {
            return None;
        }

        Some(
            Anomaly::new(
                AnomalyType::IncomeDrop,
                Severity::Critical,
                "Income Drop",
                format!(
                    "Income over the last {} days averaged ${:.0}/day, down from ${:.0}/day.",
                    self.config.recent_days, recent, baseline
                ),
                "Check for a missed paycheck and hold off on large purchases until income recovers.",
                now,
            )
            .with_metric(recent / baseline),
        )
    }

    fn goals_at_risk(&self, predictions: &[GoalPrediction], now: DateTime<Utc>) -> Vec<Anomaly> {
        predictions
            .iter()
            .filter(|p| !p.on_track && p.probability < self.config.goal_risk_probability)
            .map(|p| {
                let severity = if p.probability < self.config.goal_critical_probability {
                    Severity::Critical
                } else {
                    Severity::Warning
                };

                Anomaly::new(
                    AnomalyType::GoalAtRisk,
                    severity,
                    format!("{} At Risk", p.title),
                    format!(
                        "{:.0}% likely to finish on time: needs ${:.0}/month, saving ${:.0}/month.",
                        p.probability, p.required_monthly_contribution, p.monthly_savings_capacity
                    ),
                    p.recommendation.clone(),
                    now,
                )
                .with_goal(p.goal_id.clone())
                .with_metric(p.probability)
            })
            .collect()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_now, months_ahead, HistoryBuilder};

    fn of_type(anomalies: &[Anomaly], kind: AnomalyType) -> Vec<&Anomaly> {
        anomalies.iter().filter(|a| a.anomaly_type == kind).collect()
    }

    #[test]
    fn test_triple_spending_is_critical_spike() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 10.0, "Groceries")
            .daily_expense(6, 0, 30.0, "Groceries")
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        let spikes = of_type(&anomalies, AnomalyType::SpendingSpike);

        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].severity, Severity::Critical);
        assert!((spikes[0].metric.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(spikes[0].detected_at, now);
    }

    #[test]
    fn test_moderate_increase_is_warning() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 20.0, "Groceries")
            .daily_expense(6, 0, 35.0, "Groceries")
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        let spikes = of_type(&anomalies, AnomalyType::SpendingSpike);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].severity, Severity::Warning);
    }

    #[test]
    fn test_small_increase_no_spike() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 20.0, "Groceries")
            .daily_expense(6, 0, 28.0, "Groceries")
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        assert!(of_type(&anomalies, AnomalyType::SpendingSpike).is_empty());
    }

    #[test]
    fn test_spike_needs_minimum_total() {
        let now = fixed_now();
        // 10× the baseline but only $70 in the week
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 1.0, "Snacks")
            .daily_expense(6, 0, 10.0, "Snacks")
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        assert!(of_type(&anomalies, AnomalyType::SpendingSpike).is_empty());
    }

    #[test]
    fn test_spike_with_no_baseline() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now).expense(1, 400.0, "Electronics").build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        let spikes = of_type(&anomalies, AnomalyType::SpendingSpike);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].severity, Severity::Critical);
        assert!(spikes[0].metric.is_none());
    }

    #[test]
    fn test_income_drop_after_weekly_paychecks() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(9, 2000.0)
            .income(16, 2000.0)
            .income(23, 2000.0)
            .income(29, 2000.0)
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        let drops = of_type(&anomalies, AnomalyType::IncomeDrop);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].severity, Severity::Critical);
        assert_eq!(drops[0].metric, Some(0.0));
    }

    #[test]
    fn test_no_income_drop_without_history() {
        let anomalies = AnomalyDetector::new().detect(&[], &[], fixed_now());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_goal_at_risk() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(10, 2500.0)
            .expense(12, 2000.0, "Rent")
            .goal(GoalRecord::new(
                "g1",
                "Emergency Fund",
                12000.0,
                1000.0,
                months_ahead(now, 2),
            ))
            .goal(GoalRecord::new("g2", "Gift", 100.0, 0.0, months_ahead(now, 2)))
            .build();

        let anomalies =
            AnomalyDetector::new().detect(&history.transactions, &history.goals, now);
        let at_risk = of_type(&anomalies, AnomalyType::GoalAtRisk);

        assert_eq!(at_risk.len(), 1);
        assert_eq!(at_risk[0].goal_id.as_deref(), Some("g1"));
        assert_eq!(at_risk[0].severity, Severity::Critical);
        assert_eq!(at_risk[0].title, "Emergency Fund At Risk");
    }

    fn goal_risk_for(monthly_income: f64) -> Vec<Anomaly> {
        let now = fixed_now();
        // Needs $1000/month: $2000 left over two months
        let history = HistoryBuilder::new(now)
            .income(10, monthly_income)
            .expense(12, 2000.0, "Rent")
            .goal(GoalRecord::new("g1", "Car", 3000.0, 1000.0, months_ahead(now, 2)))
            .build();

        let anomalies =
            AnomalyDetector::new().detect(&history.transactions, &history.goals, now);
        anomalies
            .into_iter()
            .filter(|a| a.anomaly_type == AnomalyType::GoalAtRisk)
            .collect()
    }

    #[test]
    fn test_goal_at_risk_warning_tier() {
        // Saving $600 of $1000 needed: 30% likely
        let at_risk = goal_risk_for(2600.0);

        assert_eq!(at_risk.len(), 1);
        assert_eq!(at_risk[0].severity, Severity::Warning);
        assert!((at_risk[0].metric.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_goal_at_risk_critical_boundary() {
        // Saving $500 of $1000 needed: exactly 25% is still a warning
        let at_risk = goal_risk_for(2500.0);
        assert_eq!(at_risk.len(), 1);
        assert_eq!(at_risk[0].metric, Some(25.0));
        assert_eq!(at_risk[0].severity, Severity::Warning);

        // Saving $400: 20% likely
        let at_risk = goal_risk_for(2400.0);
        assert_eq!(at_risk.len(), 1);
        assert_eq!(at_risk[0].severity, Severity::Critical);
    }

    #[test]
    fn test_goal_at_risk_cutoff() {
        // Saving $1000 of $1000 needed is on track; $960 is 48% and flagged
        assert!(goal_risk_for(3000.0).is_empty());
        assert_eq!(goal_risk_for(2960.0)[0].severity, Severity::Warning);
    }

    #[test]
    fn test_sorted_by_severity() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 20.0, "Groceries")
            .daily_expense(6, 0, 35.0, "Groceries")
            .income(12, 3000.0)
            .build();

        let anomalies = AnomalyDetector::new().detect(&history.transactions, &[], now);
        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::IncomeDrop);
        assert_eq!(anomalies[1].anomaly_type, AnomalyType::SpendingSpike);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .daily_expense(29, 7, 10.0, "Groceries")
            .daily_expense(6, 0, 30.0, "Groceries")
            .income(20, 4000.0)
            .build();
        let detector = AnomalyDetector::new();

        let first = detector.detect(&history.transactions, &history.goals, now);
        let second = detector.detect(&history.transactions, &history.goals, now);
        assert_eq!(first, second);
    }
}
