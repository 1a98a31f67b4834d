//! Cash Flow Projector
//!
//! Extends the trailing average daily net flow forward from a seed balance
//! and classifies runway risk at sampled points.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::CashFlowConfig;
use crate::models::TransactionRecord;

use super::stats::{self, Window};
use super::types::{CashFlowForecast, RiskLevel};

/// Projects a balance trajectory with runway risk
pub struct CashFlowProjector {
    config: CashFlowConfig,
}

impl CashFlowProjector {
    pub fn new() -> Self {
        Self::with_config(CashFlowConfig::default())
    }

    pub fn with_config(config: CashFlowConfig) -> Self {
        Self { config }
    }

    /// Day offsets that get a forecast point: day 1, every Nth day, and the last day
    pub fn sample_days(&self) -> Vec<i64> {
        let last = self.config.projection_days;
        (1..=last)
            .filter(|d| *d == 1 || d % self.config.sample_interval_days == 0 || *d == last)
            .collect()
    }

    pub fn project(
        &self,
        transactions: &[TransactionRecord],
        seed_balance: f64,
        now: DateTime<Utc>,
    ) -> Vec<CashFlowForecast> {
        let trailing = self.config.trailing_days as f64;
        let totals = stats::flow_totals(
            transactions,
            Window::trailing(now, self.config.trailing_days),
        );
        let daily_income = totals.income / trailing;
        let daily_expenses = totals.expenses / trailing;
        let daily_net = daily_income - daily_expenses;
        let today = now.date_naive();

        let points: Vec<CashFlowForecast> = self
            .sample_days()
            .into_iter()
            .map(|day| {
                let projected_balance = seed_balance + daily_net * day as f64;
                let months_of_expenses_covered = if daily_expenses > 0.0 {
                    Some(projected_balance / (daily_expenses * 30.0))
                } else {
                    None
                };

                CashFlowForecast {
                    day,
                    date: today + Duration::days(day),
                    projected_balance,
                    daily_income,
                    daily_expenses,
                    months_of_expenses_covered,
                    risk_level: self.risk_level(months_of_expenses_covered, projected_balance),
                }
            })
            .collect();

        debug!(
            points = points.len(),
            daily_net = daily_net,
            "Cash flow projection complete"
        );

        points
    }

    fn risk_level(&self, months_covered: Option<f64>, balance: f64) -> RiskLevel {
        match months_covered {
            Some(m) if m < self.config.high_risk_months => RiskLevel::High,
            Some(m) if m < self.config.medium_risk_months => RiskLevel::Medium,
            Some(_) => RiskLevel::Low,
            // No expenses: only a negative balance is a risk
            None if balance < 0.0 => RiskLevel::High,
            None => RiskLevel::Low,
        }
    }
}

impl Default for CashFlowProjector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_now, HistoryBuilder};

    #[test]
    fn test_sample_days() {
        let days = CashFlowProjector::new().sample_days();
        assert_eq!(days.first(), Some(&1));
        assert_eq!(days.last(), Some(&90));
        assert!(days.contains(&7));
        assert!(days.contains(&84));
        assert!(!days.contains(&2));
        assert_eq!(days.len(), 1 + 12 + 1);
    }

    #[test]
    fn test_balance_advances_by_daily_net() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(5, 3000.0)
            .expense(6, 1500.0, "Rent")
            .build();

        let points = CashFlowProjector::new().project(&history.transactions, 1000.0, now);
        let day_one = &points[0];
        assert_eq!(day_one.day, 1);
        assert!((day_one.daily_income - 100.0).abs() < 1e-9);
        assert!((day_one.daily_expenses - 50.0).abs() < 1e-9);
        assert!((day_one.projected_balance - 1050.0).abs() < 1e-9);

        let last = points.last().unwrap();
        assert_eq!(last.day, 90);
        assert!((last.projected_balance - 5500.0).abs() < 1e-9);
        assert_eq!(last.date, now.date_naive() + Duration::days(90));
        // 5500 / 1500 ≈ 3.67 months
        assert_eq!(last.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_transfers_do_not_move_balance() {
        let now = fixed_now();
        let base = HistoryBuilder::new(now)
            .income(5, 3000.0)
            .expense(6, 1500.0, "Rent");
        let with_transfers = HistoryBuilder::new(now)
            .income(5, 3000.0)
            .expense(6, 1500.0, "Rent")
            .transfer(3, 10_000.0)
            .transfer(8, 4_000.0);

        let projector = CashFlowProjector::new();
        let plain = projector.project(base.transactions(), 1000.0, now);
        let moved = projector.project(with_transfers.transactions(), 1000.0, now);
        assert_eq!(plain, moved);
    }

    #[test]
    fn test_risk_tiers() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now).expense(2, 3000.0, "Rent").build();
        let projector = CashFlowProjector::new();

        // Burning 100/day from 2000: under one month covered
        let points = projector.project(&history.transactions, 2000.0, now);
        assert_eq!(points[0].risk_level, RiskLevel::High);

        let points = projector.project(&history.transactions, 8000.0, now);
        // Day 1: 7900 / 3000 ≈ 2.6 months
        assert_eq!(points[0].risk_level, RiskLevel::Medium);
        // Day 90: -1000
        assert_eq!(points.last().unwrap().risk_level, RiskLevel::High);
    }

    #[test]
    fn test_zero_expenses_is_unbounded_runway() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now).income(1, 600.0).build();

        let points = CashFlowProjector::new().project(&history.transactions, 0.0, now);
        assert!(points.iter().all(|p| p.months_of_expenses_covered.is_none()));
        assert!(points.iter().all(|p| p.risk_level == RiskLevel::Low));

        let points = CashFlowProjector::new().project(&[], -50.0, now);
        assert_eq!(points[0].risk_level, RiskLevel::High);
    }
}
