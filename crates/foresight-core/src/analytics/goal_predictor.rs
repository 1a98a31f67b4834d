//! Goal Achievement Predictor
//!
//! Compares each active goal's required monthly contribution with the
//! user's recent net savings rate.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::config::GoalConfig;
use crate::models::{GoalRecord, GoalStatus, TransactionRecord};

use super::stats::{self, Window};
use super::types::GoalPrediction;

/// Average Gregorian month length, used to turn months into days
const DAYS_PER_MONTH: f64 = 30.44;

/// Completion dates further out than this are reported as never
const MAX_COMPLETION_DAYS: f64 = 365.0 * 100.0;

/// Predicts whether active goals will be reached on time
pub struct GoalAchievementPredictor {
    config: GoalConfig,
}

impl GoalAchievementPredictor {
    pub fn new() -> Self {
        Self::with_config(GoalConfig::default())
    }

    pub fn with_config(config: GoalConfig) -> Self {
        Self { config }
    }

    /// Net income minus expenses over the trailing savings window
    pub fn monthly_savings_capacity(
        &self,
        transactions: &[TransactionRecord],
        now: DateTime<Utc>,
    ) -> f64 {
        let window = Window::trailing(now, self.config.savings_window_days);
        let net = stats::flow_totals(transactions, window).net();
        net * 30.0 / self.config.savings_window_days as f64
    }

    /// One prediction per active goal, in input order
    pub fn predict(
        &self,
        goals: &[GoalRecord],
        transactions: &[TransactionRecord],
        now: DateTime<Utc>,
    ) -> Vec<GoalPrediction> {
        let capacity = self.monthly_savings_capacity(transactions, now);
        let today = now.date_naive();

        let predictions: Vec<GoalPrediction> = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .map(|goal| self.predict_goal(goal, capacity, today))
            .collect();

        debug!(
            goals = predictions.len(),
            capacity = capacity,
            "Goal predictions complete"
        );

        predictions
    }

    fn predict_goal(&self, goal: &GoalRecord, capacity: f64, today: NaiveDate) -> GoalPrediction {
        let remaining = goal.remaining();
        let months_remaining = stats::whole_months_between(today, goal.target_date).max(0);

        if remaining <= 0.0 {
            return GoalPrediction {
                goal_id: goal.id.clone(),
                title: goal.title.clone(),
                target_amount: goal.target_amount,
                current_amount: goal.current_amount,
                remaining_amount: 0.0,
                months_remaining,
                required_monthly_contribution: 0.0,
                monthly_savings_capacity: capacity,
                on_track: true,
                probability: 100.0,
                predicted_completion_date: Some(today),
                recommendation: format!(
                    "You've reached your {} goal. Consider setting a new target.",
                    goal.title
                ),
            };
        }

        let required = if months_remaining == 0 {
            remaining
        } else {
            remaining / months_remaining as f64
        };

        let on_track = capacity >= required;
        let probability = self.probability(capacity, required, on_track);
        let predicted_completion_date = completion_date(today, remaining, capacity);

        let recommendation = if !on_track {
            format!(
                "Save an extra ${:.0}/month to reach {} by {}, or move the target date later.",
                required - capacity,
                goal.title,
                goal.target_date.format("%b %Y")
            )
        } else if capacity >= required * self.config.excellent_capacity_ratio {
            format!(
                "Excellent progress! At your current rate you'll reach {} ahead of schedule.",
                goal.title
            )
        } else {
            format!(
                "On track. Keep saving ${:.0}/month to reach {} by {}.",
                required,
                goal.title,
                goal.target_date.format("%b %Y")
            )
        };

        GoalPrediction {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            remaining_amount: remaining,
            months_remaining,
            required_monthly_contribution: required,
            monthly_savings_capacity: capacity,
            on_track,
            probability,
            predicted_completion_date,
            recommendation,
        }
    }

    /// Likelihood of completion in percent; `required` is always positive here
    fn probability(&self, capacity: f64, required: f64, on_track: bool) -> f64 {
        let ratio = capacity / required;
        let p = if on_track {
            (self.config.on_track_base_probability + ratio * 25.0)
                .min(self.config.on_track_max_probability)
        } else {
            (50.0 * ratio).max(self.config.off_track_min_probability)
        };
        p.clamp(0.0, 100.0)
    }
}

impl Default for GoalAchievementPredictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Date the remaining amount is covered at the current rate
fn completion_date(today: NaiveDate, remaining: f64, capacity: f64) -> Option<NaiveDate> {
    if capacity <= 0.0 {
        return None;
    }
    let days = (remaining / capacity * DAYS_PER_MONTH).ceil();
    if !days.is_finite() || days > MAX_COMPLETION_DAYS {
        return None;
    }
    today.checked_add_signed(Duration::days(days as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_now, months_ahead, HistoryBuilder};

    #[test]
    fn test_off_track_goal() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(10, 2500.0)
            .expense(5, 2000.0, "Rent")
            .goal(GoalRecord::new(
                "g1",
                "Emergency Fund",
                12000.0,
                1000.0,
                months_ahead(now, 2),
            ))
            .build();

        let predictions =
            GoalAchievementPredictor::new().predict(&history.goals, &history.transactions, now);

        assert_eq!(predictions.len(), 1);
        let p = &predictions[0];
        assert_eq!(p.months_remaining, 2);
        assert!((p.required_monthly_contribution - 5500.0).abs() < 1e-9);
        assert!((p.monthly_savings_capacity - 500.0).abs() < 1e-9);
        assert!(!p.on_track);
        assert!(p.probability < 50.0);
        assert!(p.probability >= 10.0);
        assert!(p.recommendation.contains("$5000"));
    }

    #[test]
    fn test_on_track_probability_capped() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .income(3, 5000.0)
            .goal(GoalRecord::new("g1", "Laptop", 2000.0, 0.0, months_ahead(now, 4)))
            .build();

        let p = &GoalAchievementPredictor::new().predict(&history.goals, &history.transactions, now)
            [0];

        assert!(p.on_track);
        assert_eq!(p.probability, 95.0);
        assert!(p.recommendation.starts_with("Excellent"));
        // 2000 / 5000 months ≈ 12.2 days
        let eta = p.predicted_completion_date.unwrap();
        assert_eq!((eta - now.date_naive()).num_days(), 13);
    }

    #[test]
    fn test_steady_recommendation() {
        let now = fixed_now();
        // Capacity 1200, required 1000: on track but under 1.5×
        let history = HistoryBuilder::new(now)
            .income(3, 1200.0)
            .goal(GoalRecord::new("g1", "Car", 10000.0, 0.0, months_ahead(now, 10)))
            .build();

        let p = &GoalAchievementPredictor::new().predict(&history.goals, &history.transactions, now)
            [0];
        assert!(p.on_track);
        assert!((p.probability - 95.0).abs() < 1e-9);
        assert!(p.recommendation.starts_with("On track"));
    }

    #[test]
    fn test_goal_already_met() {
        let now = fixed_now();
        let goals = vec![GoalRecord::new(
            "g1",
            "Vacation",
            1000.0,
            1500.0,
            months_ahead(now, 3),
        )];

        let p = &GoalAchievementPredictor::new().predict(&goals, &[], now)[0];
        assert!(p.on_track);
        assert_eq!(p.probability, 100.0);
        assert_eq!(p.required_monthly_contribution, 0.0);
        assert_eq!(p.predicted_completion_date, Some(now.date_naive()));
    }

    #[test]
    fn test_past_due_goal_requires_full_remaining() {
        let now = fixed_now();
        let goals = vec![GoalRecord::new(
            "g1",
            "Late",
            1000.0,
            400.0,
            now.date_naive() - Duration::days(40),
        )];

        let p = &GoalAchievementPredictor::new().predict(&goals, &[], now)[0];
        assert_eq!(p.months_remaining, 0);
        assert!((p.required_monthly_contribution - 600.0).abs() < 1e-9);
        assert!(!p.on_track);
        assert_eq!(p.predicted_completion_date, None);
        assert_eq!(p.probability, 10.0);
    }

    #[test]
    fn test_only_active_goals() {
        let now = fixed_now();
        let target = months_ahead(now, 6);
        let goals = vec![
            GoalRecord::new("a", "Active", 100.0, 0.0, target),
            GoalRecord::new("b", "Done", 100.0, 100.0, target).with_status(GoalStatus::Completed),
            GoalRecord::new("c", "Later", 100.0, 0.0, target).with_status(GoalStatus::Paused),
        ];

        let predictions = GoalAchievementPredictor::new().predict(&goals, &[], now);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].goal_id, "a");
    }

    #[test]
    fn test_probability_bounds_and_on_track_consistency() {
        let now = fixed_now();
        let target = months_ahead(now, 5);
        let predictor = GoalAchievementPredictor::new();

        for income in [0.0, 100.0, 999.0, 1000.0, 1001.0, 50_000.0] {
            let history = HistoryBuilder::new(now)
                .income(1, income)
                .expense(2, 300.0, "Bills")
                .goal(GoalRecord::new("g", "Fund", 5000.0, 0.0, target))
                .build();
            for p in predictor.predict(&history.goals, &history.transactions, now) {
                assert!((0.0..=100.0).contains(&p.probability));
                assert_eq!(
                    p.on_track,
                    p.monthly_savings_capacity >= p.required_monthly_contribution
                );
            }
        }
    }
}
