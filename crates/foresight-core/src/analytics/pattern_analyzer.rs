//! Spending Pattern Analyzer
//!
//! Looks at up to six months of expenses and describes them:
//! - **Categories** - totals, shares, trend and frequency per category
//! - **Recurring expenses** - categories charged at regular intervals
//! - **Behavior** - small-purchase habits, weekend share, time of day, month phase
//! - **Unusual transactions** - outsized amounts and same-day bursts
//! - **Recommendations** - prioritized plain-language suggestions

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use tracing::debug;

use crate::config::{PatternConfig, RecommendationConfig};
use crate::models::TransactionRecord;

use super::stats::{self, CategorySeries, Window};
use super::types::{
    BehaviorProfile, CategoryStats, ImpulsiveBuying, MonthPhase, MonthPhaseSpending,
    RecurringExpense, RecurringFrequency, SpendingFrequency, SpendingInsights, TimeOfDay,
    TimeOfDaySpending, Trend, UnusualReason, UnusualTransaction, WeekendSpending,
};

const INSUFFICIENT_DATA_MESSAGE: &str =
    "Add a few more weeks of transactions to unlock spending pattern insights.";

const BALANCED_MESSAGE: &str =
    "Your spending looks balanced across categories and time. Keep it up!";

/// Analyzes spending habits over a bounded lookback window
pub struct SpendingPatternAnalyzer {
    config: PatternConfig,
    recommendations: RecommendationConfig,
}

impl SpendingPatternAnalyzer {
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default(), RecommendationConfig::default())
    }

    pub fn with_config(config: PatternConfig, recommendations: RecommendationConfig) -> Self {
        Self {
            config,
            recommendations,
        }
    }

    pub fn analyze(&self, transactions: &[TransactionRecord], now: DateTime<Utc>) -> SpendingInsights {
        let window = Window::trailing(now, self.config.lookback_days);
        let mut expenses: Vec<&TransactionRecord> = transactions
            .iter()
            .filter(|t| t.is_expense() && window.contains(t.date))
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let total_spending: f64 = expenses.iter().map(|t| t.amount).sum();
        let period_days = match (expenses.first(), expenses.last()) {
            (Some(first), Some(last)) => (last.date.date_naive() - first.date.date_naive()).num_days(),
            _ => 0,
        };

        if expenses.len() < self.config.min_expense_records {
            debug!(
                expenses = expenses.len(),
                required = self.config.min_expense_records,
                "Not enough expenses for pattern analysis"
            );
            return SpendingInsights {
                total_spending,
                expense_count: expenses.len(),
                period_days,
                categories: Vec::new(),
                recurring_expenses: Vec::new(),
                behavior: None,
                unusual_transactions: Vec::new(),
                recommendations: vec![INSUFFICIENT_DATA_MESSAGE.to_string()],
            };
        }

        let grouped = stats::group_by_category(expenses.iter().copied());
        let categories = self.category_breakdown(&grouped, total_spending);
        let recurring_expenses = self.recurring_expenses(&grouped);
        let behavior = self.behavior_profile(&expenses, total_spending, period_days);
        let unusual_transactions = self.unusual_transactions(&expenses);
        let recommendations = self.recommendations(&categories, &behavior, total_spending);

        debug!(
            expenses = expenses.len(),
            categories = categories.len(),
            recurring = recurring_expenses.len(),
            unusual = unusual_transactions.len(),
            "Spending pattern analysis complete"
        );

        SpendingInsights {
            total_spending,
            expense_count: expenses.len(),
            period_days,
            categories,
            recurring_expenses,
            behavior: Some(behavior),
            unusual_transactions,
            recommendations,
        }
    }

    fn category_breakdown(
        &self,
        grouped: &BTreeMap<String, CategorySeries>,
        total_spending: f64,
    ) -> Vec<CategoryStats> {
        let mut categories: Vec<CategoryStats> = grouped
            .iter()
            .map(|(category, series)| {
                let total = series.total();
                let trend = stats::half_split_trend(&series.amounts, self.config.trend_threshold_percent);
                CategoryStats {
                    category: category.clone(),
                    total,
                    average: stats::mean(&series.amounts),
                    count: series.len(),
                    percentage: share_percent(total, total_spending),
                    trend: trend.trend,
                    trend_percent: trend.percent,
                    frequency: spending_frequency(series),
                }
            })
            .collect();

        categories.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        categories
    }

    /// Categories whose intervals are regular enough to predict
    ///
    /// Sorted by monthly-equivalent cost, largest first.
    fn recurring_expenses(&self, grouped: &BTreeMap<String, CategorySeries>) -> Vec<RecurringExpense> {
        let mut recurring: Vec<RecurringExpense> = grouped
            .iter()
            .filter(|(_, series)| series.len() >= self.config.recurring_min_transactions)
            .filter_map(|(category, series)| self.detect_recurring(category, series))
            .collect();

        recurring.sort_by(|a, b| {
            let a_monthly = a.average_amount * a.frequency.per_month();
            let b_monthly = b.average_amount * b.frequency.per_month();
            b_monthly
                .partial_cmp(&a_monthly)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        recurring
    }

    fn detect_recurring(&self, category: &str, series: &CategorySeries) -> Option<RecurringExpense> {
        let intervals = series.interval_days();
        let average_interval = stats::mean(&intervals);
        // Same-day repeats are not a schedule
        if average_interval <= 0.0 {
            return None;
        }

        let cv = stats::coefficient_of_variation(&intervals)?;
        if cv >= self.config.recurring_max_cv {
            return None;
        }

        let frequency = if average_interval < self.config.weekly_max_interval_days {
            RecurringFrequency::Weekly
        } else if average_interval > self.config.quarterly_min_interval_days {
            RecurringFrequency::Quarterly
        } else {
            RecurringFrequency::Monthly
        };

        let last_date = series.last_date()?.date_naive();
        let next_expected_date = last_date + Duration::days(average_interval.round() as i64);

        Some(RecurringExpense {
            category: category.to_string(),
            average_amount: stats::mean(&series.amounts),
            frequency,
            average_interval_days: average_interval,
            confidence: (1.0 - cv).clamp(0.0, 1.0),
            occurrences: series.len(),
            last_date,
            next_expected_date,
        })
    }

    fn behavior_profile(
        &self,
        expenses: &[&TransactionRecord],
        total_spending: f64,
        period_days: i64,
    ) -> BehaviorProfile {
        BehaviorProfile {
            impulsive_buying: self.impulsive_buying(expenses, period_days),
            weekend: weekend_spending(expenses, total_spending),
            time_of_day: time_of_day_spending(expenses),
            month_phase: month_phase_spending(expenses),
        }
    }

    fn impulsive_buying(&self, expenses: &[&TransactionRecord], period_days: i64) -> ImpulsiveBuying {
        let threshold = self.config.small_purchase_threshold;
        let (count, total_amount) = expenses
            .iter()
            .filter(|t| t.amount < threshold)
            .fold((0usize, 0.0), |(count, total), t| (count + 1, total + t.amount));

        let weeks = (period_days as f64 / 7.0).max(1.0);
        let per_week = count as f64 / weeks;

        ImpulsiveBuying {
            detected: per_week > self.config.impulsive_per_week,
            small_purchase_count: count,
            per_week,
            total_amount,
            threshold,
        }
    }

    /// Outsized amounts plus members of same-day bursts of above-average purchases
    fn unusual_transactions(&self, expenses: &[&TransactionRecord]) -> Vec<UnusualTransaction> {
        let amounts: Vec<f64> = expenses.iter().map(|t| t.amount).collect();
        let mean = stats::mean(&amounts);
        let std_dev = stats::population_std_dev(&amounts);
        let high_cutoff = mean + self.config.unusual_std_devs * std_dev;

        let mut unusual: Vec<UnusualTransaction> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        if std_dev > 0.0 {
            for tx in expenses.iter().filter(|t| t.amount > high_cutoff) {
                if seen.insert(tx.id.as_str()) {
                    unusual.push(UnusualTransaction {
                        transaction_id: tx.id.clone(),
                        category: tx.category.clone(),
                        amount: tx.amount,
                        date: tx.date,
                        reason: UnusualReason::HighAmount,
                        explanation: format!(
                            "${:.2} is well above your typical ${:.2} purchase",
                            tx.amount, mean
                        ),
                    });
                }
            }
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<&TransactionRecord>> = BTreeMap::new();
        for tx in expenses.iter().filter(|t| t.amount > mean) {
            by_day.entry(tx.date.date_naive()).or_default().push(tx);
        }

        for (day, cluster) in by_day {
            if cluster.len() <= self.config.cluster_min_purchases {
                continue;
            }
            for tx in &cluster {
                if seen.insert(tx.id.as_str()) {
                    unusual.push(UnusualTransaction {
                        transaction_id: tx.id.clone(),
                        category: tx.category.clone(),
                        amount: tx.amount,
                        date: tx.date,
                        reason: UnusualReason::SameDayCluster,
                        explanation: format!(
                            "One of {} above-average purchases on {}",
                            cluster.len(),
                            day.format("%Y-%m-%d")
                        ),
                    });
                }
            }
        }

        unusual.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        unusual.truncate(self.config.max_unusual);
        unusual
    }

    fn recommendations(
        &self,
        categories: &[CategoryStats],
        behavior: &BehaviorProfile,
        total_spending: f64,
    ) -> Vec<String> {
        let rules = &self.recommendations;
        let mut recs = Vec::new();

        if let Some(top) = categories.first() {
            if top.percentage > rules.overspending_share_percent {
                recs.push(format!(
                    "{} is your largest expense at {:.0}% of spending. A monthly budget for it would have the biggest impact.",
                    top.category, top.percentage
                ));
            }
        }

        if behavior.weekend.weekend_share_percent > rules.weekend_bias_share_percent {
            recs.push(format!(
                "Weekends account for {:.0}% of your spending. Planning weekend activities ahead can keep costs down.",
                behavior.weekend.weekend_share_percent
            ));
        }

        let impulse = &behavior.impulsive_buying;
        if impulse.detected {
            recs.push(format!(
                "You make about {:.1} purchases under ${:.0} each week (${:.0} total). Try waiting a day before small buys.",
                impulse.per_week, impulse.threshold, impulse.total_amount
            ));
        }

        if let Some(rising) = categories.iter().find(|c| c.trend == Trend::Increasing) {
            recs.push(format!(
                "{} spending is up {:.0}% recently. Check whether this is a one-off or a new habit.",
                rising.category, rising.trend_percent
            ));
        }

        if let Some(dominant) = categories
            .iter()
            .find(|c| c.percentage > rules.concentration_share_percent)
        {
            recs.push(format!(
                "{:.0}% of your spending goes to {}. Look for cheaper alternatives in that category.",
                dominant.percentage, dominant.category
            ));
        }

        let late_share = share_percent(behavior.month_phase.late, total_spending);
        if late_share > rules.late_month_share_percent {
            recs.push(format!(
                "{:.0}% of your spending happens in the last third of the month. Spreading purchases out can ease end-of-month pressure.",
                late_share
            ));
        }

        recs.truncate(rules.max_recommendations);
        if recs.is_empty() {
            recs.push(BALANCED_MESSAGE.to_string());
        }
        recs
    }
}

impl Default for SpendingPatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// `part` as a percentage of `whole` (0 when `whole` is zero)
fn share_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Label a category by transactions per day over its own span
fn spending_frequency(series: &CategorySeries) -> SpendingFrequency {
    if series.len() < 2 {
        return SpendingFrequency::Occasional;
    }

    let span_days = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => (last.date_naive() - first.date_naive()).num_days(),
        _ => 0,
    };
    let per_day = series.len() as f64 / (span_days.max(1) as f64);

    if per_day >= 0.5 {
        SpendingFrequency::Daily
    } else if per_day >= 1.0 / 7.0 {
        SpendingFrequency::Weekly
    } else if per_day >= 1.0 / 31.0 {
        SpendingFrequency::Monthly
    } else {
        SpendingFrequency::Occasional
    }
}

fn weekend_spending(expenses: &[&TransactionRecord], total_spending: f64) -> WeekendSpending {
    let weekend_total: f64 = expenses
        .iter()
        .filter(|t| matches!(t.date.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|t| t.amount)
        .sum();

    WeekendSpending {
        weekend_total,
        weekday_total: total_spending - weekend_total,
        weekend_share_percent: share_percent(weekend_total, total_spending),
    }
}

fn time_of_day_spending(expenses: &[&TransactionRecord]) -> TimeOfDaySpending {
    let mut buckets = [0.0f64; 4];
    for tx in expenses {
        let index = match TimeOfDay::from_hour(tx.date.hour()) {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        };
        buckets[index] += tx.amount;
    }

    let order = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    TimeOfDaySpending {
        morning: buckets[0],
        afternoon: buckets[1],
        evening: buckets[2],
        night: buckets[3],
        peak: order[peak_index(&buckets)],
    }
}

fn month_phase_spending(expenses: &[&TransactionRecord]) -> MonthPhaseSpending {
    let mut buckets = [0.0f64; 3];
    for tx in expenses {
        let index = match MonthPhase::from_day(tx.date.day()) {
            MonthPhase::Early => 0,
            MonthPhase::Mid => 1,
            MonthPhase::Late => 2,
        };
        buckets[index] += tx.amount;
    }

    let order = [MonthPhase::Early, MonthPhase::Mid, MonthPhase::Late];

    MonthPhaseSpending {
        early: buckets[0],
        mid: buckets[1],
        late: buckets[2],
        peak: order[peak_index(&buckets)],
    }
}

/// Index of the largest bucket; earlier buckets win ties
fn peak_index(buckets: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in buckets.iter().enumerate() {
        if *value > buckets[best] {
            best = i;
        }
    }
    best
}
