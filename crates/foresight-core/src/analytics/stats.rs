//! Statistical building blocks shared by the analyzers
//!
//! Each function is a pure fold over a slice. Degenerate inputs (empty
//! slices, zero means) produce defined values instead of NaN or infinity.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::TransactionRecord;

use super::types::{Confidence, Trend};

/// Arithmetic mean (0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (0 for an empty slice)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard deviation divided by mean
///
/// `None` when the mean is zero (or the slice is empty): the ratio is
/// undefined and callers decide what that means for them.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let avg = mean(values);
    if avg.abs() < f64::EPSILON {
        return None;
    }
    Some(population_std_dev(values) / avg.abs())
}

/// Result of comparing the two halves of a chronological series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSummary {
    pub trend: Trend,
    pub percent: f64,
}

impl TrendSummary {
    pub const STABLE: TrendSummary = TrendSummary {
        trend: Trend::Stable,
        percent: 0.0,
    };
}

/// Classify direction by splitting chronologically ordered amounts at the midpoint
///
/// The first half is `amounts[..n/2]`. Fewer than two samples, or a zero
/// first-half mean, leave nothing to compare against and read as stable.
pub fn half_split_trend(amounts: &[f64], threshold_percent: f64) -> TrendSummary {
    if amounts.len() < 2 {
        return TrendSummary::STABLE;
    }

    let (first, second) = amounts.split_at(amounts.len() / 2);
    let first_avg = mean(first);
    if first_avg < f64::EPSILON {
        return TrendSummary::STABLE;
    }

    let percent = (mean(second) - first_avg) / first_avg * 100.0;
    let trend = if percent > threshold_percent {
        Trend::Increasing
    } else if percent < -threshold_percent {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    TrendSummary { trend, percent }
}

/// Map a coefficient of variation onto a confidence tier
///
/// Monotonic: a lower CV never yields a lower tier. An undefined CV is `Low`.
pub fn confidence_from_cv(cv: Option<f64>, high_max: f64, medium_max: f64) -> Confidence {
    match cv {
        Some(cv) if cv < high_max => Confidence::High,
        Some(cv) if cv < medium_max => Confidence::Medium,
        _ => Confidence::Low,
    }
}

/// Amounts and dates for one category, in chronological order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySeries {
    pub dates: Vec<DateTime<Utc>>,
    pub amounts: Vec<f64>,
}

impl CategorySeries {
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Whole days between consecutive transactions
    pub fn interval_days(&self) -> Vec<f64> {
        self.dates
            .windows(2)
            .map(|w| (w[1].date_naive() - w[0].date_naive()).num_days() as f64)
            .collect()
    }

    pub fn first_date(&self) -> Option<DateTime<Utc>> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.dates.last().copied()
    }
}

/// Group transactions by exact category string, each series sorted by date
pub fn group_by_category<'a, I>(transactions: I) -> BTreeMap<String, CategorySeries>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut grouped: BTreeMap<String, Vec<&TransactionRecord>> = BTreeMap::new();
    for tx in transactions {
        grouped.entry(tx.category.clone()).or_default().push(tx);
    }

    grouped
        .into_iter()
        .map(|(category, mut txs)| {
            // Ties broken by id so equal timestamps still order deterministically
            txs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
            let series = CategorySeries {
                dates: txs.iter().map(|t| t.date).collect(),
                amounts: txs.iter().map(|t| t.amount).collect(),
            };
            (category, series)
        })
        .collect()
}

/// A half-open window `(start, end]` of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// The `days` days ending at `now`
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// The `days` days ending where `self` starts
    pub fn preceding(&self, days: i64) -> Self {
        Self {
            start: self.start - Duration::days(days),
            end: self.start,
        }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date > self.start && date <= self.end
    }
}

/// Income and expense totals inside a window (transfers are ignored)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowTotals {
    pub income: f64,
    pub expenses: f64,
}

impl FlowTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

pub fn flow_totals(transactions: &[TransactionRecord], window: Window) -> FlowTotals {
    transactions
        .iter()
        .filter(|t| window.contains(t.date))
        .fold(FlowTotals::default(), |acc, t| {
            if t.is_income() {
                FlowTotals {
                    income: acc.income + t.amount,
                    ..acc
                }
            } else if t.is_expense() {
                FlowTotals {
                    expenses: acc.expenses + t.amount,
                    ..acc
                }
            } else {
                acc
            }
        })
}

/// Whole calendar months from `from` to `to` (negative when `to` is earlier)
///
/// A month only counts once its day-of-month has been reached, so
/// Jan 15 → Mar 15 is 2 but Jan 15 → Mar 14 is 1.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    use chrono::Datelike;

    let mut months =
        (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64);
    if months > 0 && to.day() < from.day() {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}
