//! Core types for the analytics engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a category's recent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }

    /// Single-character indicator used in the AI context block
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Increasing => "↑",
            Trend::Decreasing => "↓",
            Trend::Stable => "→",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much to trust a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Numeric rank for comparisons (higher = more confident)
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported forecast horizons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ForecastHorizon {
    Days30,
    Days90,
}

impl ForecastHorizon {
    pub fn days(&self) -> i64 {
        match self {
            ForecastHorizon::Days30 => 30,
            ForecastHorizon::Days90 => 90,
        }
    }
}

impl TryFrom<u32> for ForecastHorizon {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            30 => Ok(ForecastHorizon::Days30),
            90 => Ok(ForecastHorizon::Days90),
            _ => Err(format!("Unsupported forecast horizon: {} (use 30 or 90)", days)),
        }
    }
}

impl From<ForecastHorizon> for u32 {
    fn from(horizon: ForecastHorizon) -> u32 {
        horizon.days() as u32
    }
}

impl FromStr for ForecastHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid forecast horizon: {}", s))?;
        ForecastHorizon::try_from(days)
    }
}

/// Projected spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub category: String,
    pub horizon_days: u32,
    /// Mean per-transaction amount over the lookback window
    pub historical_average: f64,
    pub predicted_amount: f64,
    pub trend: Trend,
    /// Second-half mean vs first-half mean, in percent
    pub trend_percent: f64,
    pub confidence: Confidence,
    pub sample_count: usize,
}

/// Outlook for one active goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPrediction {
    pub goal_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining_amount: f64,
    pub months_remaining: i64,
    pub required_monthly_contribution: f64,
    pub monthly_savings_capacity: f64,
    pub on_track: bool,
    /// Always within [0, 100]
    pub probability: f64,
    /// `None` when the current savings rate never reaches the target
    pub predicted_completion_date: Option<NaiveDate>,
    pub recommendation: String,
}

/// Runway risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sampled point on the projected balance trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowForecast {
    /// Days from today (1-based)
    pub day: i64,
    pub date: NaiveDate,
    pub projected_balance: f64,
    pub daily_income: f64,
    pub daily_expenses: f64,
    /// `None` when there are no expenses to cover
    pub months_of_expenses_covered: Option<f64>,
    pub risk_level: RiskLevel,
}

/// Kinds of anomaly the detector raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    SpendingSpike,
    IncomeDrop,
    GoalAtRisk,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::SpendingSpike => "spending_spike",
            AnomalyType::IncomeDrop => "income_drop",
            AnomalyType::GoalAtRisk => "goal_at_risk",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity level of an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth attention soon
    Warning,
    /// Requires immediate attention
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Warning => 1,
            Severity::Critical => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected deviation worth surfacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    pub detected_at: DateTime<Utc>,
    /// Goal the anomaly refers to (goal_at_risk only)
    pub goal_id: Option<String>,
    /// The ratio or probability that triggered the rule
    pub metric: Option<f64>,
}

impl Anomaly {
    pub fn new(
        anomaly_type: AnomalyType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        suggested_action: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            anomaly_type,
            severity,
            title: title.into(),
            description: description.into(),
            suggested_action: suggested_action.into(),
            detected_at,
            goal_id: None,
            metric: None,
        }
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn with_metric(mut self, metric: f64) -> Self {
        self.metric = Some(metric);
        self
    }
}

/// How often a category sees transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingFrequency {
    Daily,
    Weekly,
    Monthly,
    Occasional,
}

impl SpendingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingFrequency::Daily => "daily",
            SpendingFrequency::Weekly => "weekly",
            SpendingFrequency::Monthly => "monthly",
            SpendingFrequency::Occasional => "occasional",
        }
    }
}

/// Per-category aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: f64,
    pub average: f64,
    pub count: usize,
    /// Share of total spend, in percent
    pub percentage: f64,
    pub trend: Trend,
    pub trend_percent: f64,
    pub frequency: SpendingFrequency,
}

/// Cadence of a recurring expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringFrequency {
    Weekly,
    Monthly,
    Quarterly,
}

impl RecurringFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Monthly => "monthly",
            RecurringFrequency::Quarterly => "quarterly",
        }
    }

    /// Occurrences per month, for monthly-equivalent costs
    pub fn per_month(&self) -> f64 {
        match self {
            RecurringFrequency::Weekly => 52.0 / 12.0,
            RecurringFrequency::Monthly => 1.0,
            RecurringFrequency::Quarterly => 1.0 / 3.0,
        }
    }
}

impl fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category whose timing is regular enough to predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub category: String,
    pub average_amount: f64,
    pub frequency: RecurringFrequency,
    pub average_interval_days: f64,
    /// 1 - coefficient of variation of intervals, clamped to [0, 1]
    pub confidence: f64,
    pub occurrences: usize,
    pub last_date: NaiveDate,
    pub next_expected_date: NaiveDate,
}

/// Frequent small purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpulsiveBuying {
    pub detected: bool,
    pub small_purchase_count: usize,
    pub per_week: f64,
    pub total_amount: f64,
    pub threshold: f64,
}

/// Weekend vs weekday split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendSpending {
    pub weekend_total: f64,
    pub weekday_total: f64,
    pub weekend_share_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour of the day (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Summed spend per time-of-day bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDaySpending {
    pub morning: f64,
    pub afternoon: f64,
    pub evening: f64,
    pub night: f64,
    pub peak: TimeOfDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthPhase {
    /// Days 1-10
    Early,
    /// Days 11-20
    Mid,
    /// Days 21-31
    Late,
}

impl MonthPhase {
    pub fn from_day(day: u32) -> Self {
        match day {
            0..=10 => MonthPhase::Early,
            11..=20 => MonthPhase::Mid,
            _ => MonthPhase::Late,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MonthPhase::Early => "early",
            MonthPhase::Mid => "mid",
            MonthPhase::Late => "late",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MonthPhase::Early => "early (days 1-10)",
            MonthPhase::Mid => "mid (days 11-20)",
            MonthPhase::Late => "late (days 21-31)",
        }
    }
}

/// Summed spend per month phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthPhaseSpending {
    pub early: f64,
    pub mid: f64,
    pub late: f64,
    pub peak: MonthPhase,
}

/// Behavioral tendencies derived from timing and size of purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub impulsive_buying: ImpulsiveBuying,
    pub weekend: WeekendSpending,
    pub time_of_day: TimeOfDaySpending,
    pub month_phase: MonthPhaseSpending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusualReason {
    /// More than N standard deviations above the mean amount
    HighAmount,
    /// Part of a same-day burst of above-average purchases
    SameDayCluster,
}

/// A transaction that stands out from the user's normal spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualTransaction {
    pub transaction_id: String,
    pub category: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub reason: UnusualReason,
    pub explanation: String,
}

/// Full spending pattern analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingInsights {
    pub total_spending: f64,
    pub expense_count: usize,
    /// Days between the first and last analyzed expense
    pub period_days: i64,
    /// Sorted by total, largest first
    pub categories: Vec<CategoryStats>,
    pub recurring_expenses: Vec<RecurringExpense>,
    /// `None` when there was too little data to profile
    pub behavior: Option<BehaviorProfile>,
    pub unusual_transactions: Vec<UnusualTransaction>,
    pub recommendations: Vec<String>,
}

/// Kinds of savings opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsOpportunityType {
    /// Recurring charge worth reviewing or renegotiating
    RecurringReview,
    /// Cutting back on frequent small purchases
    ImpulseReduction,
    /// Bringing a rising category back to its earlier level
    TrendReversal,
    /// Moving weekend spend closer to the weekday rate
    WeekendSpending,
}

impl SavingsOpportunityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsOpportunityType::RecurringReview => "recurring_review",
            SavingsOpportunityType::ImpulseReduction => "impulse_reduction",
            SavingsOpportunityType::TrendReversal => "trend_reversal",
            SavingsOpportunityType::WeekendSpending => "weekend_spending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

/// An estimated way to spend less
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub opportunity_type: SavingsOpportunityType,
    pub category: Option<String>,
    pub description: String,
    pub estimated_monthly_savings: f64,
    pub estimated_annual_savings: f64,
    pub difficulty: Difficulty,
}
