//! Domain models for Foresight
//!
//! These are the strict internal records every analysis works on. Loosely
//! typed input is converted into them once, in [`crate::history`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned when a transaction has none (or a blank one)
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income, expense, or transfer
///
/// `amount` is always a non-negative magnitude; the direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl TransactionRecord {
    /// Create a transaction, sanitizing the amount and category
    pub fn new(
        id: impl Into<String>,
        kind: TransactionType,
        amount: f64,
        category: impl AsRef<str>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            amount: sanitize_amount(amount),
            kind,
            category: normalize_category(Some(category.as_ref())),
            date,
            description: None,
        }
    }

    /// Shorthand for an expense record
    pub fn expense(
        id: impl Into<String>,
        amount: f64,
        category: impl AsRef<str>,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(id, TransactionType::Expense, amount, category, date)
    }

    /// Shorthand for an income record
    pub fn income(id: impl Into<String>, amount: f64, date: DateTime<Utc>) -> Self {
        Self::new(id, TransactionType::Income, amount, "Income", date)
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// Savings goal lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" | "complete" => Ok(Self::Completed),
            "paused" => Ok(Self::Paused),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: f64,
    /// May exceed `target_amount` transiently
    pub current_amount: f64,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
}

impl GoalRecord {
    /// Create an active goal
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            title: title.into(),
            target_amount: sanitize_amount(target_amount),
            current_amount: sanitize_amount(current_amount),
            target_date,
            status: GoalStatus::Active,
        }
    }

    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_amount
    }
}

/// Coarse account aggregates supplied alongside the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Running total savings; seeds the cash-flow projection
    pub total_savings: f64,
}

/// Parse a decimal amount string into a non-negative magnitude
///
/// Accepts plain decimals plus the usual export noise (`$`, thousands
/// separators, surrounding whitespace). Returns `None` when nothing usable
/// remains, so callers can count the default.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(f64::abs)
}

/// Clamp an amount to a finite non-negative magnitude (NaN and infinities become 0)
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() {
        value.abs()
    } else {
        0.0
    }
}

/// Resolve a category label, defaulting blank or missing values
///
/// Grouping is exact-match and case-sensitive, so only surrounding
/// whitespace is trimmed.
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Parse a timestamp from RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare date
///
/// Bare dates are placed at 12:00 UTC so later offset handling never moves
/// them onto a neighbouring calendar day.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    parse_date(raw).and_then(|d| d.and_hms_opt(12, 0, 0)).map(|n| n.and_utc())
}

/// Parse a calendar date (`YYYY-MM-DD`, or the date part of a timestamp)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
