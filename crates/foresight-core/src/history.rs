//! Transaction and goal history
//!
//! The engine never fetches data itself. A [`HistoryProvider`] hands it an
//! already-materialized [`History`] for one user; the analyses then borrow
//! its slices for the duration of a single computation.
//!
//! Input arrives loosely typed (amounts as strings or numbers, dates in a
//! few formats, camelCase or snake_case keys). [`History::from_raw`] is the
//! one place that validates it into the strict records in [`crate::models`].

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use csv::ReaderBuilder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{
    normalize_category, parse_amount, parse_date, parse_timestamp, GoalRecord, GoalStatus,
    StatsSnapshot, TransactionRecord, TransactionType,
};

/// An amount as it appears in exported data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    /// Any other JSON value (`false`, arrays, objects); never resolves
    Other(Value),
}

impl RawAmount {
    /// Resolve to a magnitude, or `None` when unparseable
    pub fn resolve(&self) -> Option<f64> {
        match self {
            RawAmount::Number(n) if n.is_finite() => Some(n.abs()),
            RawAmount::Number(_) => None,
            RawAmount::Text(s) => parse_amount(s),
            RawAmount::Other(_) => None,
        }
    }
}

/// An identifier that may be numeric or textual upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
    Other(Value),
}

impl RawId {
    /// Textual form; `None` for values that cannot name anything
    fn into_string(self) -> Option<String> {
        match self {
            RawId::Number(n) => Some(n.to_string()),
            RawId::Text(s) => Some(s),
            RawId::Other(Value::Number(n)) => Some(n.to_string()),
            RawId::Other(_) => None,
        }
    }
}

/// Accept any scalar as text; structured values become `None`
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Transaction as supplied by the data store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<RawId>,
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default, rename = "type", alias = "kind", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// Goal as supplied by the data store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGoal {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, alias = "targetAmount")]
    pub target_amount: Option<RawAmount>,
    #[serde(default, alias = "currentAmount")]
    pub current_amount: Option<RawAmount>,
    #[serde(default, alias = "targetDate", deserialize_with = "lenient_text")]
    pub target_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

/// Stats snapshot as supplied by the data store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStats {
    #[serde(default, alias = "totalSavings")]
    pub total_savings: Option<RawAmount>,
}

/// Complete history document (the on-disk JSON format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHistory {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub goals: Vec<RawGoal>,
    #[serde(default)]
    pub stats: RawStats,
}

/// What happened while validating raw input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub transactions_loaded: usize,
    pub transactions_skipped: usize,
    pub goals_loaded: usize,
    pub goals_skipped: usize,
    /// Amounts that failed to parse and were treated as zero
    pub amounts_defaulted: usize,
}

/// Validated, immutable history for one computation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub transactions: Vec<TransactionRecord>,
    pub goals: Vec<GoalRecord>,
    pub stats: StatsSnapshot,
}

impl History {
    pub fn new(
        transactions: Vec<TransactionRecord>,
        goals: Vec<GoalRecord>,
        stats: StatsSnapshot,
    ) -> Self {
        Self {
            transactions,
            goals,
            stats,
        }
    }

    /// Validate raw input into strict records
    ///
    /// Records without a usable date (or, for transactions, type) are
    /// skipped. Unparseable amounts become zero so a single corrupt record
    /// cannot poison a category's statistics.
    pub fn from_raw(raw: RawHistory) -> (Self, IngestStats) {
        let mut stats = IngestStats::default();

        let mut transactions = Vec::with_capacity(raw.transactions.len());
        for (index, tx) in raw.transactions.into_iter().enumerate() {
            match validate_transaction(tx, index, &mut stats.amounts_defaulted) {
                Some(record) => transactions.push(record),
                None => stats.transactions_skipped += 1,
            }
        }
        stats.transactions_loaded = transactions.len();

        let mut goals = Vec::with_capacity(raw.goals.len());
        for (index, goal) in raw.goals.into_iter().enumerate() {
            match validate_goal(goal, index, &mut stats.amounts_defaulted) {
                Some(record) => goals.push(record),
                None => stats.goals_skipped += 1,
            }
        }
        stats.goals_loaded = goals.len();

        let total_savings = match raw.stats.total_savings {
            None => 0.0,
            Some(amount) => match amount {
                // Savings can legitimately be negative (overdrawn)
                RawAmount::Number(n) if n.is_finite() => n,
                RawAmount::Text(ref s) => signed_amount(s).unwrap_or_else(|| {
                    stats.amounts_defaulted += 1;
                    0.0
                }),
                _ => {
                    stats.amounts_defaulted += 1;
                    0.0
                }
            },
        };

        if stats.transactions_skipped > 0 || stats.goals_skipped > 0 || stats.amounts_defaulted > 0
        {
            warn!(
                transactions_skipped = stats.transactions_skipped,
                goals_skipped = stats.goals_skipped,
                amounts_defaulted = stats.amounts_defaulted,
                "History contained malformed records"
            );
        }

        debug!(
            transactions = stats.transactions_loaded,
            goals = stats.goals_loaded,
            "History validated"
        );

        (
            Self {
                transactions,
                goals,
                stats: StatsSnapshot { total_savings },
            },
            stats,
        )
    }

    /// Restrict to one user's records (records without a user id are kept)
    pub fn for_user(&self, user_id: &str) -> History {
        let owned = |owner: &str| owner.is_empty() || owner == user_id;
        History {
            transactions: self
                .transactions
                .iter()
                .filter(|t| owned(&t.user_id))
                .cloned()
                .collect(),
            goals: self
                .goals
                .iter()
                .filter(|g| owned(&g.user_id))
                .cloned()
                .collect(),
            stats: self.stats,
        }
    }
}

fn signed_amount(raw: &str) -> Option<f64> {
    let negative = raw.trim_start().starts_with('-');
    parse_amount(raw).map(|v| if negative { -v } else { v })
}

/// Owner of a record: empty when absent, `None` when present but unusable
///
/// An owner that cannot be read must not fall back to "shared", which would
/// show the record to every user.
fn owner_id(raw: Option<RawId>, id: &str) -> Option<String> {
    match raw {
        None => Some(String::new()),
        Some(owner) => {
            let owner = owner.into_string();
            if owner.is_none() {
                debug!(id = %id, "Skipping record with unreadable user id");
            }
            owner
        }
    }
}

fn validate_transaction(
    raw: RawTransaction,
    index: usize,
    defaulted: &mut usize,
) -> Option<TransactionRecord> {
    let id = raw
        .id
        .and_then(RawId::into_string)
        .unwrap_or_else(|| format!("row-{}", index));

    let Some(date) = raw.date.as_deref().and_then(parse_timestamp) else {
        debug!(id = %id, date = ?raw.date, "Skipping transaction with unparseable date");
        return None;
    };

    let kind = match raw.kind.as_deref().map(str::parse::<TransactionType>) {
        Some(Ok(kind)) => kind,
        other => {
            debug!(id = %id, kind = ?other, "Skipping transaction with unknown type");
            return None;
        }
    };

    let user_id = owner_id(raw.user_id, &id)?;

    let amount = match raw.amount.as_ref().and_then(RawAmount::resolve) {
        Some(amount) => amount,
        None => {
            *defaulted += 1;
            0.0
        }
    };

    Some(TransactionRecord {
        id,
        user_id,
        amount,
        kind,
        category: normalize_category(raw.category.as_deref()),
        date,
        description: raw.description.filter(|d| !d.trim().is_empty()),
    })
}

fn validate_goal(raw: RawGoal, index: usize, defaulted: &mut usize) -> Option<GoalRecord> {
    let id = raw
        .id
        .and_then(RawId::into_string)
        .unwrap_or_else(|| format!("goal-{}", index));

    let Some(target_date) = raw.target_date.as_deref().and_then(parse_date) else {
        debug!(id = %id, "Skipping goal with unparseable target date");
        return None;
    };

    let user_id = owner_id(raw.user_id, &id)?;

    let status = raw
        .status
        .as_deref()
        .map(|s| s.parse::<GoalStatus>())
        .transpose()
        .unwrap_or_else(|e| {
            debug!(id = %id, error = %e, "Unknown goal status, treating as paused");
            Some(GoalStatus::Paused)
        })
        .unwrap_or(GoalStatus::Active);

    let mut amount = |value: Option<RawAmount>| match value.as_ref().and_then(RawAmount::resolve)
    {
        Some(v) => v,
        None => {
            *defaulted += 1;
            0.0
        }
    };
    let target_amount = amount(raw.target_amount);
    let current_amount = amount(raw.current_amount);

    Some(GoalRecord {
        title: raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled goal".to_string()),
        id,
        user_id,
        target_amount,
        current_amount,
        target_date,
        status,
    })
}

/// Source of a user's history (the external data store)
///
/// Implementations do all their I/O here; the analytics only ever see the
/// returned [`History`].
pub trait HistoryProvider {
    /// Fetch everything the engine needs for one user
    fn load(&self, user_id: &str) -> Result<History>;
}

impl HistoryProvider for History {
    fn load(&self, user_id: &str) -> Result<History> {
        Ok(self.for_user(user_id))
    }
}

/// Reads a JSON history document (see [`RawHistory`]) from disk
pub struct JsonHistoryProvider {
    path: PathBuf,
}

impl JsonHistoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and validate the whole file, returning ingest counts
    pub fn read(&self) -> Result<(History, IngestStats)> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!(
                "History file {}",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        let raw: RawHistory = serde_json::from_str(&content)?;
        Ok(History::from_raw(raw))
    }
}

impl HistoryProvider for JsonHistoryProvider {
    fn load(&self, user_id: &str) -> Result<History> {
        let (history, _) = self.read()?;
        Ok(history.for_user(user_id))
    }
}

/// Reads a transaction CSV export; goals and stats are empty
pub struct CsvHistoryProvider {
    path: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and validate the whole file, returning ingest counts
    pub fn read(&self) -> Result<(History, IngestStats)> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!("CSV file {}", self.path.display())));
        }
        let file = fs::File::open(&self.path)?;
        let raw = parse_transactions_csv(file)?;
        Ok(History::from_raw(RawHistory {
            transactions: raw,
            ..Default::default()
        }))
    }
}

impl HistoryProvider for CsvHistoryProvider {
    fn load(&self, user_id: &str) -> Result<History> {
        let (history, _) = self.read()?;
        Ok(history.for_user(user_id))
    }
}

/// Parse a transaction CSV export
///
/// Header columns (any order, case-insensitive): `id`, `user_id`, `date`,
/// `type`, `amount`, `category`, `description`. `date`, `type`, and `amount`
/// are required; the rest may be absent.
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.replace('_', "").eq_ignore_ascii_case(&name.replace('_', "")))
    };

    let date_col = column("date").ok_or_else(|| Error::Import("Missing 'date' column".into()))?;
    let type_col = column("type").ok_or_else(|| Error::Import("Missing 'type' column".into()))?;
    let amount_col =
        column("amount").ok_or_else(|| Error::Import("Missing 'amount' column".into()))?;
    let id_col = column("id");
    let user_col = column("user_id");
    let category_col = column("category");
    let description_col = column("description");

    let mut transactions = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let field = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        transactions.push(RawTransaction {
            id: field(id_col).map(RawId::Text),
            user_id: field(user_col).map(RawId::Text),
            amount: field(Some(amount_col)).map(RawAmount::Text),
            kind: field(Some(type_col)),
            category: field(category_col),
            date: field(Some(date_col)),
            description: field(description_col),
        });
    }

    debug!(rows = transactions.len(), "Parsed transaction CSV");
    Ok(transactions)
}
