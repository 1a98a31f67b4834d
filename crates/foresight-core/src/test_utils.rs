//! Test utilities for foresight-core
//!
//! Fixture builders for synthetic transaction histories. Dates are expressed
//! as "days before now" so scenarios read the same regardless of the
//! reference date they run against.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::history::History;
use crate::models::{GoalRecord, StatsSnapshot, TransactionRecord, TransactionType};

/// Reference instant shared by fixtures: 2026-06-15 12:00 UTC (a Monday)
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `now` shifted back by whole days
pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// Builds a [`History`] relative to a fixed `now`
pub struct HistoryBuilder {
    now: DateTime<Utc>,
    transactions: Vec<TransactionRecord>,
    goals: Vec<GoalRecord>,
    stats: StatsSnapshot,
}

impl HistoryBuilder {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            transactions: Vec::new(),
            goals: Vec::new(),
            stats: StatsSnapshot::default(),
        }
    }

    fn next_id(&self) -> String {
        format!("tx-{}", self.transactions.len() + 1)
    }

    /// Add an expense at an exact instant
    pub fn expense_at(mut self, date: DateTime<Utc>, amount: f64, category: &str) -> Self {
        let tx = TransactionRecord::expense(self.next_id(), amount, category, date);
        self.transactions.push(tx);
        self
    }

    pub fn expense(self, days_before: i64, amount: f64, category: &str) -> Self {
        let date = days_ago(self.now, days_before);
        self.expense_at(date, amount, category)
    }

    pub fn income(mut self, days_before: i64, amount: f64) -> Self {
        let date = days_ago(self.now, days_before);
        let tx = TransactionRecord::income(self.next_id(), amount, date);
        self.transactions.push(tx);
        self
    }

    pub fn transfer(mut self, days_before: i64, amount: f64) -> Self {
        let date = days_ago(self.now, days_before);
        let tx = TransactionRecord::new(
            self.next_id(),
            TransactionType::Transfer,
            amount,
            "Transfer",
            date,
        );
        self.transactions.push(tx);
        self
    }

    /// `count` equal expenses spaced `interval` days apart, the latest `first_days_before` days ago
    pub fn repeating(
        mut self,
        first_days_before: i64,
        interval: i64,
        count: usize,
        amount: f64,
        category: &str,
    ) -> Self {
        for i in 0..count as i64 {
            self = self.expense(first_days_before + i * interval, amount, category);
        }
        self
    }

    /// The same income on every day in `[from_days_before, to_days_before]`
    pub fn daily_income(mut self, from_days_before: i64, to_days_before: i64, amount: f64) -> Self {
        for d in to_days_before..=from_days_before {
            self = self.income(d, amount);
        }
        self
    }

    pub fn daily_expense(
        mut self,
        from_days_before: i64,
        to_days_before: i64,
        amount: f64,
        category: &str,
    ) -> Self {
        for d in to_days_before..=from_days_before {
            self = self.expense(d, amount, category);
        }
        self
    }

    pub fn goal(mut self, goal: GoalRecord) -> Self {
        self.goals.push(goal);
        self
    }

    pub fn savings(mut self, total_savings: f64) -> Self {
        self.stats.total_savings = total_savings;
        self
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn build(self) -> History {
        History::new(self.transactions, self.goals, self.stats)
    }
}

/// Calendar date `months` months after `now`, same day-of-month
pub fn months_ahead(now: DateTime<Utc>, months: u32) -> NaiveDate {
    now.date_naive()
        .checked_add_months(chrono::Months::new(months))
        .unwrap_or_else(|| now.date_naive())
}
