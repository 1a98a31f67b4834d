//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::{Datelike, Timelike};
use foresight_core::test_utils::{fixed_now, months_ahead, HistoryBuilder};
use foresight_core::{AnalyticsEngine, ForecastHorizon, GoalRecord};

use crate::commands::{self, truncate, Session, SessionOptions};

fn sample_session() -> Session {
    let now = fixed_now();
    let history = HistoryBuilder::new(now)
        .daily_income(60, 0, 100.0)
        .repeating(1, 30, 6, 50.0, "Subscription")
        .daily_expense(29, 7, 10.0, "Groceries")
        .daily_expense(6, 0, 40.0, "Groceries")
        .goal(GoalRecord::new(
            "g1",
            "Trip",
            3000.0,
            500.0,
            months_ahead(now, 3),
        ))
        .savings(2500.0)
        .build();

    Session {
        history,
        engine: AnalyticsEngine::new(),
        now,
    }
}

fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const HISTORY_JSON: &str = r#"{
    "transactions": [
        {"id": 1, "userId": "u1", "amount": "42.50", "type": "expense", "category": "Dining", "date": "2026-06-10"},
        {"id": 2, "userId": "u2", "amount": "99.00", "type": "expense", "category": "Travel", "date": "2026-06-11"},
        {"id": 3, "userId": "u1", "amount": "oops", "type": "expense", "category": "Dining", "date": "2026-06-12"},
        {"id": 4, "userId": "u1", "amount": "10", "type": "expense", "date": "not a date"}
    ],
    "goals": [
        {"id": "g1", "userId": "u1", "title": "Laptop", "targetAmount": "1500",
         "currentAmount": "200", "targetDate": "2026-12-01", "status": "active"}
    ],
    "stats": {"totalSavings": "800"}
}"#;

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long category", 10), "this is...");
    assert_eq!(truncate("Café Crème Brûlée", 8), "Café ...");
}

#[test]
fn test_resolve_now_default_is_wall_clock() {
    let before = chrono::Utc::now();
    let now = commands::resolve_now(None).unwrap();
    assert!(now >= before);
}

#[test]
fn test_resolve_now_bare_date() {
    let now = commands::resolve_now(Some("2026-06-15")).unwrap();
    assert_eq!((now.year(), now.month(), now.day()), (2026, 6, 15));
    assert_eq!(now.hour(), 12);
}

#[test]
fn test_resolve_now_invalid() {
    let err = commands::resolve_now(Some("next tuesday")).unwrap_err();
    assert!(err.to_string().contains("Invalid --now value"));
}

// ========== History Loading Tests ==========

#[test]
fn test_load_history_requires_a_source() {
    let err = commands::load_history(None, None, None).unwrap_err();
    assert!(err.to_string().contains("No history given"));
}

#[test]
fn test_load_history_missing_file() {
    let path = std::path::Path::new("/nonexistent/foresight/history.json");
    assert!(commands::load_history(Some(path), None, None).is_err());
}

#[test]
fn test_load_history_json() {
    let file = write_temp(HISTORY_JSON, ".json");
    let history = commands::load_history(Some(file.path()), None, None).unwrap();

    // The undated record is skipped; the malformed amount is kept as zero
    assert_eq!(history.transactions.len(), 3);
    assert_eq!(history.goals.len(), 1);
    assert_eq!(history.stats.total_savings, 800.0);
}

#[test]
fn test_load_history_filters_user() {
    let file = write_temp(HISTORY_JSON, ".json");
    let history = commands::load_history(Some(file.path()), None, Some("u1")).unwrap();

    assert_eq!(history.transactions.len(), 2);
    assert!(history.transactions.iter().all(|t| t.user_id == "u1"));
    assert_eq!(history.goals.len(), 1);
}

#[test]
fn test_load_history_csv() {
    let csv = "date,type,amount,category\n\
               2026-06-01,expense,12.00,Coffee\n\
               2026-06-02,income,1500.00,\n";
    let file = write_temp(csv, ".csv");
    let history = commands::load_history(None, Some(file.path()), None).unwrap();

    assert_eq!(history.transactions.len(), 2);
    assert!(history.goals.is_empty());
    assert_eq!(history.stats.total_savings, 0.0);
}

#[test]
fn test_open_session() {
    let file = write_temp(HISTORY_JSON, ".json");
    let config = write_temp("[anomalies]\nspike_min_recent_total = 250.0\n", ".toml");

    let session = commands::open_session(&SessionOptions {
        history: Some(file.path()),
        config: Some(config.path()),
        now: Some("2026-06-15"),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(session.now.day(), 15);
    assert_eq!(session.engine.config().anomalies.spike_min_recent_total, 250.0);
    assert_eq!(session.history.transactions.len(), 3);
}

#[test]
fn test_open_session_missing_config() {
    let file = write_temp(HISTORY_JSON, ".json");
    let result = commands::open_session(&SessionOptions {
        history: Some(file.path()),
        config: Some(std::path::Path::new("/nonexistent/analytics.toml")),
        ..Default::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_open_session_invalid_config() {
    let file = write_temp(HISTORY_JSON, ".json");
    let config = write_temp("[forecast]\nno_such_key = 1\n", ".toml");
    let result = commands::open_session(&SessionOptions {
        history: Some(file.path()),
        config: Some(config.path()),
        ..Default::default()
    });
    assert!(result.is_err());
}

// ========== Analysis Command Tests ==========

#[test]
fn test_cmd_forecast() {
    let session = sample_session();
    assert!(commands::cmd_forecast(&session, ForecastHorizon::Days30, false).is_ok());
    assert!(commands::cmd_forecast(&session, ForecastHorizon::Days90, true).is_ok());
}

#[test]
fn test_cmd_goals() {
    let session = sample_session();
    assert!(commands::cmd_goals(&session, false).is_ok());
    assert!(commands::cmd_goals(&session, true).is_ok());
}

#[test]
fn test_cmd_cashflow() {
    let session = sample_session();
    assert!(commands::cmd_cashflow(&session, None, false).is_ok());
    assert!(commands::cmd_cashflow(&session, Some(-200.0), true).is_ok());
}

#[test]
fn test_cmd_anomalies() {
    let session = sample_session();
    assert!(commands::cmd_anomalies(&session, false).is_ok());
    assert!(commands::cmd_anomalies(&session, true).is_ok());
}

#[test]
fn test_cmd_patterns() {
    let session = sample_session();
    assert!(commands::cmd_patterns(&session, false).is_ok());
    assert!(commands::cmd_patterns(&session, true).is_ok());
}

#[test]
fn test_cmd_savings() {
    let session = sample_session();
    assert!(commands::cmd_savings(&session, false).is_ok());
    assert!(commands::cmd_savings(&session, true).is_ok());
}

#[test]
fn test_cmd_recommendations_and_context() {
    let session = sample_session();
    assert!(commands::cmd_recommendations(&session, false).is_ok());
    assert!(commands::cmd_context(&session, false).is_ok());
    assert!(commands::cmd_context(&session, true).is_ok());
}

#[test]
fn test_cmd_report() {
    let session = sample_session();
    assert!(commands::cmd_report(&session, false).is_ok());
    assert!(commands::cmd_report(&session, true).is_ok());
}

#[test]
fn test_commands_on_empty_history() {
    let session = Session {
        history: Default::default(),
        engine: AnalyticsEngine::new(),
        now: fixed_now(),
    };
    assert!(commands::cmd_forecast(&session, ForecastHorizon::Days30, false).is_ok());
    assert!(commands::cmd_goals(&session, false).is_ok());
    assert!(commands::cmd_patterns(&session, false).is_ok());
    assert!(commands::cmd_report(&session, false).is_ok());
}
