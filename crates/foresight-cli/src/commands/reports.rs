//! Analysis commands
//!
//! Each command runs one engine operation against the session history and
//! prints either a table or, with `--json`, the raw result.

use anyhow::{Context, Result};
use foresight_core::{
    Anomaly, CashFlowForecast, ForecastHorizon, GoalPrediction, RiskLevel, SavingsOpportunity,
    Severity, SpendingForecast, SpendingInsights, Trend,
};
use serde::Serialize;

use super::core::Session;
use super::truncate;

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

fn trend_icon(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        Trend::Stable => "➖",
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Warning => "🟡",
    }
}

fn risk_icon(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "🔴",
        RiskLevel::Medium => "🟡",
        RiskLevel::Low => "🟢",
    }
}

pub fn cmd_forecast(session: &Session, horizon: ForecastHorizon, json: bool) -> Result<()> {
    let forecasts =
        session
            .engine
            .forecast_spending(&session.history.transactions, horizon, session.now);

    if json {
        return print_json(&forecasts);
    }
    print_forecasts(&forecasts, horizon.days());
    Ok(())
}

fn print_forecasts(forecasts: &[SpendingForecast], horizon_days: i64) {
    println!();
    println!("🔮 Spending Forecast (next {} days)", horizon_days);
    println!("{}", RULE);

    if forecasts.is_empty() {
        println!("   Not enough expense history to forecast.");
        return;
    }

    let total: f64 = forecasts.iter().map(|f| f.predicted_amount).sum();
    println!("   Total predicted: ${:.2}", total);
    println!();
    println!(
        "   {:20} │ {:>10} │ {:>9} │ {:>8}",
        "Category", "Predicted", "Trend", "Conf."
    );
    println!("   ─────────────────────┼────────────┼───────────┼──────────");
    for f in forecasts {
        println!(
            "   {:20} │ {:>10.2} │ {} {:>+6.0}% │ {:>8}",
            truncate(&f.category, 20),
            f.predicted_amount,
            trend_icon(f.trend),
            f.trend_percent,
            f.confidence.as_str()
        );
    }
}

pub fn cmd_goals(session: &Session, json: bool) -> Result<()> {
    let predictions = session.engine.predict_goal_achievement(
        &session.history.goals,
        &session.history.transactions,
        session.now,
    );

    if json {
        return print_json(&predictions);
    }
    print_goals(&predictions);
    Ok(())
}

fn print_goals(predictions: &[GoalPrediction]) {
    println!();
    println!("🎯 Goal Outlook");
    println!("{}", RULE);

    if predictions.is_empty() {
        println!("   No active goals.");
        return;
    }

    if let Some(first) = predictions.first() {
        println!(
            "   Savings capacity: ${:.2}/mo",
            first.monthly_savings_capacity
        );
        println!();
    }

    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>5} │ {:>10}",
        "Goal", "Remaining", "Needed/mo", "Prob.", "Done by"
    );
    println!("   ─────────────────────┼────────────┼────────────┼───────┼────────────");
    for p in predictions {
        let done_by = p
            .predicted_completion_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>4.0}% │ {:>10} {}",
            truncate(&p.title, 20),
            p.remaining_amount,
            p.required_monthly_contribution,
            p.probability,
            done_by,
            if p.on_track { "✅" } else { "⚠️" }
        );
    }

    println!();
    for p in predictions {
        println!("   • {}", p.recommendation);
    }
}

pub fn cmd_cashflow(session: &Session, balance: Option<f64>, json: bool) -> Result<()> {
    let seed = balance.unwrap_or(session.history.stats.total_savings);
    let points =
        session
            .engine
            .forecast_cash_flow(&session.history.transactions, seed, session.now);

    if json {
        return print_json(&points);
    }
    print_cash_flow(&points, seed);
    Ok(())
}

fn print_cash_flow(points: &[CashFlowForecast], seed: f64) {
    println!();
    println!("💵 Cash Flow Projection");
    println!("{}", RULE);
    println!("   Starting balance: ${:.2}", seed);
    if let Some(first) = points.first() {
        println!(
            "   Daily income: ${:.2}    Daily expenses: ${:.2}",
            first.daily_income, first.daily_expenses
        );
    }
    println!();
    println!(
        "   {:>4} │ {:10} │ {:>12} │ {:>7} │ {:8}",
        "Day", "Date", "Balance", "Runway", "Risk"
    );
    println!("   ─────┼────────────┼──────────────┼─────────┼──────────");
    for p in points {
        let runway = p
            .months_of_expenses_covered
            .map(|m| format!("{:.1}mo", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>4} │ {:10} │ {:>12.2} │ {:>7} │ {} {}",
            p.day,
            p.date.format("%Y-%m-%d"),
            p.projected_balance,
            runway,
            risk_icon(p.risk_level),
            p.risk_level
        );
    }
}

pub fn cmd_anomalies(session: &Session, json: bool) -> Result<()> {
    let anomalies = session.engine.detect_anomalies(
        &session.history.transactions,
        &session.history.goals,
        session.now,
    );

    if json {
        return print_json(&anomalies);
    }
    print_anomalies(&anomalies);
    Ok(())
}

fn print_anomalies(anomalies: &[Anomaly]) {
    println!();
    println!("🚨 Anomalies");
    println!("{}", RULE);

    if anomalies.is_empty() {
        println!("   ✅ Nothing unusual in recent activity.");
        return;
    }

    for a in anomalies {
        println!("   {} [{}] {}", severity_icon(a.severity), a.severity, a.title);
        println!("      {}", a.description);
        println!("      → {}", a.suggested_action);
    }
}

pub fn cmd_patterns(session: &Session, json: bool) -> Result<()> {
    let insights = session
        .engine
        .analyze_spending_patterns(&session.history.transactions, session.now);

    if json {
        return print_json(&insights);
    }
    print_patterns(&insights);
    Ok(())
}

fn print_patterns(insights: &SpendingInsights) {
    println!();
    println!("📊 Spending Patterns");
    println!("{}", RULE);

    if insights.expense_count == 0 {
        println!("   No expenses found in the analysis window.");
        return;
    }

    println!(
        "   Total: ${:.2} across {} expenses ({} days)",
        insights.total_spending, insights.expense_count, insights.period_days
    );
    println!();
    println!(
        "   {:20} │ {:>10} │ {:>6} │ {:>10} │ {:>5}",
        "Category", "Total", "Share", "Frequency", "Trend"
    );
    println!("   ─────────────────────┼────────────┼────────┼────────────┼───────");
    for c in &insights.categories {
        println!(
            "   {:20} │ {:>10.2} │ {:>5.1}% │ {:>10} │ {} {}",
            truncate(&c.category, 20),
            c.total,
            c.percentage,
            c.frequency.as_str(),
            c.trend.arrow(),
            c.trend
        );
    }

    if !insights.recurring_expenses.is_empty() {
        println!();
        println!("   🔁 Recurring:");
        for r in &insights.recurring_expenses {
            println!(
                "      {:20} ${:>8.2} {:9} next {} ({:.0}% confident)",
                truncate(&r.category, 20),
                r.average_amount,
                r.frequency.as_str(),
                r.next_expected_date.format("%Y-%m-%d"),
                r.confidence * 100.0
            );
        }
    }

    if let Some(behavior) = &insights.behavior {
        println!();
        println!("   🧭 Behavior:");
        println!(
            "      Small purchases: {:.1}/week{}",
            behavior.impulsive_buying.per_week,
            if behavior.impulsive_buying.detected {
                " (frequent)"
            } else {
                ""
            }
        );
        println!(
            "      Weekend share: {:.1}%",
            behavior.weekend.weekend_share_percent
        );
        println!("      Peak time: {}", behavior.time_of_day.peak.as_str());
        println!("      Heaviest phase: {}", behavior.month_phase.peak.label());
    }

    if !insights.unusual_transactions.is_empty() {
        println!();
        println!("   ❗ Unusual:");
        for u in &insights.unusual_transactions {
            println!(
                "      {} {:20} ${:>8.2}  {}",
                u.date.format("%Y-%m-%d"),
                truncate(&u.category, 20),
                u.amount,
                u.explanation
            );
        }
    }

    if !insights.recommendations.is_empty() {
        println!();
        println!("   💡 Recommendations:");
        for rec in &insights.recommendations {
            println!("      • {}", rec);
        }
    }
}

pub fn cmd_savings(session: &Session, json: bool) -> Result<()> {
    let insights = session
        .engine
        .analyze_spending_patterns(&session.history.transactions, session.now);
    let opportunities = session.engine.find_savings_opportunities(&insights);

    if json {
        return print_json(&opportunities);
    }
    print_savings(&opportunities);
    Ok(())
}

fn print_savings(opportunities: &[SavingsOpportunity]) {
    println!();
    println!("💰 Savings Opportunities");
    println!("{}", RULE);

    if opportunities.is_empty() {
        println!("   No savings opportunities found.");
        return;
    }

    let monthly: f64 = opportunities
        .iter()
        .map(|o| o.estimated_monthly_savings)
        .sum();
    println!(
        "   Potential: ${:.2}/mo (${:.2}/yr)",
        monthly,
        monthly * 12.0
    );
    println!();
    for o in opportunities {
        println!(
            "   ${:>8.2}/mo  [{:?}] {}",
            o.estimated_monthly_savings, o.difficulty, o.description
        );
    }
}

pub fn cmd_recommendations(session: &Session, json: bool) -> Result<()> {
    let report = session.engine.analyze(&session.history, session.now);

    if json {
        return print_json(&report.recommendations);
    }
    print_recommendations(&report.recommendations);
    Ok(())
}

fn print_recommendations(recommendations: &[String]) {
    println!();
    println!("💡 Recommendations");
    println!("{}", RULE);
    for (i, rec) in recommendations.iter().enumerate() {
        println!("   {}. {}", i + 1, rec);
    }
}

pub fn cmd_context(session: &Session, json: bool) -> Result<()> {
    let insights = session
        .engine
        .analyze_spending_patterns(&session.history.transactions, session.now);
    let context = session.engine.format_ai_context(&insights);

    if json {
        return print_json(&serde_json::json!({ "context": context }));
    }
    println!("{}", context);
    Ok(())
}

pub fn cmd_report(session: &Session, json: bool) -> Result<()> {
    let report = session.engine.analyze(&session.history, session.now);

    if json {
        return print_json(&report);
    }

    println!(
        "📋 Foresight report for {}",
        report.generated_at.format("%Y-%m-%d")
    );
    print_forecasts(&report.forecasts_30d, 30);
    print_forecasts(&report.forecasts_90d, 90);
    print_goals(&report.goal_predictions);
    print_cash_flow(&report.cash_flow, session.history.stats.total_savings);
    print_anomalies(&report.anomalies);
    print_patterns(&report.insights);
    print_savings(&report.savings_opportunities);
    print_recommendations(&report.recommendations);
    Ok(())
}
