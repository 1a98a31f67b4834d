//! Insight Composer
//!
//! Merges the outputs of the other analyzers into a short prioritized list
//! of recommendations, and renders the fixed-layout context block handed to
//! the AI assistant.

use std::collections::HashSet;
use std::fmt::Write;

use super::types::{Anomaly, Severity, SpendingForecast, SpendingInsights, Trend};

/// Rows shown per section of the context block
const CONTEXT_SECTION_LIMIT: usize = 5;

/// Prioritized, de-duplicated recommendation list
///
/// Order: actions for critical anomalies, then pattern recommendations,
/// then notes on rising forecasts.
pub fn compose_recommendations(
    insights: &SpendingInsights,
    anomalies: &[Anomaly],
    forecasts: &[SpendingForecast],
    max: usize,
) -> Vec<String> {
    let critical = anomalies
        .iter()
        .filter(|a| a.severity == Severity::Critical)
        .map(|a| a.suggested_action.clone());

    let patterns = insights.recommendations.iter().cloned();

    let rising = forecasts
        .iter()
        .filter(|f| f.trend == Trend::Increasing)
        .map(|f| {
            format!(
                "{} is trending up {:.0}%; expect about ${:.0} over the next {} days.",
                f.category, f.trend_percent, f.predicted_amount, f.horizon_days
            )
        });

    let mut seen = HashSet::new();
    critical
        .chain(patterns)
        .chain(rising)
        .filter(|text| seen.insert(text.clone()))
        .take(max)
        .collect()
}

/// Render the spending-pattern context block
pub fn format_ai_context(insights: &SpendingInsights) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_context(&mut out, insights);
    out
}

fn write_context(out: &mut String, insights: &SpendingInsights) -> std::fmt::Result {
    writeln!(out, "SPENDING PATTERNS:")?;

    writeln!(out, "Top categories:")?;
    if insights.categories.is_empty() {
        writeln!(out, "- none detected")?;
    }
    for c in insights.categories.iter().take(CONTEXT_SECTION_LIMIT) {
        writeln!(
            out,
            "- {}: ${:.2} ({:.1}% of spending, {} {})",
            c.category,
            c.total,
            c.percentage,
            c.trend.arrow(),
            c.trend
        )?;
    }

    writeln!(out, "Recurring expenses:")?;
    if insights.recurring_expenses.is_empty() {
        writeln!(out, "- none detected")?;
    }
    for r in insights.recurring_expenses.iter().take(CONTEXT_SECTION_LIMIT) {
        writeln!(
            out,
            "- {}: ~${:.2} {} (next: {})",
            r.category,
            r.average_amount,
            r.frequency,
            r.next_expected_date.format("%Y-%m-%d")
        )?;
    }

    writeln!(out, "Behavior:")?;
    match &insights.behavior {
        Some(b) => {
            let flagged = if b.impulsive_buying.detected {
                " (flagged)"
            } else {
                ""
            };
            writeln!(
                out,
                "- Impulsive purchases: {:.1}/week{}",
                b.impulsive_buying.per_week, flagged
            )?;
            writeln!(
                out,
                "- Weekend spending: {:.1}% of total",
                b.weekend.weekend_share_percent
            )?;
            writeln!(out, "- Peak spending time: {}", b.time_of_day.peak.as_str())?;
            writeln!(out, "- Heaviest month phase: {}", b.month_phase.peak.label())?;
        }
        None => writeln!(out, "- none detected")?,
    }

    match insights.recommendations.first() {
        Some(top) => write!(out, "Top insight: {}", top)?,
        None => write!(out, "Top insight: none")?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::pattern_analyzer::SpendingPatternAnalyzer;
    use crate::analytics::types::{AnomalyType, Confidence};
    use crate::test_utils::{fixed_now, HistoryBuilder};

    fn empty_insights(recommendations: Vec<String>) -> SpendingInsights {
        SpendingInsights {
            total_spending: 0.0,
            expense_count: 0,
            period_days: 0,
            categories: Vec::new(),
            recurring_expenses: Vec::new(),
            behavior: None,
            unusual_transactions: Vec::new(),
            recommendations,
        }
    }

    fn anomaly(severity: Severity, action: &str) -> Anomaly {
        Anomaly::new(
            AnomalyType::SpendingSpike,
            severity,
            "t",
            "d",
            action,
            fixed_now(),
        )
    }

    fn rising(category: &str) -> SpendingForecast {
        SpendingForecast {
            category: category.to_string(),
            horizon_days: 30,
            historical_average: 50.0,
            predicted_amount: 75.0,
            trend: Trend::Increasing,
            trend_percent: 50.0,
            confidence: Confidence::Medium,
            sample_count: 4,
        }
    }

    #[test]
    fn test_compose_order_and_dedup() {
        let insights = empty_insights(vec!["Cut dining".into(), "Pause spending".into()]);
        let anomalies = vec![
            anomaly(Severity::Warning, "Ignored warning"),
            anomaly(Severity::Critical, "Pause spending"),
        ];
        let forecasts = vec![rising("Fuel")];

        let recs = compose_recommendations(&insights, &anomalies, &forecasts, 5);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], "Pause spending");
        assert_eq!(recs[1], "Cut dining");
        assert!(recs[2].starts_with("Fuel is trending up 50%"));
    }

    #[test]
    fn test_compose_respects_cap() {
        let insights = empty_insights((0..10).map(|i| format!("rec {}", i)).collect());
        let recs = compose_recommendations(&insights, &[], &[], 5);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[4], "rec 4");
    }

    #[test]
    fn test_context_empty_sections() {
        let context = format_ai_context(&empty_insights(vec!["Add data".into()]));
        let expected = "SPENDING PATTERNS:\n\
                        Top categories:\n\
                        - none detected\n\
                        Recurring expenses:\n\
                        - none detected\n\
                        Behavior:\n\
                        - none detected\n\
                        Top insight: Add data";
        assert_eq!(context, expected);
    }

    #[test]
    fn test_context_layout() {
        let now = fixed_now();
        let history = HistoryBuilder::new(now)
            .repeating(1, 30, 6, 50.0, "Subscription")
            .expense(5, 30.0, "Books")
            .build();
        let insights = SpendingPatternAnalyzer::new().analyze(&history.transactions, now);

        let context = format_ai_context(&insights);
        let lines: Vec<&str> = context.lines().collect();

        assert_eq!(lines[0], "SPENDING PATTERNS:");
        assert_eq!(lines[1], "Top categories:");
        assert_eq!(lines[2], "- Subscription: $300.00 (90.9% of spending, → stable)");
        assert_eq!(lines[3], "- Books: $30.00 (9.1% of spending, → stable)");
        assert_eq!(lines[4], "Recurring expenses:");
        assert!(lines[5].starts_with("- Subscription: ~$50.00 monthly (next: 2026-07-14)"));
        assert_eq!(lines[6], "Behavior:");
        assert!(lines[7].starts_with("- Impulsive purchases: "));
        assert!(lines[8].starts_with("- Weekend spending: "));
        assert!(lines[9].starts_with("- Peak spending time: afternoon"));
        assert!(lines[10].starts_with("- Heaviest month phase: "));
        assert!(lines[11].starts_with("Top insight: "));
        assert_eq!(lines.len(), 12);
    }
}
