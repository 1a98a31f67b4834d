//! Savings Opportunity Finder
//!
//! Turns spending pattern output into estimated monthly savings:
//! - Recurring charges worth reviewing
//! - Frequent small purchases
//! - Categories trending above their earlier level
//! - Weekend-heavy spending

use tracing::debug;

use crate::config::RecommendationConfig;

use super::types::{
    Difficulty, SavingsOpportunity, SavingsOpportunityType, SpendingInsights, Trend,
};

const DAYS_PER_MONTH: f64 = 30.44;

/// Identifies ranked savings opportunities
pub struct SavingsOpportunityFinder {
    config: RecommendationConfig,
}

impl SavingsOpportunityFinder {
    pub fn new() -> Self {
        Self::with_config(RecommendationConfig::default())
    }

    pub fn with_config(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Sorted by estimated monthly savings, largest first
    pub fn find(&self, insights: &SpendingInsights) -> Vec<SavingsOpportunity> {
        let months = (insights.period_days as f64 / DAYS_PER_MONTH).max(1.0);
        let mut opportunities = Vec::new();

        for recurring in &insights.recurring_expenses {
            let monthly_cost = recurring.average_amount * recurring.frequency.per_month();
            opportunities.push(opportunity(
                SavingsOpportunityType::RecurringReview,
                Some(recurring.category.clone()),
                format!(
                    "{} costs about ${:.0}/month ({}). Compare plans or renegotiate.",
                    recurring.category, monthly_cost, recurring.frequency
                ),
                monthly_cost * self.config.recurring_review_rate,
                Difficulty::Easy,
            ));
        }

        if let Some(behavior) = &insights.behavior {
            let impulse = &behavior.impulsive_buying;
            if impulse.detected && impulse.small_purchase_count > 0 {
                let average_purchase = impulse.total_amount / impulse.small_purchase_count as f64;
                let monthly_small = average_purchase * impulse.per_week * 52.0 / 12.0;
                opportunities.push(opportunity(
                    SavingsOpportunityType::ImpulseReduction,
                    None,
                    format!(
                        "Small purchases under ${:.0} add up to about ${:.0}/month. Halving them frees real money.",
                        impulse.threshold, monthly_small
                    ),
                    monthly_small * self.config.impulse_reduction_rate,
                    Difficulty::Moderate,
                ));
            }

            let weekend = &behavior.weekend;
            if weekend.weekend_share_percent > self.config.weekend_bias_share_percent {
                // Two of seven days: the share weekends would have with even spending
                let expected = insights.total_spending * 2.0 / 7.0;
                let excess_monthly = (weekend.weekend_total - expected).max(0.0) / months;
                opportunities.push(opportunity(
                    SavingsOpportunityType::WeekendSpending,
                    None,
                    format!(
                        "Weekends take {:.0}% of your spending. Bringing them closer to weekday levels helps.",
                        weekend.weekend_share_percent
                    ),
                    excess_monthly * self.config.weekend_reduction_rate,
                    Difficulty::Hard,
                ));
            }
        }

        for category in insights
            .categories
            .iter()
            .filter(|c| c.trend == Trend::Increasing && c.trend_percent > 0.0)
        {
            let monthly = category.total / months;
            // Portion of the blended monthly amount attributable to the rise
            let above_baseline = monthly * category.trend_percent / (100.0 + category.trend_percent);
            opportunities.push(opportunity(
                SavingsOpportunityType::TrendReversal,
                Some(category.category.clone()),
                format!(
                    "{} is up {:.0}%. Returning to your earlier level saves about ${:.0}/month.",
                    category.category, category.trend_percent, above_baseline
                ),
                above_baseline,
                Difficulty::Moderate,
            ));
        }

        opportunities.retain(|o| o.estimated_monthly_savings >= self.config.min_monthly_savings);
        opportunities.sort_by(|a, b| {
            b.estimated_monthly_savings
                .partial_cmp(&a.estimated_monthly_savings)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(count = opportunities.len(), "Savings opportunities found");

        opportunities
    }
}

impl Default for SavingsOpportunityFinder {
    fn default() -> Self {
        Self::new()
    }
}

fn opportunity(
    opportunity_type: SavingsOpportunityType,
    category: Option<String>,
    description: String,
    monthly: f64,
    difficulty: Difficulty,
) -> SavingsOpportunity {
    SavingsOpportunity {
        opportunity_type,
        category,
        description,
        estimated_monthly_savings: monthly,
        estimated_annual_savings: monthly * 12.0,
        difficulty,
    }
}
