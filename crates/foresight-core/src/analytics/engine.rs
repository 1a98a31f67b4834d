//! Analytics Engine - runs the analyzers against one user's history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::history::History;
use crate::models::{GoalRecord, TransactionRecord};

use super::anomaly_detector::AnomalyDetector;
use super::cash_flow::CashFlowProjector;
use super::goal_predictor::GoalAchievementPredictor;
use super::insight_composer;
use super::pattern_analyzer::SpendingPatternAnalyzer;
use super::savings_opportunity::SavingsOpportunityFinder;
use super::spending_forecaster::SpendingForecaster;
use super::types::{
    Anomaly, CashFlowForecast, ForecastHorizon, GoalPrediction, SavingsOpportunity,
    SpendingForecast, SpendingInsights,
};

/// Everything the engine computes for one history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub forecasts_30d: Vec<SpendingForecast>,
    pub forecasts_90d: Vec<SpendingForecast>,
    pub goal_predictions: Vec<GoalPrediction>,
    pub cash_flow: Vec<CashFlowForecast>,
    pub anomalies: Vec<Anomaly>,
    pub insights: SpendingInsights,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub recommendations: Vec<String>,
    pub ai_context: String,
}

/// Stateless façade over the individual analyzers
///
/// Holds only configuration; every call recomputes from its inputs.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    /// Create an engine with default thresholds
    pub fn new() -> Self {
        Self::with_config(AnalyticsConfig::default())
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn forecaster(&self) -> SpendingForecaster {
        SpendingForecaster::with_config(self.config.forecast.clone())
    }

    fn goal_predictor(&self) -> GoalAchievementPredictor {
        GoalAchievementPredictor::with_config(self.config.goals.clone())
    }

    fn anomaly_detector(&self) -> AnomalyDetector {
        AnomalyDetector::with_config(self.config.anomalies.clone())
            .with_goal_predictor(self.goal_predictor())
    }

    fn pattern_analyzer(&self) -> SpendingPatternAnalyzer {
        SpendingPatternAnalyzer::with_config(
            self.config.patterns.clone(),
            self.config.recommendations.clone(),
        )
    }

    pub fn forecast_spending(
        &self,
        transactions: &[TransactionRecord],
        horizon: ForecastHorizon,
        now: DateTime<Utc>,
    ) -> Vec<SpendingForecast> {
        self.forecaster().forecast(transactions, horizon, now)
    }

    pub fn predict_goal_achievement(
        &self,
        goals: &[GoalRecord],
        transactions: &[TransactionRecord],
        now: DateTime<Utc>,
    ) -> Vec<GoalPrediction> {
        self.goal_predictor().predict(goals, transactions, now)
    }

    pub fn forecast_cash_flow(
        &self,
        transactions: &[TransactionRecord],
        seed_balance: f64,
        now: DateTime<Utc>,
    ) -> Vec<CashFlowForecast> {
        CashFlowProjector::with_config(self.config.cash_flow.clone()).project(
            transactions,
            seed_balance,
            now,
        )
    }

    pub fn detect_anomalies(
        &self,
        transactions: &[TransactionRecord],
        goals: &[GoalRecord],
        now: DateTime<Utc>,
    ) -> Vec<Anomaly> {
        self.anomaly_detector().detect(transactions, goals, now)
    }

    pub fn analyze_spending_patterns(
        &self,
        transactions: &[TransactionRecord],
        now: DateTime<Utc>,
    ) -> SpendingInsights {
        self.pattern_analyzer().analyze(transactions, now)
    }

    pub fn find_savings_opportunities(&self, insights: &SpendingInsights) -> Vec<SavingsOpportunity> {
        SavingsOpportunityFinder::with_config(self.config.recommendations.clone()).find(insights)
    }

    pub fn compose_recommendations(
        &self,
        insights: &SpendingInsights,
        anomalies: &[Anomaly],
        forecasts: &[SpendingForecast],
    ) -> Vec<String> {
        insight_composer::compose_recommendations(
            insights,
            anomalies,
            forecasts,
            self.config.recommendations.max_recommendations,
        )
    }

    pub fn format_ai_context(&self, insights: &SpendingInsights) -> String {
        insight_composer::format_ai_context(insights)
    }

    /// Run every analysis; cash flow is seeded from `stats.total_savings`
    pub fn analyze(&self, history: &History, now: DateTime<Utc>) -> AnalyticsReport {
        let transactions = &history.transactions;

        let forecasts_30d = self.forecast_spending(transactions, ForecastHorizon::Days30, now);
        let forecasts_90d = self.forecast_spending(transactions, ForecastHorizon::Days90, now);
        debug!(
            stage = "forecast",
            count = forecasts_30d.len() + forecasts_90d.len(),
            "Stage complete"
        );

        let goal_predictions = self.predict_goal_achievement(&history.goals, transactions, now);
        debug!(stage = "goals", count = goal_predictions.len(), "Stage complete");

        let cash_flow = self.forecast_cash_flow(transactions, history.stats.total_savings, now);
        debug!(stage = "cash_flow", count = cash_flow.len(), "Stage complete");

        let anomalies =
            self.anomaly_detector()
                .detect_with_predictions(transactions, &goal_predictions, now);
        debug!(stage = "anomalies", count = anomalies.len(), "Stage complete");

        let insights = self.analyze_spending_patterns(transactions, now);
        debug!(
            stage = "patterns",
            count = insights.categories.len(),
            "Stage complete"
        );

        let savings_opportunities = self.find_savings_opportunities(&insights);
        debug!(
            stage = "savings",
            count = savings_opportunities.len(),
            "Stage complete"
        );

        let recommendations = self.compose_recommendations(&insights, &anomalies, &forecasts_30d);
        let ai_context = self.format_ai_context(&insights);

        AnalyticsReport {
            generated_at: now,
            forecasts_30d,
            forecasts_90d,
            goal_predictions,
            cash_flow,
            anomalies,
            insights,
            savings_opportunities,
            recommendations,
            ai_context,
        }
    }
}
