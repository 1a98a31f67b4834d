//! Analytics Engine - Predictive Financial Analytics
//!
//! Pure computations that turn a user's transaction and goal history into
//! forecasts, risk warnings, and behavioral insights. Every analysis takes
//! an explicit `now` and borrowed slices; nothing reads the clock or keeps
//! state between calls.
//!
//! ## Analyzers
//!
//! - **Spending Forecaster** - Near-term spend per category
//! - **Goal Achievement Predictor** - Completion odds per active goal
//! - **Cash Flow Projector** - 90-day balance trajectory with runway risk
//! - **Anomaly Detector** - Spending spikes, income drops, goals at risk
//! - **Spending Pattern Analyzer** - Categories, recurring charges, habits
//! - **Savings Opportunity Finder** - Ranked ways to spend less
//! - **Insight Composer** - Recommendation list and AI context block
//!
//! ## Usage
//!
//! ```rust,ignore
//! use foresight_core::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::new();
//! let report = engine.analyze(&history, chrono::Utc::now());
//! println!("{}", report.ai_context);
//! ```

pub mod anomaly_detector;
pub mod cash_flow;
pub mod engine;
pub mod goal_predictor;
pub mod insight_composer;
pub mod pattern_analyzer;
pub mod savings_opportunity;
pub mod spending_forecaster;
pub mod stats;
pub mod types;

pub use anomaly_detector::AnomalyDetector;
pub use cash_flow::CashFlowProjector;
pub use engine::{AnalyticsEngine, AnalyticsReport};
pub use goal_predictor::GoalAchievementPredictor;
pub use insight_composer::{compose_recommendations, format_ai_context};
pub use pattern_analyzer::SpendingPatternAnalyzer;
pub use savings_opportunity::SavingsOpportunityFinder;
pub use spending_forecaster::SpendingForecaster;
pub use types::{
    Anomaly, AnomalyType, BehaviorProfile, CashFlowForecast, CategoryStats, Confidence,
    Difficulty, ForecastHorizon, GoalPrediction, ImpulsiveBuying, MonthPhase, RecurringExpense,
    RecurringFrequency, RiskLevel, SavingsOpportunity, SavingsOpportunityType, Severity,
    SpendingForecast, SpendingFrequency, SpendingInsights, TimeOfDay, Trend, UnusualReason,
    UnusualTransaction,
};
