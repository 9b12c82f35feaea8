//! Financial analytics engine
//!
//! - [`compute_ratios`]: deterministic ratio metrics for one snapshot
//! - [`SavingsPredictor`]: random-forest savings-rate model trained on
//!   synthetic reference data and cached on disk
//! - [`AnomalyDetector`]: isolation-forest outliers over a history
//! - [`forecast_expenses`]: linear-trend expense projection
//! - [`plan_goal`] / [`advise`]: rule-based planning calculators
//!
//! Everything except the predictor is a pure function of its inputs.

mod anomaly;
mod forecast;
pub mod forest;
pub mod isolation;
mod metrics;
mod planning;
mod predictor;
pub mod scaler;

pub use anomaly::{detect_anomalies, AnomalyDetector, AnomalyRecord};
pub use forecast::{forecast_expenses, ExpenseForecast, FORECAST_HORIZON};
pub use metrics::{compute_ratios, savings_rate, HealthMetrics};
pub use planning::{
    advise, plan_goal, RiskTolerance, MIN_DIVERSIFIED_INVESTMENTS, MIN_SAVINGS_BUFFER,
};
pub use predictor::{
    generate_reference_data, ModelSummary, ReferenceData, SavingsPredictor, TrainedModel,
    TrainingParams, FEATURES, MODEL_FORMAT_VERSION,
};
