//! Vitals Core Library
//!
//! Shared functionality for the Vitals financial health tool:
//! - Database access and migrations for users and snapshot histories
//! - Ratio metrics, learned savings-rate prediction, anomaly detection,
//!   expense forecasting, and planning calculators
//! - Financial health reports combining the above
//! - Analytics configuration with embedded defaults

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod models;

pub use analytics::{
    advise, compute_ratios, detect_anomalies, forecast_expenses, plan_goal, AnomalyDetector,
    AnomalyRecord, ExpenseForecast, HealthMetrics, ModelSummary, RiskTolerance, SavingsPredictor,
};
pub use config::{AnalyticsConfig, AnomalyConfig, PredictorConfig};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use health::FinancialHealth;
pub use models::{HistorySeries, NewSnapshot, Snapshot, User};
