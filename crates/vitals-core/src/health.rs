//! Financial health report for a user's latest snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{compute_ratios, SavingsPredictor};
use crate::models::{HistorySeries, Snapshot};

/// Ratios and predicted savings rate for the most recent snapshot, plus
/// the full history shaped for charting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealth {
    /// When the latest snapshot was recorded
    pub as_of: DateTime<Utc>,
    pub savings_rate: f64,
    pub debt_to_income_ratio: f64,
    pub investment_to_income_ratio: f64,
    /// Model estimate; expected to differ from `savings_rate`
    pub predicted_savings_rate: f64,
    pub historical_data: HistorySeries,
}

impl FinancialHealth {
    /// Assess a history ordered oldest first
    ///
    /// Returns `None` when there is no data.
    pub fn assess(history: &[Snapshot], predictor: &SavingsPredictor) -> Option<Self> {
        let latest = history.last()?;
        let ratios = compute_ratios(
            latest.income,
            latest.expenses,
            latest.debts,
            latest.investments,
        );
        let predicted = predictor.predict(
            latest.income,
            latest.expenses,
            latest.debts,
            latest.investments,
        );

        Some(Self {
            as_of: latest.recorded_at,
            savings_rate: ratios.savings_rate,
            debt_to_income_ratio: ratios.debt_to_income_ratio,
            investment_to_income_ratio: ratios.investment_to_income_ratio,
            predicted_savings_rate: predicted,
            historical_data: HistorySeries::from_history(history),
        })
    }
}
