//! Ratio metrics for a single snapshot

use serde::{Deserialize, Serialize};

/// Ratio metrics derived from one snapshot, all as percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Share of monthly income left after expenses (may be negative)
    pub savings_rate: f64,
    /// Debts relative to annual income
    pub debt_to_income_ratio: f64,
    /// Investments relative to annual income
    pub investment_to_income_ratio: f64,
}

/// Compute the ratio metrics for one snapshot's fields
///
/// Income is monthly; debt and investment ratios use annualized income.
/// Every ratio is 0 when income is not positive.
pub fn compute_ratios(income: f64, expenses: f64, debts: f64, investments: f64) -> HealthMetrics {
    if income <= 0.0 {
        return HealthMetrics {
            savings_rate: 0.0,
            debt_to_income_ratio: 0.0,
            investment_to_income_ratio: 0.0,
        };
    }

    let annual_income = income * 12.0;

    HealthMetrics {
        savings_rate: (income - expenses) / income * 100.0,
        debt_to_income_ratio: debts / annual_income * 100.0,
        investment_to_income_ratio: investments / annual_income * 100.0,
    }
}

/// Savings rate alone, as stored on each snapshot
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    compute_ratios(income, expenses, 0.0, 0.0).savings_rate
}
