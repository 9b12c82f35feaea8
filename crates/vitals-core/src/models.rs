//! Domain models for Vitals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named owner of a snapshot history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// One user's recorded financial state at a point in time
///
/// Snapshots are immutable once stored. `savings_rate` is derived from
/// income and expenses when the snapshot is recorded and is not clamped,
/// so it goes negative when expenses exceed income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub user_id: i64,
    pub recorded_at: DateTime<Utc>,
    /// Monthly income
    pub income: f64,
    /// Monthly expenses
    pub expenses: f64,
    /// Total outstanding debts
    pub debts: f64,
    /// Total investments
    pub investments: f64,
    /// Percentage of income left after expenses
    pub savings_rate: f64,
}

/// Input for recording a new snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSnapshot {
    pub income: f64,
    pub expenses: f64,
    pub debts: f64,
    pub investments: f64,
    /// When the snapshot applies (defaults to now)
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewSnapshot {
    pub fn new(income: f64, expenses: f64, debts: f64, investments: f64) -> Self {
        Self {
            income,
            expenses,
            debts,
            investments,
            recorded_at: None,
        }
    }

    /// Backdate the snapshot
    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Reject negative or non-finite monetary amounts
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("income", self.income),
            ("expenses", self.expenses),
            ("debts", self.debts),
            ("investments", self.investments),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("{} must be a finite number", name)));
            }
            if value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Column-oriented view of a history, shaped for charting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    /// Snapshot dates as `YYYY-MM-DD`
    pub dates: Vec<String>,
    pub incomes: Vec<f64>,
    pub expenses: Vec<f64>,
    pub debts: Vec<f64>,
    pub investments: Vec<f64>,
    pub savings_rates: Vec<f64>,
}

impl HistorySeries {
    pub fn from_history(history: &[Snapshot]) -> Self {
        let mut series = Self::default();
        for snapshot in history {
            series
                .dates
                .push(snapshot.recorded_at.format("%Y-%m-%d").to_string());
            series.incomes.push(snapshot.income);
            series.expenses.push(snapshot.expenses);
            series.debts.push(snapshot.debts);
            series.investments.push(snapshot.investments);
            series.savings_rates.push(snapshot.savings_rate);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
