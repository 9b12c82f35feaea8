//! Linear-trend expense projection
//!
//! Expenses are regressed on each snapshot's 1-indexed position in the
//! history (not its date) and extrapolated a fixed number of periods ahead.
//! This is a trend line only: there are no confidence intervals and no
//! seasonality.

use serde::{Deserialize, Serialize};

use crate::models::Snapshot;

/// Number of periods projected beyond the history
pub const FORECAST_HORIZON: usize = 3;

/// Projected expenses for the periods following a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForecast {
    /// Ordinal positions being predicted (history length + 1, + 2, ...)
    pub periods: Vec<usize>,
    pub expenses: Vec<f64>,
    /// Fitted change in expenses per period
    pub slope: f64,
    pub intercept: f64,
}

/// Ordinary least squares fit of `ys` on positions 1..=n
///
/// With one point (or no spread in x) the fit is a flat line at the mean.
fn fit_line(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let x_mean = (n + 1.0) / 2.0;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = (i + 1) as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    if sxx == 0.0 {
        return (0.0, y_mean);
    }
    let slope = sxy / sxx;
    (slope, y_mean - slope * x_mean)
}

/// Project expenses for the next [`FORECAST_HORIZON`] periods
///
/// Returns `None` for an empty history.
pub fn forecast_expenses(history: &[Snapshot]) -> Option<ExpenseForecast> {
    if history.is_empty() {
        return None;
    }

    let ys: Vec<f64> = history.iter().map(|s| s.expenses).collect();
    let (slope, intercept) = fit_line(&ys);

    let periods: Vec<usize> = (1..=FORECAST_HORIZON).map(|k| history.len() + k).collect();
    let expenses = periods
        .iter()
        .map(|&p| intercept + slope * p as f64)
        .collect();

    Some(ExpenseForecast {
        periods,
        expenses,
        slope,
        intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn history(expenses: &[f64]) -> Vec<Snapshot> {
        expenses
            .iter()
            .enumerate()
            .map(|(i, &e)| Snapshot {
                id: i as i64 + 1,
                user_id: 1,
                recorded_at: Utc::now(),
                income: 5000.0,
                expenses: e,
                debts: 0.0,
                investments: 0.0,
                savings_rate: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_empty_history_is_no_data() {
        assert!(forecast_expenses(&[]).is_none());
    }

    #[test]
    fn test_single_point_is_flat() {
        let forecast = forecast_expenses(&history(&[1234.5])).unwrap();
        assert_eq!(forecast.periods, vec![2, 3, 4]);
        assert_eq!(forecast.expenses, vec![1234.5, 1234.5, 1234.5]);
        assert_eq!(forecast.slope, 0.0);
    }

    #[test]
    fn test_linear_trend_is_exact() {
        let forecast = forecast_expenses(&history(&[100.0, 200.0, 300.0, 400.0])).unwrap();
        assert_eq!(forecast.periods, vec![5, 6, 7]);
        assert_eq!(forecast.expenses, vec![500.0, 600.0, 700.0]);
        assert_eq!(forecast.slope, 100.0);
        assert_eq!(forecast.intercept, 0.0);
    }

    #[test]
    fn test_declining_trend() {
        let forecast = forecast_expenses(&history(&[3000.0, 2900.0, 2800.0])).unwrap();
        assert_eq!(forecast.expenses, vec![2700.0, 2600.0, 2500.0]);
    }

    #[test]
    fn test_noisy_history_uses_least_squares() {
        // y = 1, 3, 2: slope 0.5, intercept 1.0
        let forecast = forecast_expenses(&history(&[1.0, 3.0, 2.0])).unwrap();
        assert!((forecast.slope - 0.5).abs() < 1e-12);
        assert!((forecast.intercept - 1.0).abs() < 1e-12);
        assert!((forecast.expenses[0] - 3.0).abs() < 1e-12);
    }
}
