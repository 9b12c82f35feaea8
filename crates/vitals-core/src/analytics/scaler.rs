//! Feature standardization (zero mean, unit variance)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-column standardizer fit on a training matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    /// Population standard deviations; constant columns use 1.0
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = match rows.first() {
            Some(row) => row.len(),
            None => return Err(Error::Model("Cannot fit scaler on empty data".into())),
        };
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::Model("Ragged feature matrix".into()));
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut scales {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { means, scales })
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .zip(&self.scales)
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}
