//! Outlier detection over a user's snapshot history
//!
//! An isolation forest is fitted on the full history every call; nothing is
//! cached between calls, so verdicts always reflect the current history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::isolation::{quantile, IsolationForest};
use crate::config::AnomalyConfig;
use crate::models::Snapshot;

/// A snapshot flagged as unusual relative to the rest of its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub recorded_at: DateTime<Utc>,
    pub income: f64,
    pub expenses: f64,
    pub savings_rate: f64,
    pub is_anomaly: bool,
}

/// Isolation-forest outlier detector
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Return the anomalous snapshots of `history`, in history order
    ///
    /// Histories shorter than `min_samples` have no meaningful outlier
    /// structure and yield an empty list.
    pub fn detect(&self, history: &[Snapshot]) -> Vec<AnomalyRecord> {
        if history.len() < self.config.min_samples {
            debug!(
                snapshots = history.len(),
                min_samples = self.config.min_samples,
                "History too short for anomaly detection"
            );
            return Vec::new();
        }

        let features: Vec<Vec<f64>> = history
            .iter()
            .map(|s| vec![s.income, s.expenses, s.savings_rate])
            .collect();

        let Some(forest) =
            IsolationForest::fit(&features, self.config.trees, self.config.seed)
        else {
            return Vec::new();
        };

        let scores = forest.score_all(&features);
        let threshold = quantile(&scores, 1.0 - self.config.contamination);
        let flagged = flagged_rows(&scores, threshold, self.config.contamination);

        let anomalies: Vec<AnomalyRecord> = flagged
            .into_iter()
            .map(|i| &history[i])
            .map(|s| AnomalyRecord {
                recorded_at: s.recorded_at,
                income: s.income,
                expenses: s.expenses,
                savings_rate: s.savings_rate,
                is_anomaly: true,
            })
            .collect();

        debug!(
            snapshots = history.len(),
            anomalies = anomalies.len(),
            threshold,
            "Anomaly detection complete"
        );

        anomalies
    }
}

/// Rows to flag, in history order
///
/// A row must score strictly above `threshold` and rank among the
/// `contamination * n` highest scores (at least one). The interpolated
/// threshold alone lets the top inlier through whenever inlier scores are
/// not exactly tied. Equal scores rank in history order.
fn flagged_rows(scores: &[f64], threshold: f64, contamination: f64) -> Vec<usize> {
    let budget = ((contamination * scores.len() as f64 + 1e-9).floor() as usize).max(1);

    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut flagged: Vec<usize> = ranked
        .into_iter()
        .take(budget)
        .filter(|&i| scores[i] > threshold)
        .collect();
    flagged.sort_unstable();
    flagged
}

/// Detect anomalies with the default detector settings
pub fn detect_anomalies(history: &[Snapshot]) -> Vec<AnomalyRecord> {
    AnomalyDetector::default().detect(history)
}
