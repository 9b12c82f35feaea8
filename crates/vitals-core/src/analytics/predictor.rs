//! Learned savings-rate predictor
//!
//! A random forest trained on synthetic reference data maps
//! (income, expenses, debts, investments) to a savings rate. The label of
//! the reference data is the clamped arithmetic savings rate, so the model
//! is a noisy re-derivation of [`compute_ratios`](super::compute_ratios)
//! with debts and investments as uninformative inputs. Its output is
//! expected to differ from the arithmetic ratio.
//!
//! ## Lifecycle
//!
//! The trained model is cached as gzip-compressed JSON. [`SavingsPredictor::load_or_train`]
//! loads the cache when it matches the configured training parameters and
//! otherwise retrains and rewrites it. A corrupt or unreadable cache is
//! logged and replaced, never reported to the caller.
//! [`SavingsPredictor::shared`] holds one process-wide instance that is
//! built at most once.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::forest::RandomForestRegressor;
use super::scaler::StandardScaler;
use crate::config::PredictorConfig;
use crate::error::{Error, Result};

/// Bumped whenever the cached model layout changes
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Feature order expected by the model
pub const FEATURES: [&str; 4] = ["income", "expenses", "debts", "investments"];

/// (mean, standard deviation) of each synthetic feature, in [`FEATURES`] order
const REFERENCE_DISTRIBUTIONS: [(f64, f64); 4] = [
    (5000.0, 1500.0),
    (3000.0, 1000.0),
    (10000.0, 5000.0),
    (20000.0, 10000.0),
];

static SHARED: OnceLock<Arc<SavingsPredictor>> = OnceLock::new();
static SHARED_INIT: Mutex<()> = Mutex::new(());

/// Parameters a model was trained with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub samples: usize,
    pub trees: usize,
    pub seed: u64,
    pub test_fraction: f64,
}

impl From<&PredictorConfig> for TrainingParams {
    fn from(config: &PredictorConfig) -> Self {
        Self {
            samples: config.samples,
            trees: config.trees,
            seed: config.seed,
            test_fraction: config.test_fraction,
        }
    }
}

/// The cached artifact: a fitted scaler and forest plus provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub params: TrainingParams,
    /// Coefficient of determination on the held-out split
    pub test_r2: Option<f64>,
    pub scaler: StandardScaler,
    pub forest: RandomForestRegressor,
}

impl TrainedModel {
    fn validate(&self) -> Result<()> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(Error::Model(format!(
                "Unsupported model version {} (expected {})",
                self.version, MODEL_FORMAT_VERSION
            )));
        }
        if self.scaler.n_features() != FEATURES.len()
            || self.forest.n_features() != FEATURES.len()
        {
            return Err(Error::Model("Model feature count mismatch".into()));
        }
        self.forest.validate()
    }
}

/// Read-only summary of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub trees: usize,
    pub nodes: usize,
    pub seed: u64,
    pub test_r2: Option<f64>,
}

/// Synthetic reference data: feature rows and their savings-rate labels
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

/// Label for one reference row: savings rate clamped to [0, 100]
fn reference_label(income: f64, expenses: f64) -> f64 {
    let rate = (income - expenses) / income * 100.0;
    if rate.is_finite() {
        rate.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Draw `samples` normally distributed reference rows
///
/// Each feature column is drawn in full before the next.
pub fn generate_reference_data(samples: usize, rng: &mut StdRng) -> Result<ReferenceData> {
    let mut columns = Vec::with_capacity(REFERENCE_DISTRIBUTIONS.len());
    for (mean, sd) in REFERENCE_DISTRIBUTIONS {
        let normal = Normal::new(mean, sd)
            .map_err(|e| Error::Model(format!("Invalid reference distribution: {}", e)))?;
        let column: Vec<f64> = (0..samples).map(|_| normal.sample(rng)).collect();
        columns.push(column);
    }

    let features: Vec<Vec<f64>> = (0..samples)
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect();
    let labels = features
        .iter()
        .map(|row| reference_label(row[0], row[1]))
        .collect();

    Ok(ReferenceData { features, labels })
}

/// Coefficient of determination
fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() {
        return None;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return None;
    }
    Some(1.0 - ss_res / ss_tot)
}

/// Savings-rate model ready for inference
#[derive(Debug, Clone)]
pub struct SavingsPredictor {
    model: TrainedModel,
}

impl SavingsPredictor {
    /// Train a fresh model on newly generated reference data
    pub fn train(config: &PredictorConfig) -> Result<Self> {
        if config.samples < 2 {
            return Err(Error::Model(format!(
                "Need at least 2 reference samples, got {}",
                config.samples
            )));
        }

        let started = Instant::now();
        let params = TrainingParams::from(config);
        let mut rng = StdRng::seed_from_u64(params.seed);

        let data = generate_reference_data(params.samples, &mut rng)?;

        // Reproducible shuffle, then hold out the first test_fraction
        let mut order: Vec<usize> = (0..params.samples).collect();
        order.shuffle(&mut rng);
        let test_len = (params.samples as f64 * params.test_fraction).ceil() as usize;
        let (test_idx, train_idx) = order.split_at(test_len.min(params.samples - 1));

        let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| data.features[i].clone()).collect();
        let train_y: Vec<f64> = train_idx.iter().map(|&i| data.labels[i]).collect();

        let scaler = StandardScaler::fit(&train_x)?;
        let forest = RandomForestRegressor::fit(
            &scaler.transform_all(&train_x),
            &train_y,
            params.trees,
            params.seed,
        )?;

        let test_y: Vec<f64> = test_idx.iter().map(|&i| data.labels[i]).collect();
        let test_pred: Vec<f64> = test_idx
            .iter()
            .map(|&i| forest.predict(&scaler.transform(&data.features[i])))
            .collect();
        let test_r2 = r2_score(&test_y, &test_pred);

        info!(
            samples = params.samples,
            train = train_idx.len(),
            test = test_idx.len(),
            trees = params.trees,
            nodes = forest.node_count(),
            test_r2 = ?test_r2,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Trained savings model"
        );

        Ok(Self {
            model: TrainedModel {
                version: MODEL_FORMAT_VERSION,
                trained_at: Utc::now(),
                params,
                test_r2,
                scaler,
                forest,
            },
        })
    }

    /// Load a cached model
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let model: TrainedModel = serde_json::from_reader(decoder)?;
        model.validate()?;

        debug!(path = %path.display(), "Loaded savings model from cache");
        Ok(Self { model })
    }

    /// Write the model to `path` atomically (temp file in the same directory, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let writer = BufWriter::new(tmp.as_file());
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer(&mut encoder, &self.model)?;
            encoder.finish()?.flush()?;
        }
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(path = %path.display(), "Saved savings model cache");
        Ok(())
    }

    /// Load the cached model, or train and cache a new one
    ///
    /// A cache that is missing, unreadable, corrupt, or trained with other
    /// parameters is replaced. Failing to write the cache is logged; the
    /// trained model is still returned.
    pub fn load_or_train(config: &PredictorConfig) -> Result<Self> {
        let path = config.resolved_cache_path();
        let expected = TrainingParams::from(config);

        if path.exists() {
            match Self::load(&path) {
                Ok(predictor) if predictor.model.params == expected => {
                    info!(path = %path.display(), "Using cached savings model");
                    return Ok(predictor);
                }
                Ok(_) => {
                    info!(path = %path.display(), "Cached savings model was trained with different parameters, retraining");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Savings model cache unusable, retraining");
                }
            }
        } else {
            info!(path = %path.display(), "No cached savings model, training");
        }

        let predictor = Self::train(config)?;
        if let Err(e) = predictor.save(&path) {
            warn!(path = %path.display(), error = %e, "Failed to write savings model cache");
        }
        Ok(predictor)
    }

    /// Process-wide predictor, built on first call
    ///
    /// Concurrent first callers block until the single load-or-train
    /// finishes; later calls return the same instance and ignore `config`.
    pub fn shared(config: &PredictorConfig) -> Result<Arc<Self>> {
        if let Some(predictor) = SHARED.get() {
            return Ok(predictor.clone());
        }

        let _guard = SHARED_INIT.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(predictor) = SHARED.get() {
            return Ok(predictor.clone());
        }

        let predictor = Arc::new(Self::load_or_train(config)?);
        let _ = SHARED.set(predictor.clone());
        Ok(predictor)
    }

    /// Predict the savings rate for one snapshot's inputs
    pub fn predict(&self, income: f64, expenses: f64, debts: f64, investments: f64) -> f64 {
        let row = self
            .model
            .scaler
            .transform(&[income, expenses, debts, investments]);
        self.model.forest.predict(&row)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            version: self.model.version,
            trained_at: self.model.trained_at,
            samples: self.model.params.samples,
            trees: self.model.forest.n_trees(),
            nodes: self.model.forest.node_count(),
            seed: self.model.params.seed,
            test_r2: self.model.test_r2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn small_config(cache_path: PathBuf) -> PredictorConfig {
        PredictorConfig {
            samples: 200,
            trees: 10,
            cache_path: Some(cache_path),
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_label_is_clamped() {
        assert_eq!(reference_label(5000.0, 3000.0), 40.0);
        assert_eq!(reference_label(2000.0, 3000.0), 0.0);
        assert_eq!(reference_label(5000.0, -1000.0), 100.0);
        assert_eq!(reference_label(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_reference_data_shape_and_labels() {
        let mut rng = StdRng::seed_from_u64(42);
        let data = generate_reference_data(1000, &mut rng).unwrap();

        assert_eq!(data.features.len(), 1000);
        assert!(data.features.iter().all(|r| r.len() == 4));
        assert!(data.labels.iter().all(|l| (0.0..=100.0).contains(l)));

        let mean_income: f64 = data.features.iter().map(|r| r[0]).sum::<f64>() / 1000.0;
        assert!((mean_income - 5000.0).abs() < 200.0);

        // Raw draws are used as-is; only the label is clamped
        assert!(data.features.iter().any(|r| r[2] < 0.0));
    }

    #[test]
    fn test_training_is_deterministic() {
        let config = PredictorConfig::default();
        let a = SavingsPredictor::train(&config).unwrap();
        let b = SavingsPredictor::train(&config).unwrap();

        for probe in [
            (5000.0, 3000.0, 10000.0, 20000.0),
            (8000.0, 7500.0, 0.0, 500.0),
            (1200.0, 2500.0, 40000.0, 0.0),
        ] {
            let pa = a.predict(probe.0, probe.1, probe.2, probe.3);
            let pb = b.predict(probe.0, probe.1, probe.2, probe.3);
            assert!((pa - pb).abs() < 1e-12, "{} != {}", pa, pb);
        }
        assert_eq!(a.model().forest, b.model().forest);
    }

    #[test]
    fn test_too_few_samples_is_an_error() {
        for samples in [0, 1] {
            let config = PredictorConfig {
                samples,
                ..Default::default()
            };
            let err = SavingsPredictor::train(&config).unwrap_err();
            assert!(matches!(err, Error::Model(_)));
        }
    }

    #[test]
    fn test_default_model_tracks_savings_rate() {
        let predictor = SavingsPredictor::train(&PredictorConfig::default()).unwrap();
        let summary = predictor.summary();

        assert_eq!(summary.trees, 100);
        assert_eq!(summary.samples, 1000);
        assert!(summary.test_r2.unwrap() > 0.5);

        let predicted = predictor.predict(5000.0, 3000.0, 10000.0, 20000.0);
        assert!((predicted - 40.0).abs() < 10.0, "predicted {}", predicted);

        // Expenses above income sit at the clamped floor of the labels
        let underwater = predictor.predict(3000.0, 6000.0, 10000.0, 20000.0);
        assert!(underwater < 10.0, "predicted {}", underwater);
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json.gz");
        let config = small_config(path.clone());

        let trained = SavingsPredictor::train(&config).unwrap();
        trained.save(&path).unwrap();
        let loaded = SavingsPredictor::load(&path).unwrap();

        assert_eq!(loaded.model().params, trained.model().params);
        assert_eq!(
            loaded.predict(4000.0, 2500.0, 1000.0, 3000.0),
            trained.predict(4000.0, 2500.0, 1000.0, 3000.0)
        );
    }

    #[test]
    fn test_load_or_train_writes_then_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json.gz");
        let config = small_config(path.clone());

        let first = SavingsPredictor::load_or_train(&config).unwrap();
        assert!(path.exists());

        let second = SavingsPredictor::load_or_train(&config).unwrap();
        assert_eq!(second.model().trained_at, first.model().trained_at);
    }

    #[test]
    fn test_corrupt_cache_triggers_retraining() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json.gz");
        fs::write(&path, b"definitely not gzip").unwrap();
        let config = small_config(path.clone());

        assert!(SavingsPredictor::load(&path).is_err());
        let predictor = SavingsPredictor::load_or_train(&config).unwrap();
        assert!(predictor.predict(5000.0, 3000.0, 0.0, 0.0).is_finite());

        // The corrupt file was replaced with a loadable cache
        assert!(SavingsPredictor::load(&path).is_ok());
    }

    #[test]
    fn test_parameter_change_triggers_retraining() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json.gz");
        let config = small_config(path.clone());
        SavingsPredictor::load_or_train(&config).unwrap();

        let bigger = PredictorConfig {
            trees: 12,
            ..config
        };
        let predictor = SavingsPredictor::load_or_train(&bigger).unwrap();
        assert_eq!(predictor.summary().trees, 12);
        assert_eq!(SavingsPredictor::load(&path).unwrap().summary().trees, 12);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json.gz");
        let mut predictor = SavingsPredictor::train(&small_config(path.clone())).unwrap();
        predictor.model.version = MODEL_FORMAT_VERSION + 1;
        predictor.save(&path).unwrap();

        let err = SavingsPredictor::load(&path).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_unwritable_cache_still_returns_model() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the cache directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let config = small_config(blocker.join("model.json.gz"));

        let predictor = SavingsPredictor::load_or_train(&config).unwrap();
        assert!(predictor.predict(5000.0, 3000.0, 0.0, 0.0).is_finite());
    }

    #[test]
    fn test_shared_initializes_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path().join("shared.json.gz"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let config = config.clone();
                std::thread::spawn(move || SavingsPredictor::shared(&config).unwrap())
            })
            .collect();
        let predictors: Vec<Arc<SavingsPredictor>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for p in &predictors[1..] {
            assert!(Arc::ptr_eq(&predictors[0], p));
        }
    }
}
