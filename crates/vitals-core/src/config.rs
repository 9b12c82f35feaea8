//! Analytics configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the config dir (~/.config/vitals/analytics.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Values missing from an override file keep their defaults. The model cache
//! location can additionally be overridden with `VITALS_MODEL_CACHE`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Environment variable overriding the model cache location
pub const MODEL_CACHE_ENV: &str = "VITALS_MODEL_CACHE";

/// File name of the model cache inside the data directory
const MODEL_CACHE_FILE: &str = "savings_model.json.gz";

/// Savings predictor training parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Number of synthetic reference samples
    pub samples: usize,
    /// Number of trees in the forest
    pub trees: usize,
    pub seed: u64,
    /// Share of reference data held out for evaluation
    pub test_fraction: f64,
    /// Explicit cache location (None = platform data dir)
    pub cache_path: Option<PathBuf>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            trees: 100,
            seed: 42,
            test_fraction: 0.2,
            cache_path: None,
        }
    }
}

impl PredictorConfig {
    /// Resolve where the trained model is cached
    ///
    /// Priority: `VITALS_MODEL_CACHE` > configured path > data dir > working dir
    pub fn resolved_cache_path(&self) -> PathBuf {
        if let Some(path) = std::env::var_os(MODEL_CACHE_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        if let Some(ref path) = self.cache_path {
            return path.clone();
        }
        dirs::data_local_dir()
            .map(|d| d.join("vitals").join(MODEL_CACHE_FILE))
            .unwrap_or_else(|| PathBuf::from(MODEL_CACHE_FILE))
    }
}

/// Anomaly detector parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyConfig {
    /// Number of isolation trees fitted per call
    pub trees: usize,
    /// Expected share of outliers
    pub contamination: f64,
    pub seed: u64,
    /// Histories shorter than this are never flagged
    pub min_samples: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            contamination: 0.1,
            seed: 42,
            min_samples: 3,
        }
    }
}

/// Full analytics configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsConfig {
    pub predictor: PredictorConfig,
    pub anomaly: AnomalyConfig,
}

impl AnalyticsConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                read_config(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }
}

/// Default override location (~/.config/vitals/analytics.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vitals").join("analytics.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::Config(format!("Failed to read config: {}", e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    predictor: Option<RawPredictor>,
    anomaly: Option<RawAnomaly>,
}

#[derive(Debug, Deserialize)]
struct RawPredictor {
    samples: Option<usize>,
    trees: Option<usize>,
    seed: Option<u64>,
    test_fraction: Option<f64>,
    cache_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    trees: Option<usize>,
    contamination: Option<f64>,
    seed: Option<u64>,
    min_samples: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalyticsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalyticsConfig::default();

    if let Some(p) = raw.predictor {
        if let Some(samples) = p.samples {
            config.predictor.samples = samples;
        }
        if let Some(trees) = p.trees {
            config.predictor.trees = trees;
        }
        if let Some(seed) = p.seed {
            config.predictor.seed = seed;
        }
        if let Some(fraction) = p.test_fraction {
            config.predictor.test_fraction = fraction;
        }
        config.predictor.cache_path = p.cache_path;
    }

    if let Some(a) = raw.anomaly {
        if let Some(trees) = a.trees {
            config.anomaly.trees = trees;
        }
        if let Some(contamination) = a.contamination {
            config.anomaly.contamination = contamination;
        }
        if let Some(seed) = a.seed {
            config.anomaly.seed = seed;
        }
        if let Some(min_samples) = a.min_samples {
            config.anomaly.min_samples = min_samples;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AnalyticsConfig) -> Result<()> {
    let p = &config.predictor;
    if p.trees == 0 {
        return Err(Error::Config("predictor.trees must be at least 1".into()));
    }
    if p.samples < 10 {
        return Err(Error::Config("predictor.samples must be at least 10".into()));
    }
    if !(0.0..0.9).contains(&p.test_fraction) {
        return Err(Error::Config(
            "predictor.test_fraction must be in [0, 0.9)".into(),
        ));
    }

    let a = &config.anomaly;
    if a.trees == 0 {
        return Err(Error::Config("anomaly.trees must be at least 1".into()));
    }
    if !(a.contamination > 0.0 && a.contamination <= 0.5) {
        return Err(Error::Config(
            "anomaly.contamination must be in (0, 0.5]".into(),
        ));
    }
    if a.min_samples < 2 {
        return Err(Error::Config("anomaly.min_samples must be at least 2".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.predictor.samples, 1000);
        assert_eq!(config.predictor.trees, 100);
        assert_eq!(config.predictor.seed, 42);
        assert!((config.anomaly.contamination - 0.1).abs() < 1e-12);
        assert!(config.predictor.cache_path.is_none());
    }

    #[test]
    fn test_default_config_matches_defaults() {
        assert_eq!(parse_config(DEFAULT_CONFIG).unwrap(), AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [predictor]
            trees = 10
            cache_path = "/tmp/model.json.gz"
            "#,
        )
        .unwrap();

        assert_eq!(config.predictor.trees, 10);
        assert_eq!(config.predictor.samples, 1000);
        assert_eq!(
            config.predictor.cache_path,
            Some(PathBuf::from("/tmp/model.json.gz"))
        );
        assert_eq!(config.anomaly, AnomalyConfig::default());
    }

    #[test]
    fn test_invalid_contamination_rejected() {
        let err = parse_config("[anomaly]\ncontamination = 0.9\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(parse_config("[predictor\ntrees = ").is_err());
    }

    #[test]
    fn test_missing_override_file_is_error() {
        let err = AnalyticsConfig::load(Some(Path::new("/nonexistent/vitals.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.toml");
        fs::write(&path, "[anomaly]\nmin_samples = 5\n").unwrap();

        let config = AnalyticsConfig::load(Some(&path)).unwrap();
        assert_eq!(config.anomaly.min_samples, 5);
    }
}
