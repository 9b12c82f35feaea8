//! Integration tests for vitals-core
//!
//! These tests exercise the record → history → analytics workflow.

use chrono::{Duration, TimeZone, Utc};
use vitals_core::{
    advise, detect_anomalies, forecast_expenses, plan_goal, AnalyticsConfig, AnomalyConfig,
    AnomalyDetector, Database, FinancialHealth, NewSnapshot, PredictorConfig, RiskTolerance,
    SavingsPredictor,
};

/// Twelve months of steady finances with two bad months mixed in
fn record_year(db: &Database, user_id: i64) {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap();
    for month in 0..12 {
        let (income, expenses) = match month {
            4 => (5000.0, 30000.0),
            9 => (60000.0, 3100.0),
            _ => (5000.0, 3000.0 + month as f64 * 10.0),
        };
        db.insert_snapshot(
            user_id,
            &NewSnapshot::new(income, expenses, 8000.0, 15000.0)
                .at(start + Duration::days(30 * month)),
        )
        .expect("Failed to insert snapshot");
    }
}

fn small_predictor() -> SavingsPredictor {
    SavingsPredictor::train(&PredictorConfig {
        samples: 300,
        trees: 15,
        ..Default::default()
    })
    .expect("Failed to train predictor")
}

// =============================================================================
// Database + Analytics Integration Tests
// =============================================================================

#[test]
fn test_full_analytics_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let user = db.get_or_create_user("alice").unwrap();
    record_year(&db, user.id);

    let history = db.get_history(user.id).unwrap();
    assert_eq!(history.len(), 12);

    // Health report reflects the latest month
    let predictor = small_predictor();
    let health = FinancialHealth::assess(&history, &predictor).unwrap();
    assert_eq!(health.as_of, history[11].recorded_at);
    assert!((health.savings_rate - 37.8).abs() < 1e-9);
    assert_eq!(health.historical_data.len(), 12);
    assert!(health.predicted_savings_rate.is_finite());

    // At the default contamination a year of history leaves room for one flag
    let anomalies = detect_anomalies(&history);
    assert_eq!(anomalies.len(), 1);

    // Allowing for two, both bad months stand out and the steady months do not
    let detector = AnomalyDetector::new(AnomalyConfig {
        contamination: 0.2,
        ..Default::default()
    });
    let anomalies = detector.detect(&history);
    assert_eq!(anomalies.len(), 2);
    assert_eq!(anomalies[0].expenses, 30000.0);
    assert_eq!(anomalies[1].income, 60000.0);

    // Forecast covers the three months after the history
    let forecast = forecast_expenses(&history).unwrap();
    assert_eq!(forecast.periods, vec![13, 14, 15]);
    assert_eq!(forecast.expenses.len(), 3);
}

#[test]
fn test_new_user_has_no_data() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("newcomer").unwrap();
    let history = db.get_history(user.id).unwrap();

    assert!(FinancialHealth::assess(&history, &small_predictor()).is_none());
    assert!(detect_anomalies(&history).is_empty());
    assert!(forecast_expenses(&history).is_none());
}

#[test]
fn test_planning_workflow() {
    let monthly = plan_goal(12000.0, 2000.0, 5).unwrap();
    assert!((monthly - 10000.0 / 60.0).abs() < 1e-9);
    assert!(plan_goal(12000.0, 2000.0, 0).is_err());

    let tier: RiskTolerance = "High".parse().unwrap();
    let suggestions = advise(tier, 500.0, 2000.0);
    assert_eq!(suggestions.len(), 5);
    assert_eq!(suggestions[2], "High Yield Bonds");
}

#[test]
fn test_predictor_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = PredictorConfig {
        samples: 150,
        trees: 5,
        cache_path: Some(dir.path().join("model.json.gz")),
        ..Default::default()
    };

    let first = SavingsPredictor::load_or_train(&config).unwrap();
    let second = SavingsPredictor::load_or_train(&config).unwrap();

    assert_eq!(first.summary().trained_at, second.summary().trained_at);
    assert_eq!(
        first.predict(4200.0, 3900.0, 100.0, 0.0),
        second.predict(4200.0, 3900.0, 100.0, 0.0)
    );
}

#[test]
fn test_config_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "[anomaly]\ncontamination = 0.2\n").unwrap();

    let config = AnalyticsConfig::load(Some(&path)).unwrap();
    assert_eq!(config.anomaly.contamination, 0.2);
    assert_eq!(config.predictor, PredictorConfig::default());
}
