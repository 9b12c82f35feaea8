//! Savings model commands

use anyhow::{Context, Result};
use tracing::info;
use vitals_core::{AnalyticsConfig, SavingsPredictor};

pub fn cmd_model_status(config: &AnalyticsConfig) -> Result<()> {
    let path = config.predictor.resolved_cache_path();
    println!("🧠 Savings model cache: {}", path.display());

    if !path.exists() {
        println!("   Not trained yet. Run: vitals model train");
        return Ok(());
    }

    match SavingsPredictor::load(&path) {
        Ok(predictor) => {
            let summary = predictor.summary();
            println!(
                "   Trained:   {}",
                summary.trained_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("   Samples:   {}", summary.samples);
            println!("   Trees:     {} ({} nodes)", summary.trees, summary.nodes);
            println!("   Seed:      {}", summary.seed);
            match summary.test_r2 {
                Some(r2) => println!("   Test R²:   {:.4}", r2),
                None => println!("   Test R²:   n/a"),
            }
        }
        Err(e) => {
            println!("   ⚠️  Cache unreadable ({}); it will be rebuilt on next use", e);
        }
    }

    Ok(())
}

pub async fn cmd_model_train(config: &AnalyticsConfig, force: bool) -> Result<()> {
    let predictor_config = config.predictor.clone();
    let path = predictor_config.resolved_cache_path();

    println!("🧠 Preparing savings model ({} trees)...", predictor_config.trees);

    let predictor = tokio::task::spawn_blocking(move || -> vitals_core::Result<SavingsPredictor> {
        if force {
            let predictor = SavingsPredictor::train(&predictor_config)?;
            predictor.save(&predictor_config.resolved_cache_path())?;
            Ok(predictor)
        } else {
            SavingsPredictor::load_or_train(&predictor_config)
        }
    })
    .await
    .context("Model training task failed")??;

    let summary = predictor.summary();
    info!(path = %path.display(), "Model cache ready");

    println!("✅ Model ready at {}", path.display());
    if let Some(r2) = summary.test_r2 {
        println!("   Test R²: {:.4}", r2);
    }

    Ok(())
}
