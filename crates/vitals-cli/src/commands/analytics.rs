//! Analytics commands: health, anomalies, forecast

use anyhow::Result;
use vitals_core::{
    forecast_expenses, AnalyticsConfig, AnomalyDetector, Database, FinancialHealth,
    SavingsPredictor,
};

use super::find_user;

const NO_DATA: &str = "No financial data available";

pub fn cmd_health(
    db: &Database,
    predictor: &SavingsPredictor,
    username: &str,
    json: bool,
) -> Result<()> {
    let user = find_user(db, username)?;
    let history = db.get_history(user.id)?;

    let Some(health) = FinancialHealth::assess(&history, predictor) else {
        if json {
            println!("{}", serde_json::json!({ "error": NO_DATA }));
        } else {
            println!("{} for {}", NO_DATA, user.username);
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    println!(
        "💰 Financial health for {} (as of {})",
        user.username,
        health.as_of.format("%Y-%m-%d")
    );
    println!();
    println!("   Savings rate:              {:>8.1}%", health.savings_rate);
    println!("   Debt to annual income:     {:>8.1}%", health.debt_to_income_ratio);
    println!(
        "   Investments to annual inc: {:>8.1}%",
        health.investment_to_income_ratio
    );
    println!(
        "   Predicted savings rate:    {:>8.1}%",
        health.predicted_savings_rate
    );
    println!();
    println!(
        "   Based on {} snapshot(s). The predicted rate comes from a model trained on",
        health.historical_data.len()
    );
    println!("   reference data and will differ from your actual savings rate.");

    Ok(())
}

pub fn cmd_anomalies(
    db: &Database,
    config: &AnalyticsConfig,
    username: &str,
    json: bool,
) -> Result<()> {
    let user = find_user(db, username)?;
    let history = db.get_history(user.id)?;

    let detector = AnomalyDetector::new(config.anomaly.clone());
    let anomalies = detector.detect(&history);

    if json {
        println!("{}", serde_json::to_string_pretty(&anomalies)?);
        return Ok(());
    }

    if history.len() < config.anomaly.min_samples {
        println!(
            "ℹ️  {} has {} snapshot(s); at least {} are needed to spot anomalies",
            user.username,
            history.len(),
            config.anomaly.min_samples
        );
        return Ok(());
    }

    if anomalies.is_empty() {
        println!("✅ No unusual snapshots in {} records", history.len());
        return Ok(());
    }

    println!("⚠️  {} unusual snapshot(s):", anomalies.len());
    println!();
    for a in &anomalies {
        println!(
            "   {}  income {:>10.2}  expenses {:>10.2}  savings {:>7.1}%",
            a.recorded_at.format("%Y-%m-%d"),
            a.income,
            a.expenses,
            a.savings_rate
        );
    }

    Ok(())
}

pub fn cmd_forecast(db: &Database, username: &str, json: bool) -> Result<()> {
    let user = find_user(db, username)?;
    let history = db.get_history(user.id)?;
    let forecast = forecast_expenses(&history);

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    let Some(forecast) = forecast else {
        println!("{} for {}", NO_DATA, user.username);
        return Ok(());
    };

    println!("📈 Expense projection for {} (linear trend)", user.username);
    println!();
    for (period, expenses) in forecast.periods.iter().zip(&forecast.expenses) {
        println!("   Period {:>3}: {:>12.2}", period, expenses);
    }
    println!();
    println!("   Trend: {:+.2} per period", forecast.slope);

    Ok(())
}
