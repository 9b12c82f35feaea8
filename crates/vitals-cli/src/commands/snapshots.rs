//! Snapshot commands

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use vitals_core::{Database, NewSnapshot, Snapshot};

use super::find_user;

/// Parse a YYYY-MM-DD date as midnight UTC
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid time of day")?;
    Ok(midnight.and_utc())
}

pub fn cmd_add(
    db: &Database,
    username: &str,
    income: f64,
    expenses: f64,
    debts: f64,
    investments: f64,
    date: Option<&str>,
) -> Result<()> {
    let user = db.get_or_create_user(username)?;

    let mut new = NewSnapshot::new(income, expenses, debts, investments);
    if let Some(date) = date {
        new = new.at(parse_date(date)?);
    }

    let snapshot = db.insert_snapshot(user.id, &new)?;

    println!(
        "✅ Recorded snapshot for {} on {}",
        user.username,
        snapshot.recorded_at.format("%Y-%m-%d")
    );
    println!("   Savings rate: {:.1}%", snapshot.savings_rate);

    Ok(())
}

fn print_history(history: &[Snapshot]) {
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>9}",
        "Date", "Income", "Expenses", "Debts", "Investments", "Savings"
    );
    println!("{}", "-".repeat(74));
    for s in history {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>8.1}%",
            s.recorded_at.format("%Y-%m-%d"),
            s.income,
            s.expenses,
            s.debts,
            s.investments,
            s.savings_rate
        );
    }
}

pub fn cmd_history(db: &Database, username: &str, json: bool) -> Result<()> {
    let user = find_user(db, username)?;
    let history = db.get_history(user.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No snapshots recorded for {}", user.username);
        return Ok(());
    }

    println!("📒 History for {} ({} snapshots)", user.username, history.len());
    println!();
    print_history(&history);

    Ok(())
}
