//! Planning commands

use anyhow::Result;
use vitals_core::{advise, plan_goal, RiskTolerance};

pub fn cmd_plan(target: f64, savings: f64, years: i64) -> Result<()> {
    let monthly = plan_goal(target, savings, years)?;

    if monthly <= 0.0 {
        println!(
            "🎉 Current savings of {:.2} already cover the {:.2} goal",
            savings, target
        );
    } else {
        println!(
            "🎯 Save {:.2} per month for {} year(s) to reach {:.2}",
            monthly, years, target
        );
    }

    Ok(())
}

pub fn cmd_advise(risk: &str, savings: f64, investments: f64) -> Result<()> {
    // Parsing never fails; unknown tiers are conservative
    let tier: RiskTolerance = risk.parse().unwrap_or(RiskTolerance::Other);

    println!("📋 Suggestions for {} risk tolerance:", tier);
    for suggestion in advise(tier, savings, investments) {
        println!("   • {}", suggestion);
    }

    Ok(())
}
