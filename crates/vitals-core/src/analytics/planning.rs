//! Goal planning and rule-based investment suggestions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Savings below this trigger a warning before high-risk suggestions
pub const MIN_SAVINGS_BUFFER: f64 = 1000.0;

/// Investments below this trigger a diversification warning
pub const MIN_DIVERSIFIED_INVESTMENTS: f64 = 5000.0;

/// Monthly contribution needed to reach `target_amount` in `years`
///
/// The result is negative when current savings already exceed the target.
pub fn plan_goal(target_amount: f64, current_savings: f64, years: i64) -> Result<f64> {
    if years <= 0 {
        return Err(Error::InvalidInput(format!(
            "years must be positive (got {})",
            years
        )));
    }
    if !target_amount.is_finite() || !current_savings.is_finite() {
        return Err(Error::InvalidInput(
            "target_amount and current_savings must be finite numbers".into(),
        ));
    }

    Ok((target_amount - current_savings) / (years as f64 * 12.0))
}

/// Investor risk appetite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    High,
    Medium,
    Low,
    /// Any unrecognized tier
    Other,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::High => "high",
            RiskTolerance::Medium => "medium",
            RiskTolerance::Low => "low",
            RiskTolerance::Other => "other",
        }
    }

    /// Base suggestions for this tier
    pub fn base_suggestions(&self) -> &'static [&'static str] {
        match self {
            RiskTolerance::High => &["Stocks", "Cryptocurrency", "High Yield Bonds"],
            RiskTolerance::Medium => &["Mutual Funds", "Index Funds", "Real Estate"],
            RiskTolerance::Low => &["Bonds", "Fixed Deposits", "Treasury Bills"],
            RiskTolerance::Other => &["Savings Account", "Fixed Deposits"],
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "high" => RiskTolerance::High,
            "medium" => RiskTolerance::Medium,
            "low" => RiskTolerance::Low,
            _ => RiskTolerance::Other,
        })
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered investment suggestions: the tier's base list, then warnings
pub fn advise(risk_tolerance: RiskTolerance, current_savings: f64, investments: f64) -> Vec<String> {
    let mut suggestions: Vec<String> = risk_tolerance
        .base_suggestions()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if current_savings < MIN_SAVINGS_BUFFER {
        suggestions.push("Increase savings before high-risk investments".to_string());
    }
    if investments < MIN_DIVERSIFIED_INVESTMENTS {
        suggestions.push("Consider diversifying investments".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(s: &str) -> RiskTolerance {
        s.parse().unwrap()
    }

    #[test]
    fn test_plan_goal() {
        let monthly = plan_goal(12000.0, 2000.0, 5).unwrap();
        assert!((monthly - 166.666_666_666_666_66).abs() < 1e-9);
    }

    #[test]
    fn test_plan_goal_already_reached_is_negative() {
        assert_eq!(plan_goal(1000.0, 2200.0, 1).unwrap(), -100.0);
    }

    #[test]
    fn test_plan_goal_rejects_non_positive_years() {
        assert!(matches!(plan_goal(12000.0, 2000.0, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(plan_goal(12000.0, 2000.0, -3), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_plan_goal_rejects_non_finite_amounts() {
        assert!(plan_goal(f64::INFINITY, 0.0, 2).is_err());
    }

    #[test]
    fn test_risk_tolerance_parsing() {
        assert_eq!(tier("high"), RiskTolerance::High);
        assert_eq!(tier("  Medium "), RiskTolerance::Medium);
        assert_eq!(tier("LOW"), RiskTolerance::Low);
        assert_eq!(tier("unknown"), RiskTolerance::Other);
        assert_eq!(tier(""), RiskTolerance::Other);
    }

    #[test]
    fn test_advise_high_with_both_warnings() {
        assert_eq!(
            advise(tier("high"), 500.0, 2000.0),
            vec![
                "Stocks",
                "Cryptocurrency",
                "High Yield Bonds",
                "Increase savings before high-risk investments",
                "Consider diversifying investments",
            ]
        );
    }

    #[test]
    fn test_advise_unknown_without_warnings() {
        assert_eq!(
            advise(tier("unknown"), 5000.0, 10000.0),
            vec!["Savings Account", "Fixed Deposits"]
        );
    }

    #[test]
    fn test_advise_warnings_are_independent() {
        assert_eq!(
            advise(RiskTolerance::Low, 5000.0, 100.0),
            vec!["Bonds", "Fixed Deposits", "Treasury Bills", "Consider diversifying investments"]
        );
        assert_eq!(
            advise(RiskTolerance::Medium, 999.99, 5000.0),
            vec![
                "Mutual Funds",
                "Index Funds",
                "Real Estate",
                "Increase savings before high-risk investments",
            ]
        );
    }
}
