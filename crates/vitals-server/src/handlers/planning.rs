//! Planning calculator handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{get_actor, parse_json_body, AppError, AppState};
use vitals_core::RiskTolerance;

/// Request body for goal planning
#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub target_amount: f64,
    pub current_savings: f64,
    pub years: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalResponse {
    pub monthly_required: f64,
}

/// Request body for investment advice
#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub risk_tolerance: String,
    pub current_savings: f64,
    pub investments: f64,
}

/// POST /api/planning/goal - Monthly savings needed to reach a target
pub async fn plan_goal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<GoalResponse>, AppError> {
    let actor = get_actor(request.headers());
    let req: GoalRequest = parse_json_body(request.into_body()).await?;

    let monthly_required = vitals_core::plan_goal(req.target_amount, req.current_savings, req.years)?;

    state.db.log_audit(
        &actor,
        "calculate",
        Some("goal_plan"),
        None,
        Some(&format!("years={}", req.years)),
    )?;

    Ok(Json(GoalResponse { monthly_required }))
}

/// POST /api/planning/advice - Risk-tiered investment suggestions, warnings last
pub async fn advise(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<String>>, AppError> {
    let actor = get_actor(request.headers());
    let req: AdviceRequest = parse_json_body(request.into_body()).await?;

    // Unknown tiers fall back to the conservative suggestions
    let tier: RiskTolerance = req.risk_tolerance.parse().unwrap_or(RiskTolerance::Other);
    let suggestions = vitals_core::advise(tier, req.current_savings, req.investments);

    state.db.log_audit(
        &actor,
        "calculate",
        Some("advice"),
        None,
        Some(&format!("risk_tolerance={}", tier)),
    )?;

    Ok(Json(suggestions))
}
