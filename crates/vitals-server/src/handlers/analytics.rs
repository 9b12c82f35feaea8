//! Analytics handlers: health report, anomalies, expense forecast
//!
//! Every analysis runs over the user's full stored history at request time.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use super::users::require_user;
use crate::{get_actor, AppError, AppState};
use vitals_core::{forecast_expenses, AnomalyRecord, ExpenseForecast, FinancialHealth};

/// Body returned when a user has no snapshots yet
pub const NO_DATA_MESSAGE: &str = "No financial data available";

/// GET /api/users/:id/health - Ratios and predicted savings rate for the latest snapshot
pub async fn get_health(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    request: Request,
) -> Result<Json<Value>, AppError> {
    let actor = get_actor(request.headers());
    require_user(&state, user_id)?;

    let history = state.db.get_history(user_id)?;
    let health = FinancialHealth::assess(&history, &state.predictor);

    state.db.log_audit(
        &actor,
        "view",
        Some("health"),
        Some(user_id),
        Some(&format!("snapshots={}", history.len())),
    )?;

    match health {
        Some(health) => Ok(Json(serde_json::to_value(health)?)),
        None => Ok(Json(json!({ "error": NO_DATA_MESSAGE }))),
    }
}

/// GET /api/users/:id/anomalies - Snapshots that stand out from the history
pub async fn get_anomalies(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    request: Request,
) -> Result<Json<Vec<AnomalyRecord>>, AppError> {
    let actor = get_actor(request.headers());
    require_user(&state, user_id)?;

    let history = state.db.get_history(user_id)?;
    let anomalies = state.anomaly.detect(&history);
    debug!(user_id, anomalies = anomalies.len(), "Anomaly request");

    state.db.log_audit(
        &actor,
        "view",
        Some("anomalies"),
        Some(user_id),
        Some(&format!("count={}", anomalies.len())),
    )?;

    Ok(Json(anomalies))
}

/// GET /api/users/:id/forecast - Linear-trend expense projection (null without data)
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    request: Request,
) -> Result<Json<Option<ExpenseForecast>>, AppError> {
    let actor = get_actor(request.headers());
    require_user(&state, user_id)?;

    let history = state.db.get_history(user_id)?;
    let forecast = forecast_expenses(&history);

    state
        .db
        .log_audit(&actor, "view", Some("forecast"), Some(user_id), None)?;

    Ok(Json(forecast))
}
