//! Savings model handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use crate::{get_actor, AppError, AppState};
use vitals_core::ModelSummary;

/// GET /api/model - Summary of the loaded savings model
pub async fn model_status(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ModelSummary>, AppError> {
    let actor = get_actor(request.headers());

    state
        .db
        .log_audit(&actor, "view", Some("model"), None, None)?;

    Ok(Json(state.predictor.summary()))
}
