//! Snapshot handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};

use super::users::require_user;
use crate::{get_actor, parse_json_body, AppError, AppState};
use vitals_core::{NewSnapshot, Snapshot};

/// GET /api/users/:id/snapshots - A user's history, oldest first
pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    request: Request,
) -> Result<Json<Vec<Snapshot>>, AppError> {
    let actor = get_actor(request.headers());
    require_user(&state, user_id)?;

    let history = state.db.get_history(user_id)?;

    state.db.log_audit(
        &actor,
        "list",
        Some("snapshot"),
        Some(user_id),
        Some(&format!("count={}", history.len())),
    )?;

    Ok(Json(history))
}

/// POST /api/users/:id/snapshots - Record a snapshot
pub async fn add_snapshot(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    request: Request,
) -> Result<(StatusCode, Json<Snapshot>), AppError> {
    let actor = get_actor(request.headers());
    let new: NewSnapshot = parse_json_body(request.into_body()).await?;
    require_user(&state, user_id)?;

    let snapshot = state.db.insert_snapshot(user_id, &new)?;

    state.db.log_audit(
        &actor,
        "create",
        Some("snapshot"),
        Some(snapshot.id),
        Some(&format!("user_id={}", user_id)),
    )?;

    Ok((StatusCode::CREATED, Json(snapshot)))
}
