//! User management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_actor, parse_json_body, AppError, AppState};
use vitals_core::User;

/// Request body for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// Look up a user or fail with 404
pub(crate) fn require_user(state: &AppState, id: i64) -> Result<User, AppError> {
    state
        .db
        .get_user(id)?
        .ok_or_else(|| AppError::not_found(&format!("User {} not found", id)))
}

/// GET /api/users - List all users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<User>>, AppError> {
    let actor = get_actor(request.headers());

    let users = state.db.list_users()?;

    // Audit log - read access
    state.db.log_audit(
        &actor,
        "list",
        Some("user"),
        None,
        Some(&format!("count={}", users.len())),
    )?;

    Ok(Json(users))
}

/// POST /api/users - Create a user (or return the existing one)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<User>, AppError> {
    let actor = get_actor(request.headers());
    let req: CreateUserRequest = parse_json_body(request.into_body()).await?;

    let user = state.db.get_or_create_user(&req.username)?;

    state.db.log_audit(
        &actor,
        "create",
        Some("user"),
        Some(user.id),
        Some(&format!("username={}", user.username)),
    )?;

    Ok(Json(user))
}

/// GET /api/users/:id - Get a single user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<User>, AppError> {
    let actor = get_actor(request.headers());

    let user = require_user(&state, id)?;

    state
        .db
        .log_audit(&actor, "view", Some("user"), Some(id), None)?;

    Ok(Json(user))
}
