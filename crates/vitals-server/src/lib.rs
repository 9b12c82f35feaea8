//! Vitals Web Server
//!
//! Axum-based REST API over the Vitals analytics engine.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Input validation (snapshot amounts, pagination limits, body size limits)
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use vitals_core::{AnalyticsConfig, AnomalyDetector, Database, SavingsPredictor};

mod handlers;

/// Maximum JSON request body size (16 KB)
pub const MAX_BODY_SIZE: usize = 16 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header naming the caller for audit logging
const ACTOR_HEADER: &str = "x-vitals-actor";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Trained once before the router is built
    pub predictor: Arc<SavingsPredictor>,
    pub anomaly: AnomalyDetector,
}

/// Identify the caller for audit logging
/// Returns the `X-Vitals-Actor` header value, or "local-dev" when absent
pub fn get_actor(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "local-dev".to_string())
}

/// Read and parse a JSON request body
pub(crate) async fn parse_json_body<T: DeserializeOwned>(body: Body) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Create the application router
pub fn create_router(
    db: Database,
    predictor: Arc<SavingsPredictor>,
    analytics: &AnalyticsConfig,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        db,
        predictor,
        anomaly: AnomalyDetector::new(analytics.anomaly.clone()),
    });

    let api_routes = Router::new()
        // Users and their snapshot histories
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/:id", get(handlers::get_user))
        .route(
            "/users/:id/snapshots",
            get(handlers::list_snapshots).post(handlers::add_snapshot),
        )
        // Analytics over a user's history
        .route("/users/:id/health", get(handlers::get_health))
        .route("/users/:id/anomalies", get(handlers::get_anomalies))
        .route("/users/:id/forecast", get(handlers::get_forecast))
        // Stateless planning calculators
        .route("/planning/goal", post(handlers::plan_goal))
        .route("/planning/advice", post(handlers::advise))
        // Model and audit
        .route("/model", get(handlers::model_status))
        .route("/audit", get(handlers::list_audit_log));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
///
/// The savings model is loaded or trained before the listener binds, so no
/// request ever waits on training.
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    analytics: AnalyticsConfig,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let predictor_config = analytics.predictor.clone();
    let predictor =
        tokio::task::spawn_blocking(move || SavingsPredictor::shared(&predictor_config)).await??;

    let summary = predictor.summary();
    info!(
        trees = summary.trees,
        test_r2 = ?summary.test_r2,
        "Savings model ready"
    );

    let app = create_router(db, predictor, &analytics, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message; everything else is sanitized
        match err.downcast_ref::<vitals_core::Error>() {
            Some(vitals_core::Error::InvalidInput(msg)) => return Self::bad_request(msg),
            Some(vitals_core::Error::NotFound(what)) => {
                return Self::not_found(&format!("Not found: {}", what))
            }
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
