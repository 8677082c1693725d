//! HTTP boundary: request gate, liveness probe, and run-status queries.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::locks::TaskLocks;
use crate::pipeline;
use crate::status::{RunRecord, RunRegistry};
use crate::task::TaskRequest;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Immutable process configuration.
    pub config: Arc<Config>,
    /// Port bundle used by pipeline runs.
    pub ctx: Arc<ServiceContext>,
    /// Registry of observed runs.
    pub registry: Arc<RunRegistry>,
    /// Per-task run locks.
    pub locks: Arc<TaskLocks>,
}

/// Builds the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/handle-task", post(handle_task))
        .route("/status/{task}/{round}", get(run_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the process exits.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(
    addr: &str,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pagewright listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({"Hello": "World"}))
}

/// The request gate: authenticate, acknowledge, and schedule the run.
///
/// The acknowledgement is sent before the pipeline produces any result;
/// callers learn the actual outcome from the evaluation callback or the
/// status endpoint.
async fn handle_task(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if request.secret != state.config.secret {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid secret"})),
        ));
    }
    if request.brief.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "brief must not be empty"})),
        ));
    }

    tokio::spawn(pipeline::run(
        Arc::clone(&state.ctx),
        Arc::clone(&state.registry),
        Arc::clone(&state.locks),
        request,
    ));

    Ok(Json(json!({
        "status": "success",
        "message": "Secret validated, task accepted for processing."
    })))
}

async fn run_status(
    State(state): State<AppState>,
    Path((task, round)): Path<(String, u8)>,
) -> Result<Json<RunRecord>, StatusCode> {
    state.registry.get(&task, round).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}
