//! Health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use harvester_domain::HarvesterError;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Liveness plus a database round-trip.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let db = Arc::clone(&state.db);
    tokio::task::spawn_blocking(move || db.health_check())
        .await
        .map_err(|err| HarvesterError::Internal(format!("health check task failed: {err}")))??;

    Ok(Json(json!({ "status": "ok", "database": "ok" })))
}
