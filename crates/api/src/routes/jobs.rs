//! Manual job triggering.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harvester_infra::TriggerOutcome;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

/// Start a job off-schedule.
///
/// An unknown name is a 404. A job whose previous run still holds its lock
/// reports 409 instead of overlapping; the trigger is dropped, not queued.
pub async fn trigger(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let outcome = state.scheduler.lock().await.trigger(&name)?;

    let response = match outcome {
        TriggerOutcome::Triggered => {
            (StatusCode::ACCEPTED, Json(json!({ "status": "triggered" }))).into_response()
        }
        TriggerOutcome::Busy => (
            StatusCode::CONFLICT,
            Json(json!({ "error": { "type": "Busy", "message": format!("job {name} is already running") } })),
        )
            .into_response(),
    };
    Ok(response)
}
