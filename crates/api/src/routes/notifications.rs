//! Notification channel handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use harvester_domain::NotificationChannel;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TestQuery {
    pub channel: String,
}

/// Current channel mapping; keys come back masked.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<NotificationChannel>>> {
    Ok(Json(state.dispatcher.channels().await?))
}

pub async fn update(
    State(state): State<AppState>,
    Json(channels): Json<Vec<NotificationChannel>>,
) -> ApiResult<StatusCode> {
    state.dispatcher.update_channels(channels).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn test(
    State(state): State<AppState>,
    Query(query): Query<TestQuery>,
) -> ApiResult<StatusCode> {
    state.dispatcher.test(&query.channel).await?;
    Ok(StatusCode::NO_CONTENT)
}
