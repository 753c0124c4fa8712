//! Route definitions.

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

mod auth;
mod health;
mod jobs;
mod notifications;

/// Build the application router over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/captcha", get(auth::captcha))
        .route("/api/sms", post(auth::request_sms))
        .route("/api/login/verify", post(auth::verify))
        .route("/api/login/refresh", post(auth::refresh))
        .route("/api/login", get(auth::login_info).delete(auth::logout))
        .route("/api/notifications", get(notifications::list).put(notifications::update))
        .route("/api/notifications/test", post(notifications::test))
        .route("/api/jobs/{name}/trigger", post(jobs::trigger))
        .route("/api/health", get(health::health))
        .with_state(state)
}
