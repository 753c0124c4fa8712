//! Error translation for HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harvester_domain::HarvesterError;
use serde_json::json;
use tracing::{error, warn};

/// Wrapper giving [`HarvesterError`] an HTTP rendering.
#[derive(Debug)]
pub struct ApiError(pub HarvesterError);

/// Result alias for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<HarvesterError> for ApiError {
    fn from(err: HarvesterError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            HarvesterError::Validation(_) => StatusCode::BAD_REQUEST,
            HarvesterError::NotFound(_) => StatusCode::NOT_FOUND,
            HarvesterError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            HarvesterError::Database(_)
            | HarvesterError::Config(_)
            | HarvesterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        } else {
            warn!(error = ?self.0, "request rejected");
        }

        (status, Json(json!({ "error": self.0 }))).into_response()
    }
}
