//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the harvester
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HarvesterError {
    /// Rejected input: bad CAPTCHA, wrong/expired OTP, malformed channel
    /// configuration. Surfaced synchronously to the caller, never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any remote rewards-API failure: transport error, non-2xx status,
    /// malformed payload or deadline/cancellation. Aborts the current cycle.
    #[error("External API call failed: {0}")]
    ExternalApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Invariant violation, treated as a defect and surfaced loudly.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvesterError>;
