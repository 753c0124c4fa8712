//! Conversions from external infrastructure errors into domain errors.

use harvester_domain::HarvesterError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HarvesterError);

impl From<InfraError> for HarvesterError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HarvesterError> for InfraError {
    fn from(value: HarvesterError) -> Self {
        InfraError(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(err: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;

        let mapped = match err {
            SqlError::SqliteFailure(code, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match code.code {
                    ErrorCode::DatabaseBusy => {
                        HarvesterError::Database("database is busy".into())
                    }
                    ErrorCode::DatabaseLocked => {
                        HarvesterError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        HarvesterError::Database(format!("constraint violation: {message}"))
                    }
                    _ => HarvesterError::Database(format!(
                        "sqlite failure {:?} (code {}): {message}",
                        code.code, code.extended_code
                    )),
                }
            }
            SqlError::QueryReturnedNoRows => {
                HarvesterError::NotFound("no rows returned by query".into())
            }
            SqlError::FromSqlConversionFailure(_, _, cause) => {
                HarvesterError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            SqlError::InvalidColumnType(_, _, ty) => {
                HarvesterError::Database(format!("invalid column type: {ty}"))
            }
            other => HarvesterError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        InfraError(HarvesterError::Database(format!("connection pool error: {err}")))
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let mapped = if err.is_timeout() {
            HarvesterError::ExternalApi(format!("request deadline exceeded: {err}"))
        } else if err.is_decode() {
            HarvesterError::ExternalApi(format!("malformed response payload: {err}"))
        } else {
            HarvesterError::ExternalApi(err.to_string())
        };
        InfraError(mapped)
    }
}
