use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{
    dao::{seed::SeedError, storage::StorageError},
    state::{EngineError, RoomBusy},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// The staff member's department may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The room status engine refused the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The update sink refused the payload of a room; the change was not saved.
    #[error("failed to save room {room_no}")]
    SinkFailure {
        /// Room whose payload was refused.
        room_no: String,
        /// Sink error.
        #[source]
        source: StorageError,
    },
    /// The room list source could not be read or parsed.
    #[error("room list source unusable")]
    SeedSource(#[source] SeedError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<SeedError> for ServiceError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::Storage(source) => ServiceError::Unavailable(source),
            other => ServiceError::SeedSource(other),
        }
    }
}

impl From<RoomBusy> for ServiceError {
    fn from(err: RoomBusy) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The storage backend refused a write.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::Engine(engine @ EngineError::InvalidTransition { .. }) => {
                AppError::Conflict(engine.to_string())
            }
            ServiceError::Engine(engine) => AppError::BadRequest(engine.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::SinkFailure { room_no, source } => {
                AppError::BadGateway(format!("room {room_no} was not saved: {source}"))
            }
            ServiceError::SeedSource(source) => {
                AppError::BadGateway(format!("room list source unusable: {source}"))
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::status::BaseStatus;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn service_errors_map_to_http_statuses() {
        let invalid = EngineError::InvalidTransition {
            from: BaseStatus::Od,
            to: BaseStatus::Vc,
        };
        assert_eq!(status_of(invalid.into()), StatusCode::CONFLICT);
        assert_eq!(
            status_of(EngineError::UnknownStatus("xx".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::SinkFailure {
                room_no: "101".into(),
                source: StorageError::rejected("gone"),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(ServiceError::Degraded), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(ServiceError::Forbidden("HK".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::NotFound("room 999".into())),
            StatusCode::NOT_FOUND
        );
    }
}
