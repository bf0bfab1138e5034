use crate::board::{ServiceError, StoreError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

/// Process-level failures raised while booting or running the service binary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Board(ServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Board(err) => write!(f, "job board error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Board(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Board(ServiceError::Intake(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Board(ServiceError::Store(StoreError::NotFound { .. }))
            | AppError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Board(ServiceError::Store(StoreError::ConstraintViolation(_)))
            | AppError::Store(StoreError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Store(StoreError::Unavailable(_))
            | AppError::Board(ServiceError::Store(StoreError::Unavailable(_)))
            | AppError::Board(ServiceError::Password(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Board(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::IntakeError;

    #[test]
    fn board_errors_map_to_client_statuses() {
        let missing: AppError = ServiceError::Intake(IntakeError::MissingField("title")).into();
        assert_eq!(
            missing.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let conflict: AppError =
            ServiceError::Store(StoreError::ConstraintViolation(crate::board::UNIQUE_EMAIL)).into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn store_outage_is_internal_and_hides_detail() {
        let err: AppError = StoreError::Unavailable("disk full".to_string()).into();
        assert_eq!(
            err.to_string(),
            "storage error: record store unavailable: disk full"
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload, json!({ "error": "internal server error" }));
    }
}
