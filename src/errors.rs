use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorBody;

/// Every failure the service reports to callers, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Connectivity(String),
    #[error("{0}")]
    ModelConfiguration(String),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::ModelConfiguration(_) => StatusCode::BAD_REQUEST,
            AppError::Connectivity(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Backend { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Connectivity(_) => "connectivity",
            AppError::ModelConfiguration(_) => "model_configuration",
            AppError::Backend { .. } => "backend",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(payload)).into_response()
    }
}
