use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DomainError;

/// Maps domain failures onto HTTP statuses with a `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::EmptyStore => StatusCode::CONFLICT,
            DomainError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::ExternalService(_) | DomainError::DimensionMismatch { .. } => {
                StatusCode::BAD_GATEWAY
            }
            DomainError::Configuration(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            tracing::debug!(error = %self.0, "rejected request");
        } else {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
