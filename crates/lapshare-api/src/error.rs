//! HTTP mapping of Lapshare errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use lapshare_common::LapshareError;
use serde_json::json;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError(pub LapshareError);

impl From<LapshareError> for ApiError {
    fn from(err: LapshareError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LapshareError::Validation(_) | LapshareError::Policy(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LapshareError::Lifecycle(_) => StatusCode::CONFLICT,
            LapshareError::NotFound { .. } => StatusCode::NOT_FOUND,
            err if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            LapshareError::Backend { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        });
        (status, Json(body)).into_response()
    }
}
