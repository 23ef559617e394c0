//! Error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::ops::OpError;

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&OpError> for ErrorResponse {
    fn from(err: &OpError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code(),
        }
    }
}

impl IntoResponse for OpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
