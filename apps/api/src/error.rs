use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scope_auditor_core::AppError;

use crate::dto::ErrorResponse;

const INVALID_REQUEST: &str = "invalid_request";
const INTERNAL_ERROR: &str = "internal_error";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self.0 {
            AppError::Remote(remote) => (
                StatusCode::BAD_REQUEST,
                remote.code().to_owned(),
                remote.message().to_owned(),
            ),
            AppError::Validation(message) | AppError::Configuration(message) => {
                (StatusCode::BAD_REQUEST, INVALID_REQUEST.to_owned(), message)
            }
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR.to_owned(),
                message,
            ),
        };

        let payload = Json(ErrorResponse {
            ok: false,
            error,
            message,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
