use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned by the JSON endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Errors that map onto an HTTP status and an optional machine-readable code
pub trait HttpError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    /// e.g. "CITY_NOT_FOUND"
    fn error_code(&self) -> Option<&'static str> {
        None
    }
}

/// Convert any HttpError into a JSON error response
pub fn into_response<E: HttpError>(err: E) -> Response {
    let status = err.status_code();
    let code = err.error_code();
    let message = err.to_string();

    // Client mistakes are expected traffic; upstream failures are not
    if status.is_client_error() {
        tracing::warn!(error = %message, status = %status, code = ?code, "Request rejected");
    } else {
        tracing::error!(error = %message, status = %status, code = ?code, "Request failed");
    }

    let body = match code {
        Some(code) => ErrorResponse::with_code(message, code),
        None => ErrorResponse::new(message),
    };

    (status, Json(body)).into_response()
}

/// Implement IntoResponse for an HttpError type
#[macro_export]
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                $crate::error::into_response(self)
            }
        }
    };
}
