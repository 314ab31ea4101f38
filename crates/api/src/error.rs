//! API error types with HTTP response mapping.

use std::collections::BTreeMap;

use application::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be parsed.
    InvalidRequest(String),
    /// A path parameter was not a valid identifier.
    InvalidId { param: &'static str, value: String },
    /// The request body parsed but failed field checks.
    Validation(BTreeMap<String, String>),
    /// A use case failed.
    Service(ServiceError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, String>>,
}

impl ApiError {
    fn parts(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::InvalidRequest(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "INVALID_REQUEST",
                    message: format!("Invalid request body format: {reason}"),
                    details: None,
                },
            ),
            ApiError::InvalidId { param, value } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "INVALID_ID",
                    message: format!("Invalid {param}: {value:?}"),
                    details: None,
                },
            ),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "VALIDATION_ERROR",
                    message: "Request validation failed".to_string(),
                    details: Some(details),
                },
            ),
            ApiError::Service(err) => service_error_parts(err),
        }
    }
}

fn service_error_parts(err: ServiceError) -> (StatusCode, ErrorBody) {
    let code = err.code();
    match &err {
        ServiceError::Order(order_err) => {
            let details = order_err
                .field()
                .map(|field| BTreeMap::from([(field.to_string(), order_err.to_string())]));
            (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: code,
                    message: order_err.to_string(),
                    details,
                },
            )
        }
        ServiceError::OrderNotFound(_) => (
            StatusCode::NOT_FOUND,
            ErrorBody {
                error: code,
                message: err.to_string(),
                details: None,
            },
        ),
        ServiceError::Conflict(_) => (
            StatusCode::CONFLICT,
            ErrorBody {
                error: code,
                message: err.to_string(),
                details: None,
            },
        ),
        ServiceError::Store { .. } => {
            tracing::error!(error = %err, code, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: code,
                    message: "An internal error occurred".to_string(),
                    details: None,
                },
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
