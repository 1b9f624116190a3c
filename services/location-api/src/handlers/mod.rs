//! HTTP request handlers for the location API.

pub mod forecast;
pub mod health;
pub mod rainfall;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jmatile_common::LocationError;
use serde::Serialize;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// A lookup error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub LocationError);

impl From<LocationError> for ApiError {
    fn from(err: LocationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.0.error_code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
