//! HTTP error bodies.
//!
//! Domain failures answer 400 and request-shape failures answer 422, both as
//! `{"detail": "..."}`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct Detail {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::info!(kind = self.kind(), error = %self, "request failed");
        (StatusCode::BAD_REQUEST, Json(Detail { detail: self.to_string() })).into_response()
    }
}

/// Error type returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    Domain(AppError),
    Unprocessable(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(err) => err.into_response(),
            ApiError::Unprocessable(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(Detail { detail })).into_response()
            }
        }
    }
}
