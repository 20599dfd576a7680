//! Boundary error adapter
//!
//! The only place where crate errors become HTTP responses. Internal
//! details are logged and never sent to the client.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use crate::Error;

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Validation(String),
    TooManyRequests { retry_after_secs: u64 },
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ItemNotFound(_) => ApiError::NotFound,
            Error::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::NotFound => (
                status,
                Json(json!({ "success": false, "error": "Item not found" })),
            )
                .into_response(),
            ApiError::Validation(details) => (
                status,
                Json(json!({ "error": "Validation error", "details": details })),
            )
                .into_response(),
            ApiError::TooManyRequests { retry_after_secs } => {
                let mut response = (
                    status,
                    Json(json!({ "error": "Too many requests, please try again later." })),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                (status, Json(json!({ "error": "Something went wrong!" }))).into_response()
            }
        }
    }
}
