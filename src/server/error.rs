use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::storage::StorageError;
use crate::score::ScoreError;

/// Errors surfaced by the REST handlers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Body was not the expected JSON shape
    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    /// Body parsed but broke a field rule
    #[error(transparent)]
    Validation(#[from] ScoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Blocking storage task panicked or was cancelled
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { message: self.to_string(), field: None },
            ),
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { message: e.to_string(), field: Some(e.field()) },
            ),
            ApiError::Storage(_) | ApiError::Task(_) => {
                log::error!("request failed: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { message: "Internal server error".to_string(), field: None },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
