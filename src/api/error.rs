use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::records::timestamp::InvalidTimestamp;
use crate::store::StoreError;

/// Handler failures, rendered as `{"detail": "..."}` with the matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An update filter matched no document. Carries the resource label.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    InvalidTimestamp(#[from] InvalidTimestamp),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTimestamp(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) | Self::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_reads_like_a_sentence() {
        let err = ApiError::NotFound("Project");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = ApiError::from(StoreError::LockPoisoned);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "db lock poisoned");
    }
}
