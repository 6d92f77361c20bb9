use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::cv::ingest::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// The parse pipeline failed after the upload was accepted.
    #[error("Failed to parse CV {cv_id}: {source}")]
    Parse {
        cv_id: Uuid,
        #[source]
        source: PipelineError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": msg
                    }
                })),
            )
                .into_response(),
            AppError::Parse { cv_id, source } => {
                tracing::error!(%cv_id, "CV parse failed: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "cv_id": cv_id,
                        "status": "error",
                        "error": source.to_string(),
                        "traceback": error_chain(source),
                    })),
                )
                    .into_response()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": "error",
                        "error": {
                            "code": "INTERNAL_ERROR",
                            "message": "An internal server error occurred"
                        }
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// The error and each of its sources, outermost first.
fn error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    std::iter::successors(Some(err), |&e| e.source())
        .map(ToString::to_string)
        .collect()
}
