use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use timebooth_core::error::BoothError;
use timebooth_fal::client::FalError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`BoothError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent
/// `{ "error": ..., "code": ... }` JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the pipeline taxonomy.
    #[error(transparent)]
    Booth(#[from] BoothError),

    /// A generative-service failure outside the edit operations
    /// (storage upload, result download).
    #[error("Service error: {0}")]
    Service(#[from] FalError),

    /// Malformed multipart payload.
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Booth(booth) => match booth {
                BoothError::UploadFailed(msg) => {
                    (StatusCode::BAD_REQUEST, "UPLOAD_FAILED", msg.clone())
                }
                BoothError::EditFailed { detail, .. } => {
                    tracing::error!(error = %booth, detail = ?detail, "Edit failed");
                    (StatusCode::BAD_GATEWAY, "EDIT_FAILED", booth.to_string())
                }
                BoothError::CompositionFailed(msg) => {
                    tracing::error!(error = %msg, "Composition failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "COMPOSITION_FAILED",
                        msg.clone(),
                    )
                }
                // Background-only errors are logged where they happen
                // and never reach a handler; treat a stray one as a
                // plain internal error.
                BoothError::ChainAborted { .. } | BoothError::RenderFailed(_) => {
                    tracing::error!(error = %booth, "Background error surfaced to a handler");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Service(err) => {
                tracing::error!(error = %err, "Generative service error");
                (StatusCode::BAD_GATEWAY, "SERVICE_ERROR", err.to_string())
            }

            AppError::Multipart(err) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
