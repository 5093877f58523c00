use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gerobaks_core::classifier::ClassificationError;
use gerobaks_core::error::CoreError;
use gerobaks_db::StoreError;
use gerobaks_events::{PipelineError, ReadStateError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the pipeline's own failures.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gerobaks_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The submitted event could not be classified.
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// The notification store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Classification(e) => AppError::Classification(e),
            PipelineError::Storage(e) => AppError::Store(e),
        }
    }
}

impl From<ReadStateError> for AppError {
    fn from(err: ReadStateError) -> Self {
        match err {
            ReadStateError::NotFound { id } => AppError::Core(CoreError::NotFound {
                entity: "Notification",
                id,
            }),
            ReadStateError::Storage(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Pipeline errors ---
            AppError::Classification(err) => (
                StatusCode::BAD_REQUEST,
                "CLASSIFICATION_ERROR",
                err.to_string(),
            ),
            AppError::Store(err) => classify_store_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Constraint violations map to 422 with the violated constraint.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Constraint(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "CONSTRAINT_VIOLATION",
            msg.clone(),
        ),
        other => {
            tracing::error!(error = %other, "Store error");
            internal()
        }
    }
}
