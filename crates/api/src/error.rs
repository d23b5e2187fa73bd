use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadwatch_core::error::CoreError;
use leadwatch_core::source::FetchError;
use leadwatch_sync::{PushError, SyncError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and engine errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `leadwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The snapshot source could not be read.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A reconciliation pass failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A push was rejected or failed.
    #[error(transparent)]
    Push(#[from] PushError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Fetch(err) => upstream(err),
            AppError::Sync(SyncError::Fetch(err)) => upstream(err),
            AppError::Sync(err @ SyncError::Persistence { .. }) => {
                tracing::error!(error = %err, "Sync pass failed");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            // Push failures keep the `success` flag and campaign id.
            AppError::Push(err) => return push_error_response(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn push_error_response(err: &PushError) -> Response {
    let (status, code, campaign_id) = match err {
        PushError::Rejected(rejection) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            rejection.code(),
            rejection.campaign_id(),
        ),
        PushError::Delivery { campaign_id, .. } => {
            tracing::warn!(error = %err, "Webhook delivery failed");
            (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", campaign_id.as_str())
        }
        PushError::Persistence { campaign_id, .. } => {
            tracing::error!(error = %err, "Push persistence failed");
            let body = json!({
                "success": false,
                "error": "An internal error occurred",
                "code": "INTERNAL_ERROR",
                "campaign_id": campaign_id,
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        }
    };

    let body = json!({
        "success": false,
        "error": err.to_string(),
        "code": code,
        "campaign_id": campaign_id,
    });
    (status, axum::Json(body)).into_response()
}

fn upstream(err: &FetchError) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, resource = err.resource(), "Snapshot source unavailable");
    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
