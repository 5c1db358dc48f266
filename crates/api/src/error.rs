use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use velo_core::error::CoreError;
use velo_core::rental::LifecycleError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for generic domain errors, [`LifecycleError`] for
/// rental business rejections, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses of the form
/// `{ "error": message, "code": CODE }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `velo_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A deterministic business-rule rejection from the lifecycle engine.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Lock contention persisted past the engine's bounded retries.
    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map request-DTO validation failures to a 400 with field details.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(format!("Validation failed: {errors}"))
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
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Lifecycle rejections: stable codes, no partial mutation ---
            AppError::Lifecycle(lifecycle) => {
                let (status, code) = match lifecycle {
                    LifecycleError::AlreadyRiding => (StatusCode::CONFLICT, "ALREADY_RIDING"),
                    LifecycleError::BicycleUnavailable { .. } => {
                        (StatusCode::CONFLICT, "BICYCLE_UNAVAILABLE")
                    }
                    LifecycleError::RentalNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "RENTAL_NOT_FOUND")
                    }
                    LifecycleError::ReservationNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "RESERVATION_NOT_FOUND")
                    }
                    LifecycleError::ReservationExpired { .. } => {
                        (StatusCode::CONFLICT, "RESERVATION_EXPIRED")
                    }
                    LifecycleError::UnknownDevice { .. } => {
                        (StatusCode::NOT_FOUND, "UNKNOWN_DEVICE")
                    }
                    LifecycleError::InvalidStatus { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_STATUS")
                    }
                };
                (status, code, lifecycle.to_string())
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(reason = %msg, "Request rejected as transiently unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "The service is temporarily unavailable, please retry".to_string(),
                )
            }
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
                        friendly_unique_violation(constraint),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// User-facing messages for the unique constraints a request can plausibly hit.
fn friendly_unique_violation(constraint: &str) -> String {
    match constraint {
        "uq_users_username" => "This username is already taken".to_string(),
        "uq_users_email" => "An account with this email address already exists".to_string(),
        "uq_user_profiles_rfid_tag" => "This RFID tag is already registered".to_string(),
        "uq_bicycles_device_id" => "A bicycle with this device id already exists".to_string(),
        _ => format!("Duplicate value violates unique constraint: {constraint}"),
    }
}
