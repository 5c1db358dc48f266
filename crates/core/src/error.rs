use crate::types::DbId;

/// Domain-level error taxonomy shared by every layer above this crate.
///
/// HTTP mapping happens in `velo-api`; repositories and the lifecycle
/// engine only ever produce these (or [`crate::rental::LifecycleError`]
/// for rental business rejections).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
