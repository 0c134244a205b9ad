use arena_core::error::CoreError;

/// Error returned by every engine operation.
///
/// Wraps [`CoreError`] for domain failures and passes store errors through.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `arena_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            EngineError::Core(core) => Some(core),
            EngineError::Database(_) => None,
        }
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// Name of the violated `uq_*` constraint, if `err` is a unique violation.
///
/// PostgreSQL reports these as SQLSTATE 23505.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            db_err.constraint().filter(|c| c.starts_with("uq_"))
        }
        _ => None,
    }
}

/// Turn a unique violation into the domain error built by `on_conflict`;
/// pass every other store error through.
pub fn map_unique_violation(
    err: sqlx::Error,
    on_conflict: impl FnOnce(&str) -> CoreError,
) -> EngineError {
    match unique_violation(&err) {
        Some(constraint) => EngineError::Core(on_conflict(constraint)),
        None => EngineError::Database(err),
    }
}
