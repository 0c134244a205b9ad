#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid rank reset config: {0}")]
    InvalidResetConfig(String),

    #[error("Invalid discount range: {0}")]
    InvalidDiscountRange(String),

    #[error("Sale unavailable: {0}")]
    SaleUnavailable(String),

    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
