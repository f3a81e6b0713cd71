use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The business does not exist or has been soft-deleted
    #[error("Business {0} not found")]
    BusinessNotFound(i32),

    /// The business has no financial statement to revise
    #[error("Business {0} has no financial records")]
    NoFinancials(i32),
}

impl ComputeError {
    /// Log and wrap a database error raised inside a multi-step write.
    pub fn from_write(context: &str, err: sea_orm::DbErr) -> Self {
        error!(%err, "{} failed", context);
        ComputeError::Database(err)
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
