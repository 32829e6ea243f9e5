/// Unified database error type for all database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// PostgreSQL-specific errors (SeaORM)
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// The operation was given a predicate it cannot execute
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Migration error
    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl DatabaseError {
    /// Whether the error means no row matched the write predicate
    pub fn is_no_match(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseError::Postgres(sea_orm::DbErr::RecordNotUpdated) => true,
            #[cfg(feature = "postgres")]
            DatabaseError::Postgres(sea_orm::DbErr::RecordNotFound(_)) => true,
            _ => false,
        }
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
