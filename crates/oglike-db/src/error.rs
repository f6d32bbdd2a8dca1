//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with context about which operation failed. At the
//! engine boundary they collapse into [`RepositoryError`].

use oglike_fleet::RepositoryError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value cannot be represented in the domain model.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A conditional deduction matched no row.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for RepositoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Postgres(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Self::Conflict(db.to_string())
            }
            DbError::Corrupt(detail) => Self::Corrupt(detail),
            DbError::InsufficientStock(detail) => Self::Deduction(detail),
            other => Self::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduction_failures_keep_their_meaning() {
        let err = RepositoryError::from(DbError::InsufficientStock("metal".to_owned()));
        assert!(matches!(err, RepositoryError::Deduction(d) if d == "metal"));
    }

    #[test]
    fn other_failures_are_backend_errors() {
        let err = RepositoryError::from(DbError::Postgres(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, RepositoryError::Backend(_)));
    }
}
