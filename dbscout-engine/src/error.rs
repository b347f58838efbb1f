//! Error Types for the dbscout Engine
//!
//! Validation failures are recovered locally (empty results or
//! [`StatementRejected`] text); this module covers infrastructure
//! failures. Detail is logged at the conversion site and a generic variant
//! is surfaced, so no internal database state leaks to the user.

use dbscout_core::StatementRejected;
use thiserror::Error;

/// Engine-level failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A raw statement failed validation. Carries the user-facing rule text.
    #[error(transparent)]
    Rejected(#[from] StatementRejected),

    /// A database operation failed. Detail was logged; the message is
    /// intentionally generic.
    #[error("database operation failed")]
    Database,

    /// The connection pool is exhausted.
    #[error("database connection pool exhausted")]
    PoolExhausted,

    /// The pool has been closed.
    #[error("database connection pool is closed")]
    PoolClosed,

    /// An operation exceeded its timeout. Not retried; surfaced as-is.
    #[error("operation '{0}' timed out")]
    Timeout(&'static str),

    /// Bad or missing configuration at bootstrap.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// True for failures the host should present as "temporarily
    /// unavailable" rather than as user input errors.
    pub fn is_infrastructure(&self) -> bool {
        !matches!(self, EngineError::Rejected(_) | EngineError::Config(_))
    }
}

impl From<tokio_postgres::Error> for EngineError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Full detail stays in the log; the caller sees a generic failure.
        tracing::error!(error = %err, "database error");
        EngineError::Database
    }
}

impl From<deadpool_postgres::PoolError> for EngineError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!(error = %err, "connection pool error");
        match err {
            deadpool_postgres::PoolError::Timeout(_) => EngineError::PoolExhausted,
            deadpool_postgres::PoolError::Closed => EngineError::PoolClosed,
            _ => EngineError::Database,
        }
    }
}

/// Result type used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_statements_are_not_infrastructure_failures() {
        let err = EngineError::Rejected(StatementRejected::Semicolon);
        assert!(!err.is_infrastructure());
        assert_eq!(err.to_string(), "Semicolons are not allowed.");
    }

    #[test]
    fn database_failures_are_generic() {
        assert_eq!(EngineError::Database.to_string(), "database operation failed");
        assert!(EngineError::Database.is_infrastructure());
        assert!(EngineError::Timeout("row_count").is_infrastructure());
    }
}
