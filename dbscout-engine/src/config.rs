//! Engine Configuration
//!
//! Read once from the environment at bootstrap and never re-read. Only the
//! connection string is required; everything else has development-friendly
//! defaults.

use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Default maximum pool size (the pool is deliberately small).
pub const DEFAULT_POOL_MAX: usize = 5;

/// Default timeout for normal queries.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Short timeout for liveness checks.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL connection string (DSN).
    pub database_url: String,
    /// Target schema for all catalog introspection.
    pub schema: String,
    /// Maximum pool size.
    pub pool_max: usize,
    /// Timeout applied to every normal query.
    pub query_timeout: Duration,
    /// Timeout applied to health checks.
    pub health_timeout: Duration,
}

impl EngineConfig {
    /// Build a config from a connection string with default settings.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            schema: "public".to_string(),
            pool_max: DEFAULT_POOL_MAX,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DBSCOUT_SCHEMA` (default: "public")
    /// - `DBSCOUT_POOL_MAX` (default: 5)
    /// - `DBSCOUT_QUERY_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> EngineResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| EngineError::Config("DATABASE_URL is not set".to_string()))?;

        let schema =
            std::env::var("DBSCOUT_SCHEMA").unwrap_or_else(|_| "public".to_string());

        let pool_max = std::env::var("DBSCOUT_POOL_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POOL_MAX);

        let query_timeout = std::env::var("DBSCOUT_QUERY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT);

        Ok(Self {
            database_url,
            schema,
            pool_max,
            query_timeout,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        })
    }

    /// Override the target schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}
