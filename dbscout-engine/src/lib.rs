//! DBSCOUT Engine - Schema Introspection and Safe Query Execution
//!
//! The PostgreSQL-backed half of dbscout: a bounded connection pool,
//! catalog introspection, health-domain resolution, generic table
//! browsing, a read-only raw-SQL executor, and per-user guided query
//! sessions. The conversational transport, authorization, rate limiting,
//! and rendering live in the host process and call into this crate.
//!
//! Validation and state-machine logic come from `dbscout-core`; nothing in
//! the host needs to touch SQL text directly.

pub mod browse;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domains;
pub mod error;
pub mod resolve;
mod rows;
pub mod session;

// Re-export commonly used types
pub use browse::{QueryBrowser, BROWSE_PAGE_SIZE};
pub use catalog::SchemaCatalog;
pub use config::EngineConfig;
pub use db::DbClient;
pub use domains::{DomainQueries, RangeSummary};
pub use error::{EngineError, EngineResult};
pub use resolve::{resolve_all, DomainMap};
pub use session::{SessionManager, SessionReply, RAW_SQL_MAX_ROWS};

use std::sync::Arc;

/// The assembled engine: one pool, one immutable domain map, shared query
/// surfaces, and the per-user session store.
#[derive(Debug)]
pub struct Engine {
    pub db: DbClient,
    pub catalog: SchemaCatalog,
    pub browser: QueryBrowser,
    pub domains: DomainQueries,
    pub sessions: SessionManager,
}

impl Engine {
    /// Bootstrap the engine: build the pool, then resolve all domains
    /// concurrently. A domain that fails to resolve is merely unavailable;
    /// bootstrap itself only fails on bad configuration.
    pub async fn bootstrap(config: &EngineConfig) -> EngineResult<Self> {
        // Data queries interpolate the schema name into SQL text, so it
        // passes the identifier gate once here and never again.
        if !dbscout_core::is_safe_identifier(&config.schema) {
            return Err(EngineError::Config(format!(
                "schema is not a safe identifier: {:?}",
                config.schema
            )));
        }

        let db = DbClient::connect(config)?;
        let catalog = SchemaCatalog::new(db.clone(), config.schema.clone());

        let map = Arc::new(resolve_all(&catalog).await);
        tracing::info!(
            schema = %config.schema,
            available = ?map.available(),
            "engine ready"
        );

        let browser = QueryBrowser::new(db.clone(), catalog.clone());
        let domains = DomainQueries::new(db.clone(), map, config.schema.clone());
        let sessions = SessionManager::new(db.clone(), catalog.clone(), browser.clone());

        Ok(Self {
            db,
            catalog,
            browser,
            domains,
            sessions,
        })
    }
}
