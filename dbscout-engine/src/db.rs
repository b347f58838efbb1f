//! Database Connection Pool
//!
//! One small bounded deadpool-postgres pool shared by every component; no
//! query path bypasses it. Every call carries a timeout (short for health
//! checks, a longer default otherwise) and a timeout is surfaced as a
//! generic failure with no automatic retry.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Pooled database client.
///
/// Cheap to clone; all clones share the pool and the last-successful-query
/// timestamp (exposed for host-side health reporting).
#[derive(Debug, Clone)]
pub struct DbClient {
    pool: Pool,
    query_timeout: Duration,
    health_timeout: Duration,
    last_ok: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl DbClient {
    /// Build a client (and its pool) from configuration. Connections are
    /// established lazily on first use.
    pub fn connect(config: &EngineConfig) -> EngineResult<Self> {
        let pg_config = config
            .database_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| EngineError::Config(format!("invalid DATABASE_URL: {}", e)))?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(config.pool_max)
            .build()
            .map_err(|e| EngineError::Config(format!("failed to create pool: {}", e)))?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout,
            health_timeout: config.health_timeout,
            last_ok: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> EngineResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(EngineError::from)
    }

    /// Current pool size, for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Timestamp of the last query that completed successfully, if any.
    pub fn last_successful_query(&self) -> Option<DateTime<Utc>> {
        *self.last_ok.read().expect("last_ok lock poisoned")
    }

    fn touch(&self) {
        *self.last_ok.write().expect("last_ok lock poisoned") = Some(Utc::now());
    }

    /// Run a query and return all rows.
    pub async fn query(
        &self,
        op: &'static str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> EngineResult<Vec<Row>> {
        let conn = self.get_conn().await?;
        let rows = tokio::time::timeout(self.query_timeout, conn.query(sql, params))
            .await
            .map_err(|_| EngineError::Timeout(op))??;
        self.touch();
        Ok(rows)
    }

    /// Run a query and return the first row, or `None`.
    pub async fn query_opt(
        &self,
        op: &'static str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> EngineResult<Option<Row>> {
        let conn = self.get_conn().await?;
        let row = tokio::time::timeout(self.query_timeout, conn.query_opt(sql, params))
            .await
            .map_err(|_| EngineError::Timeout(op))??;
        self.touch();
        Ok(row)
    }

    /// Execute an already-validated statement inside an explicitly
    /// READ ONLY transaction.
    ///
    /// The transaction flag is a second barrier behind the keyword
    /// blocklist: a statement that smuggles a mutation past validation is
    /// rejected by the database itself and surfaces as the generic
    /// execution error.
    pub async fn execute_readonly(&self, sql: &str) -> EngineResult<Vec<Row>> {
        let mut conn = self.get_conn().await?;
        let rows = tokio::time::timeout(self.query_timeout, async {
            let tx = conn.build_transaction().read_only(true).start().await?;
            let rows = tx.query(sql, &[]).await?;
            tx.commit().await?;
            Ok::<_, tokio_postgres::Error>(rows)
        })
        .await
        .map_err(|_| EngineError::Timeout("execute_readonly"))??;
        self.touch();
        Ok(rows)
    }

    /// True if the pool can execute a trivial query within the short
    /// health timeout.
    pub async fn health_check(&self) -> bool {
        let conn = match self.get_conn().await {
            Ok(conn) => conn,
            Err(_) => return false,
        };
        match tokio::time::timeout(self.health_timeout, conn.query_one("SELECT 1", &[])).await {
            Ok(Ok(_)) => {
                self.touch();
                true
            }
            _ => false,
        }
    }
}
