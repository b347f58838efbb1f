//! Generic Table Browsing
//!
//! Bounded, validated `SELECT *` paging over an arbitrary table. Ordering
//! is `ORDER BY 1 DESC`: ordinal position 1 gives some paging determinism
//! without a primary-key lookup on every call, at the cost of being
//! meaningless when column 1 is not naturally ordered. A known limitation,
//! kept deliberately.

use dbscout_core::{qualify_table, ReadOnlyQueryResult};

use crate::catalog::SchemaCatalog;
use crate::db::DbClient;
use crate::error::EngineResult;
use crate::rows::{decode_json_rows, wrap_row_to_json};

/// Default page size for row browsing.
pub const BROWSE_PAGE_SIZE: i64 = 20;

/// Paging browser over arbitrary tables.
#[derive(Debug, Clone)]
pub struct QueryBrowser {
    db: DbClient,
    catalog: SchemaCatalog,
}

impl QueryBrowser {
    pub fn new(db: DbClient, catalog: SchemaCatalog) -> Self {
        Self { db, catalog }
    }

    /// Fetch one page of `table` plus its total row count.
    ///
    /// An unsafe table name yields an empty result with total 0. An empty
    /// table yields empty headers and rows but keeps the computed total
    /// (the count query runs regardless).
    pub async fn browse(&self, table: &str, limit: i64, offset: i64) -> EngineResult<ReadOnlyQueryResult> {
        let qualified = match qualify_table(self.catalog.schema(), table) {
            Some(q) => q,
            None => {
                tracing::debug!(table, "browse rejected unsafe table identifier");
                return Ok(ReadOnlyQueryResult::empty_with_total(0));
            }
        };

        let total = self.catalog.row_count(table).await?;

        let sql = wrap_row_to_json(&format!(
            "SELECT * FROM {} ORDER BY 1 DESC LIMIT $1 OFFSET $2",
            qualified
        ));
        let rows = self
            .db
            .query("browse", &sql, &[&limit, &offset])
            .await?;

        let (columns, rows) = decode_json_rows(&rows);
        Ok(ReadOnlyQueryResult {
            columns,
            rows,
            total: Some(total),
        })
    }
}
