//! Schema Catalog
//!
//! Introspection over `information_schema` (plus `pg_indexes`), scoped to a
//! single named schema. Catalog views are inherently read-only; the only
//! operation touching user data here is [`SchemaCatalog::row_count`].
//!
//! Every operation validates table identifiers first and answers with an
//! empty result on rejection rather than executing on an unsafe name.

use dbscout_core::{
    is_safe_identifier, qualify_table, ColumnDescriptor, IndexDescriptor, TableDescriptor,
};

use crate::db::DbClient;
use crate::error::EngineResult;

// information_schema columns are domain types (sql_identifier,
// cardinal_number); cast to base types for decoding.
const LIST_TABLES_SQL: &str = "\
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = $1::text
  AND table_type = 'BASE TABLE'
ORDER BY table_name";

const LIST_COLUMNS_SQL: &str = "\
SELECT column_name::text, data_type::text, is_nullable::text, ordinal_position::int4
FROM information_schema.columns
WHERE table_schema = $1::text
  AND table_name = $2::text
ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "\
SELECT kcu.column_name::text
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_name = tc.constraint_name
 AND kcu.table_schema = tc.table_schema
WHERE tc.constraint_type = 'PRIMARY KEY'
  AND tc.table_schema = $1::text
  AND tc.table_name = $2::text
ORDER BY kcu.ordinal_position";

const TABLE_EXISTS_SQL: &str = "\
SELECT 1
FROM information_schema.tables
WHERE table_schema = $1::text
  AND table_name = $2::text";

const INDEXES_SQL: &str = "\
SELECT indexname, indexdef
FROM pg_indexes
WHERE schemaname = $1::text
  AND tablename = $2::text
ORDER BY indexname";

/// Catalog reader bound to one schema.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    db: DbClient,
    schema: String,
}

impl SchemaCatalog {
    pub fn new(db: DbClient, schema: impl Into<String>) -> Self {
        Self {
            db,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// All base-table names in the schema, ordered by name.
    pub async fn list_tables(&self) -> EngineResult<Vec<String>> {
        let rows = self
            .db
            .query("list_tables", LIST_TABLES_SQL, &[&self.schema])
            .await?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    /// Column descriptors for `table`, ordered by ordinal position. Empty
    /// for an unsafe or unknown table name.
    pub async fn list_columns(&self, table: &str) -> EngineResult<Vec<ColumnDescriptor>> {
        if !is_safe_identifier(table) {
            tracing::debug!(table, "rejected unsafe table identifier");
            return Ok(Vec::new());
        }
        let rows = self
            .db
            .query("list_columns", LIST_COLUMNS_SQL, &[&self.schema, &table])
            .await?;
        Ok(rows
            .iter()
            .map(|r| ColumnDescriptor {
                name: r.get(0),
                data_type: r.get(1),
                nullable: r.get::<_, String>(2) == "YES",
                ordinal: r.get(3),
            })
            .collect())
    }

    /// Primary-key column names in key order. Zero, one, or many entries.
    pub async fn primary_key_columns(&self, table: &str) -> EngineResult<Vec<String>> {
        if !is_safe_identifier(table) {
            return Ok(Vec::new());
        }
        let rows = self
            .db
            .query("primary_key_columns", PRIMARY_KEY_SQL, &[&self.schema, &table])
            .await?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    /// Whether `table` exists in the schema. Unsafe names do not exist.
    pub async fn table_exists(&self, table: &str) -> EngineResult<bool> {
        if !is_safe_identifier(table) {
            return Ok(false);
        }
        let row = self
            .db
            .query_opt("table_exists", TABLE_EXISTS_SQL, &[&self.schema, &table])
            .await?;
        Ok(row.is_some())
    }

    /// Full row count of `table`. Accurate but potentially slow; the cost
    /// is accepted. Unsafe names count as zero.
    pub async fn row_count(&self, table: &str) -> EngineResult<i64> {
        let qualified = match qualify_table(&self.schema, table) {
            Some(q) => q,
            None => return Ok(0),
        };
        let sql = format!("SELECT count(*) FROM {}", qualified);
        let row = self.db.query_opt("row_count", &sql, &[]).await?;
        Ok(row.map(|r| r.get::<_, i64>(0)).unwrap_or(0))
    }

    /// Indexes on `table` as (name, definition) pairs.
    pub async fn indexes(&self, table: &str) -> EngineResult<Vec<IndexDescriptor>> {
        if !is_safe_identifier(table) {
            return Ok(Vec::new());
        }
        let rows = self
            .db
            .query("indexes", INDEXES_SQL, &[&self.schema, &table])
            .await?;
        Ok(rows
            .iter()
            .map(|r| IndexDescriptor {
                name: r.get(0),
                definition: r.get(1),
            })
            .collect())
    }

    /// Columns plus resolved primary key as one descriptor. `None` when the
    /// table is unsafe, absent, or has no columns.
    pub async fn describe_table(&self, table: &str) -> EngineResult<Option<TableDescriptor>> {
        let columns = self.list_columns(table).await?;
        if columns.is_empty() {
            return Ok(None);
        }
        let primary_key = self.primary_key_columns(table).await?;
        Ok(Some(TableDescriptor {
            name: table.to_string(),
            columns,
            primary_key,
        }))
    }
}
