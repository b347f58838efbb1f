//! Schema Descriptors and Query Results
//!
//! Plain data produced by catalog introspection and row browsing. Produced
//! fresh per operation; only a `DomainMapping` holds introspection results
//! beyond a single call.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type as a string (e.g. "integer", "timestamp with time zone").
    pub data_type: String,
    pub nullable: bool,
    /// 1-based catalog position; the stable sort key for column lists.
    pub ordinal: i32,
}

/// A table with its ordered columns and resolved primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    /// Ordered by ordinal position.
    pub columns: Vec<ColumnDescriptor>,
    /// Primary-key column names in key order; may be empty or composite.
    pub primary_key: Vec<String>,
}

impl TableDescriptor {
    /// Column names in ordinal order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// An index as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub definition: String,
}

/// Result of a bounded read-only query.
///
/// Column order follows the result set; rows are value tuples in the same
/// order. `total` is the full row count when counting was attempted, and
/// `None` otherwise (raw-mode results do not count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReadOnlyQueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
    pub total: Option<i64>,
}

impl ReadOnlyQueryResult {
    /// Empty result with a known total (used for rejected identifiers and
    /// empty tables).
    pub fn empty_with_total(total: i64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            total: Some(total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_follow_ordinal_order() {
        let table = TableDescriptor {
            name: "weight".to_string(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".to_string(),
                    data_type: "bigint".to_string(),
                    nullable: false,
                    ordinal: 1,
                },
                ColumnDescriptor {
                    name: "measured_at".to_string(),
                    data_type: "timestamp with time zone".to_string(),
                    nullable: false,
                    ordinal: 2,
                },
            ],
            primary_key: vec!["id".to_string()],
        };
        assert_eq!(table.column_names(), vec!["id", "measured_at"]);
    }

    #[test]
    fn empty_result_keeps_total() {
        let res = ReadOnlyQueryResult::empty_with_total(0);
        assert!(res.is_empty());
        assert!(res.columns.is_empty());
        assert_eq!(res.total, Some(0));
    }
}
