//! Domain Query Operations
//!
//! Read paths over the resolved health-data domains: latest reading,
//! recent pages, UTC range scans, and the aggregates the summary reports
//! are built from. Every operation is a no-op returning an empty result
//! when its domain is unavailable.
//!
//! Identifiers come from the immutable [`DomainMap`] and still pass
//! through the quoting helpers, with every table reference qualified by
//! the configured schema; range bounds and limits are always bound
//! parameters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dbscout_core::{qualify_table, quote_identifier, Domain, ReadOnlyQueryResult};
use serde::{Deserialize, Serialize};

use crate::db::DbClient;
use crate::error::EngineResult;
use crate::resolve::DomainMap;
use crate::rows::{decode_json_rows, wrap_row_to_json};

/// Aggregate summary of a domain's value column over a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub samples: i64,
}

/// Query surface over all resolved domains.
#[derive(Debug, Clone)]
pub struct DomainQueries {
    db: DbClient,
    map: Arc<DomainMap>,
    schema: String,
}

/// Schema-qualified (table, order column) pair for an available domain.
struct OrderedTable {
    table: String,
    order_col: String,
}

/// Schema-qualified (table, order column, value column) triple.
struct ValuedTable {
    table: String,
    order_col: String,
    value_col: String,
}

impl DomainQueries {
    pub fn new(db: DbClient, map: Arc<DomainMap>, schema: impl Into<String>) -> Self {
        Self {
            db,
            map,
            schema: schema.into(),
        }
    }

    pub fn mapping(&self) -> &DomainMap {
        &self.map
    }

    fn ordered(&self, domain: Domain) -> Option<OrderedTable> {
        let mapping = self.map.get(domain);
        if !mapping.is_available() {
            return None;
        }
        Some(OrderedTable {
            table: qualify_table(&self.schema, mapping.table.as_deref()?)?,
            order_col: quote_identifier(mapping.order_column()?)?,
        })
    }

    fn valued(&self, domain: Domain) -> Option<ValuedTable> {
        let mapping = self.map.get(domain);
        if !mapping.is_available() {
            return None;
        }
        Some(ValuedTable {
            table: qualify_table(&self.schema, mapping.table.as_deref()?)?,
            order_col: quote_identifier(mapping.order_column()?)?,
            value_col: quote_identifier(mapping.value_column()?)?,
        })
    }

    /// Most recent record, or `None` when unavailable or empty.
    pub async fn latest(
        &self,
        domain: Domain,
    ) -> EngineResult<Option<serde_json::Map<String, serde_json::Value>>> {
        let Some(t) = self.ordered(domain) else {
            return Ok(None);
        };
        let sql = wrap_row_to_json(&format!(
            "SELECT * FROM {} ORDER BY {} DESC LIMIT 1",
            t.table, t.order_col
        ));
        let rows = self.db.query("domain_latest", &sql, &[]).await?;
        let row = match rows.first() {
            Some(row) => row,
            None => return Ok(None),
        };
        match row.get::<_, serde_json::Value>(0) {
            serde_json::Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        }
    }

    /// Recent records, newest first.
    pub async fn recent(
        &self,
        domain: Domain,
        limit: i64,
        offset: i64,
    ) -> EngineResult<ReadOnlyQueryResult> {
        let Some(t) = self.ordered(domain) else {
            return Ok(ReadOnlyQueryResult::default());
        };
        let sql = wrap_row_to_json(&format!(
            "SELECT * FROM {} ORDER BY {} DESC LIMIT $1 OFFSET $2",
            t.table, t.order_col
        ));
        let rows = self
            .db
            .query("domain_recent", &sql, &[&limit, &offset])
            .await?;
        let (columns, rows) = decode_json_rows(&rows);
        Ok(ReadOnlyQueryResult {
            columns,
            rows,
            total: None,
        })
    }

    /// Total record count; zero when unavailable.
    pub async fn count(&self, domain: Domain) -> EngineResult<i64> {
        let Some(t) = self.ordered(domain) else {
            return Ok(0);
        };
        let sql = format!("SELECT count(*) FROM {}", t.table);
        let row = self.db.query_opt("domain_count", &sql, &[]).await?;
        Ok(row.map(|r| r.get::<_, i64>(0)).unwrap_or(0))
    }

    /// Records inside a half-open UTC range, oldest first.
    pub async fn in_range(
        &self,
        domain: Domain,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<ReadOnlyQueryResult> {
        let Some(t) = self.ordered(domain) else {
            return Ok(ReadOnlyQueryResult::default());
        };
        let sql = wrap_row_to_json(&format!(
            "SELECT * FROM {table} WHERE {col} >= $1 AND {col} < $2 ORDER BY {col} ASC",
            table = t.table,
            col = t.order_col
        ));
        let rows = self
            .db
            .query("domain_in_range", &sql, &[&start, &end])
            .await?;
        let (columns, rows) = decode_json_rows(&rows);
        Ok(ReadOnlyQueryResult {
            columns,
            rows,
            total: None,
        })
    }

    /// Last `n` value readings, oldest first (sparkline feed). Nulls stay
    /// in place so gaps remain visible.
    pub async fn series(&self, domain: Domain, n: i64) -> EngineResult<Vec<Option<f64>>> {
        let Some(t) = self.valued(domain) else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT {}::float8 FROM {} ORDER BY {} DESC LIMIT $1",
            t.value_col, t.table, t.order_col
        );
        let rows = self.db.query("domain_series", &sql, &[&n]).await?;
        let mut values: Vec<Option<f64>> =
            rows.iter().map(|r| r.get::<_, Option<f64>>(0)).collect();
        values.reverse();
        Ok(values)
    }

    /// Sum of the value column over a half-open UTC range (e.g. steps
    /// taken today, from local midnight to now). `None` when the domain
    /// is unavailable or the range holds no rows.
    pub async fn sum_in_range(
        &self,
        domain: Domain,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Option<f64>> {
        let Some(t) = self.valued(domain) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT SUM({col})::float8 FROM {table} WHERE {order} >= $1 AND {order} < $2",
            col = t.value_col,
            table = t.table,
            order = t.order_col
        );
        let row = self
            .db
            .query_opt("domain_sum_in_range", &sql, &[&start, &end])
            .await?;
        Ok(row.and_then(|r| r.get::<_, Option<f64>>(0)))
    }

    /// Sum of the value column since `start` (e.g. total steps).
    pub async fn sum_since(
        &self,
        domain: Domain,
        start: DateTime<Utc>,
    ) -> EngineResult<Option<f64>> {
        self.aggregate_since("SUM", domain, start).await
    }

    /// Average of the value column since `start` (e.g. average daily
    /// steps, average sleep duration).
    pub async fn avg_since(
        &self,
        domain: Domain,
        start: DateTime<Utc>,
    ) -> EngineResult<Option<f64>> {
        self.aggregate_since("AVG", domain, start).await
    }

    async fn aggregate_since(
        &self,
        func: &str,
        domain: Domain,
        start: DateTime<Utc>,
    ) -> EngineResult<Option<f64>> {
        let Some(t) = self.valued(domain) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {func}({col})::float8 FROM {table} WHERE {order} >= $1",
            func = func,
            col = t.value_col,
            table = t.table,
            order = t.order_col
        );
        let row = self.db.query_opt("domain_aggregate", &sql, &[&start]).await?;
        Ok(row.and_then(|r| r.get::<_, Option<f64>>(0)))
    }

    /// AVG/MIN/MAX/COUNT of the value column over a half-open UTC range
    /// (the heart-rate daily summary). `None` when unavailable or the
    /// range holds no samples.
    pub async fn range_summary(
        &self,
        domain: Domain,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Option<RangeSummary>> {
        let Some(t) = self.valued(domain) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT AVG({col})::float8, MIN({col})::float8, MAX({col})::float8, COUNT({col}) \
             FROM {table} WHERE {order} >= $1 AND {order} < $2",
            col = t.value_col,
            table = t.table,
            order = t.order_col
        );
        let row = self
            .db
            .query_opt("domain_range_summary", &sql, &[&start, &end])
            .await?;
        let Some(row) = row else { return Ok(None) };
        let samples: i64 = row.get(3);
        if samples == 0 {
            return Ok(None);
        }
        Ok(Some(RangeSummary {
            avg: row.get::<_, Option<f64>>(0).unwrap_or(0.0),
            min: row.get::<_, Option<f64>>(1).unwrap_or(0.0),
            max: row.get::<_, Option<f64>>(2).unwrap_or(0.0),
            samples,
        }))
    }

    /// (recent average, previous average) of the value column over the
    /// last `2 * recent_days` readings, for the weight-trend comparison.
    /// The previous average is `None` when there is not enough history.
    pub async fn trend_averages(
        &self,
        domain: Domain,
        recent_days: usize,
    ) -> EngineResult<(Option<f64>, Option<f64>)> {
        let readings = self.series(domain, (recent_days * 2) as i64).await?;
        // series() is oldest-first; trend wants newest-first.
        let values: Vec<f64> = readings.into_iter().rev().flatten().collect();
        if values.is_empty() {
            return Ok((None, None));
        }
        if values.len() <= recent_days {
            return Ok((avg(&values), None));
        }
        let (recent, previous) = values.split_at(recent_days);
        Ok((avg(recent), avg(previous)))
    }
}

fn avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avg_of_empty_is_none() {
        assert_eq!(avg(&[]), None);
        assert_eq!(avg(&[80.0, 82.0]), Some(81.0));
    }
}
