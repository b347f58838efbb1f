//! Row Decoding for Dynamic SELECTs
//!
//! Column types of `SELECT *` over an arbitrary table are unknown at
//! compile time, so result rows are pulled through `row_to_json` and
//! decoded as `serde_json::Value` (the `preserve_order` feature keeps the
//! column order the database emitted). Headers come from the first row's
//! key set; an empty result set yields empty headers.

use serde_json::Value as JsonValue;
use tokio_postgres::Row;

/// Wrap a validated statement so every result row arrives as one JSON
/// object column. The inner statement is already semicolon-free.
pub(crate) fn wrap_row_to_json(sql: &str) -> String {
    format!("SELECT row_to_json(q) FROM ({}) AS q", sql)
}

/// Decode `row_to_json` rows into (headers, value tuples).
pub(crate) fn decode_json_rows(rows: &[Row]) -> (Vec<String>, Vec<Vec<JsonValue>>) {
    let mut headers: Vec<String> = Vec::new();
    let mut out: Vec<Vec<JsonValue>> = Vec::with_capacity(rows.len());

    for row in rows {
        let value: JsonValue = row.get(0);
        let JsonValue::Object(map) = value else {
            continue;
        };
        if headers.is_empty() {
            headers = map.keys().cloned().collect();
        }
        out.push(map.into_iter().map(|(_, v)| v).collect());
    }

    (headers, out)
}
