//! SQL Identifier Validation
//!
//! Table and column names cannot be bound as query parameters, so any name
//! that reaches SQL text is interpolated as a string. This module is the
//! single gate in front of that interpolation: every call site quotes names
//! through [`quote_identifier`] and treats `None` as a hard rejection.

use once_cell::sync::Lazy;
use regex::Regex;

/// Grammar for a safe unquoted-style SQL identifier.
static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// Return true if `name` matches the safe-identifier grammar
/// `^[A-Za-z_][A-Za-z0-9_]*$`.
pub fn is_safe_identifier(name: &str) -> bool {
    IDENT_RE.is_match(name)
}

/// Quote `name` for interpolation into SQL text.
///
/// Returns `Some("\"name\"")` only when the grammar accepts the name. The
/// grammar excludes double quotes, so wrapping is injection-safe. A `None`
/// must never fall back to the unvalidated name.
pub fn quote_identifier(name: &str) -> Option<String> {
    if is_safe_identifier(name) {
        Some(format!("\"{}\"", name))
    } else {
        None
    }
}

/// Quote `schema` and `table` into a schema-qualified reference.
///
/// Data queries always name their schema explicitly; a bare table name
/// would resolve through `search_path` and could silently read a
/// same-named table from another schema. Both parts pass the same
/// grammar gate.
pub fn qualify_table(schema: &str, table: &str) -> Option<String> {
    Some(format!(
        "{}.{}",
        quote_identifier(schema)?,
        quote_identifier(table)?
    ))
}
