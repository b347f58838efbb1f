//! Raw Statement Validation
//!
//! Gatekeeper for user-typed SQL. A statement is allowed only if it is a
//! single SELECT: first rule failure wins and is reported verbatim to the
//! user. The read-only transaction in the engine is a second, independent
//! barrier behind these checks.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Keywords that must not appear as whole words anywhere in a raw statement.
const BLOCKED_KEYWORDS: [&str; 11] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE",
    "COPY", "EXECUTE",
];

/// Case-insensitive whole-word matcher over all blocked keywords.
static BLOCKED_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b({})\b", BLOCKED_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("blocked keyword regex is valid")
});

/// Case-insensitive LIMIT clause detector for [`ensure_limit`].
static LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bLIMIT\b").expect("limit regex is valid"));

/// Reason a raw statement was rejected. The `Display` text is shown to the
/// user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementRejected {
    /// Statement does not begin with SELECT.
    #[error("Only SELECT statements are allowed.")]
    NotSelect,

    /// Statement contains a semicolon (blocks statement chaining).
    #[error("Semicolons are not allowed.")]
    Semicolon,

    /// Statement contains a blocked keyword as a whole word.
    #[error("Keyword {0} is not allowed.")]
    BlockedKeyword(String),
}

/// Validate a user-supplied statement. Rules run in order; the first
/// failure wins.
pub fn validate_select(sql: &str) -> Result<(), StatementRejected> {
    let stripped = sql.trim();
    if !stripped.to_uppercase().starts_with("SELECT") {
        return Err(StatementRejected::NotSelect);
    }
    if stripped.contains(';') {
        return Err(StatementRejected::Semicolon);
    }
    if let Some(m) = BLOCKED_RE.find(stripped) {
        return Err(StatementRejected::BlockedKeyword(
            m.as_str().to_uppercase(),
        ));
    }
    Ok(())
}

/// Append `LIMIT <max_rows>` unless the statement already carries a LIMIT
/// clause. Idempotent: applying it twice never double-appends.
pub fn ensure_limit(sql: &str, max_rows: u32) -> String {
    if LIMIT_RE.is_match(sql) {
        return sql.to_string();
    }
    format!("{} LIMIT {}", sql.trim_end().trim_end_matches(';'), max_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_select_passes() {
        assert_eq!(validate_select("SELECT * FROM t"), Ok(()));
        assert_eq!(validate_select("  select 1  "), Ok(()));
    }

    #[test]
    fn non_select_is_rejected_first() {
        assert_eq!(
            validate_select("UPDATE t SET x=1"),
            Err(StatementRejected::NotSelect)
        );
        assert_eq!(validate_select(""), Err(StatementRejected::NotSelect));
        assert_eq!(
            validate_select("WITH x AS (SELECT 1) SELECT * FROM x"),
            Err(StatementRejected::NotSelect)
        );
    }

    #[test]
    fn semicolon_blocks_chaining() {
        assert_eq!(
            validate_select("select 1; drop table t"),
            Err(StatementRejected::Semicolon)
        );
        assert_eq!(
            validate_select("SELECT 1;"),
            Err(StatementRejected::Semicolon)
        );
    }

    #[test]
    fn blocked_keyword_names_the_offender() {
        assert_eq!(
            validate_select("SELECT * FROM t WHERE delete_flag AND drop IS NULL"),
            Err(StatementRejected::BlockedKeyword("DROP".to_string()))
        );
        assert_eq!(
            validate_select("SELECT truncate(1.5)"),
            Err(StatementRejected::BlockedKeyword("TRUNCATE".to_string()))
        );
    }

    #[test]
    fn keyword_inside_identifier_is_not_a_word_match() {
        // "orders" contains no blocked word; "delete_flag" is one token.
        assert_eq!(validate_select("SELECT * FROM orders"), Ok(()));
        assert_eq!(validate_select("SELECT updated_at FROM t"), Ok(()));
    }

    #[test]
    fn ensure_limit_appends_once() {
        assert_eq!(
            ensure_limit("SELECT * FROM t", 100),
            "SELECT * FROM t LIMIT 100"
        );
        let once = ensure_limit("SELECT * FROM t", 100);
        assert_eq!(ensure_limit(&once, 100), once);
    }

    #[test]
    fn existing_limit_is_preserved() {
        assert_eq!(
            ensure_limit("SELECT * FROM t LIMIT 5", 100),
            "SELECT * FROM t LIMIT 5"
        );
        assert_eq!(
            ensure_limit("select * from t limit 5", 100),
            "select * from t limit 5"
        );
    }

    #[test]
    fn ensure_limit_strips_trailing_semicolon() {
        assert_eq!(
            ensure_limit("SELECT * FROM t;", 50),
            "SELECT * FROM t LIMIT 50"
        );
    }
}
