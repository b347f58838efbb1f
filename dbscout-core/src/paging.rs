//! Compact Pagination Token Codec
//!
//! The presentation layer round-trips paging state through interaction
//! tokens capped at 64 bytes by the transport. State is encoded as:
//!
//! ```text
//! p:<module>:<offset>[:<extra>]
//! ```
//!
//! Examples: `p:wt:0` (weight, page 0), `p:brw:20:steps_daily` (browse,
//! offset 20, table name carried as extra).
//!
//! Decoding is deliberately lenient: the same button namespace carries
//! display-only markers (e.g. a "this control does nothing" token), so a
//! malformed offset decodes to 0 instead of failing.

use serde::{Deserialize, Serialize};

/// Reserved separator between token positions. Extras must not contain it.
pub const SEPARATOR: char = ':';

/// Fixed literal prefix at position 0.
pub const PREFIX: &str = "p";

/// Hard transport ceiling on an emitted token, in bytes.
pub const MAX_TOKEN_LEN: usize = 64;

/// Decoded pagination state for one feature module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Short tag identifying the feature ("wt", "brw", ...).
    pub module: String,
    /// Row offset; non-negative, a multiple of the module's page size.
    pub offset: i64,
    /// Optional payload carried through round-trips (e.g. a table name).
    pub extra: String,
}

impl PaginationState {
    pub fn new(module: impl Into<String>, offset: i64, extra: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            offset: offset.max(0),
            extra: extra.into(),
        }
    }

    /// Encode this state as a token.
    pub fn encode(&self) -> String {
        encode(&self.module, self.offset, &self.extra)
    }
}

/// Build a pagination token. `extra` is appended only when non-empty.
pub fn encode(module: &str, offset: i64, extra: &str) -> String {
    let mut token = format!("{}{}{}{}{}", PREFIX, SEPARATOR, module, SEPARATOR, offset);
    if !extra.is_empty() {
        token.push(SEPARATOR);
        token.push_str(extra);
    }
    token
}

/// Parse a token positionally. Never fails: a missing or malformed offset
/// decodes to 0, a missing extra to the empty string.
pub fn decode(token: &str) -> PaginationState {
    let mut parts = token.split(SEPARATOR);
    let _prefix = parts.next();
    let module = parts.next().unwrap_or_default().to_string();
    let offset = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
        .max(0);
    let extra = parts.next().unwrap_or_default().to_string();
    PaginationState {
        module,
        offset,
        extra,
    }
}

/// True if `token` fits within the transport ceiling.
pub fn fits_transport(token: &str) -> bool {
    token.len() <= MAX_TOKEN_LEN
}
