//! DBSCOUT Core - Pure Query-Safety and Mapping Logic
//!
//! This crate contains the IO-free half of the dbscout engine: SQL
//! identifier and statement validation, the pagination token codec, schema
//! descriptors, health-domain candidate matching, and the guided-query
//! state machine expressed as pure transitions.
//!
//! Nothing in this crate touches a database. The `dbscout-engine` crate
//! composes these pieces on top of a PostgreSQL connection pool.

pub mod domain;
pub mod identifier;
pub mod paging;
pub mod schema;
pub mod session;
pub mod statement;

// Re-export commonly used types
pub use domain::{ColumnRole, Domain, DomainMapping, ResolutionOutcome};
pub use identifier::{is_safe_identifier, qualify_table, quote_identifier};
pub use paging::{PaginationState, MAX_TOKEN_LEN};
pub use schema::{ColumnDescriptor, IndexDescriptor, ReadOnlyQueryResult, TableDescriptor};
pub use session::{
    transition, Effect, SessionEvent, SessionState, Transition, UserId, LIMIT_OPTIONS,
    TABLE_MENU_CAP,
};
pub use statement::{ensure_limit, validate_select, StatementRejected};
