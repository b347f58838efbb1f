//! Per-User Guided Query Sessions
//!
//! Owns the map from user identity to current session state and executes
//! the effects produced by the pure state machine in `dbscout-core`.
//! Sessions live in memory only: completed, cancelled, or gone on process
//! restart. There is no timeout-based expiry.

use dashmap::DashMap;
use dbscout_core::{
    ensure_limit, transition, validate_select, Effect, ReadOnlyQueryResult, SessionEvent,
    SessionState, UserId, TABLE_MENU_CAP,
};

use crate::browse::QueryBrowser;
use crate::catalog::SchemaCatalog;
use crate::db::DbClient;
use crate::error::EngineResult;
use crate::rows::{decode_json_rows, wrap_row_to_json};

/// Row cap appended to every raw statement after validation.
pub const RAW_SQL_MAX_ROWS: u32 = 100;

/// What the host should render after an event was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionReply {
    /// Session opened; offer guided vs raw.
    ModeMenu,
    /// Guided step 1: pick one of these tables (already capped).
    TableMenu(Vec<String>),
    /// Guided flow aborted: the schema has no tables.
    NoTables,
    /// Guided step 2: pick a row limit for `table`.
    LimitMenu { table: String },
    /// Terminal: the guided browse ran.
    BrowseResult {
        table: String,
        result: ReadOnlyQueryResult,
    },
    /// Raw branch: prompt for a SELECT.
    SqlPrompt,
    /// Terminal: the raw statement ran.
    RawResult(ReadOnlyQueryResult),
    /// The event was refused; the message is user-facing.
    Rejected(String),
    /// The session was cancelled.
    Cancelled,
    /// No session is open for this user.
    NoSession,
}

/// Session orchestrator, keyed per user. Each user's entry is logically
/// isolated; no cross-user locking is needed.
#[derive(Debug)]
pub struct SessionManager {
    sessions: DashMap<UserId, SessionState>,
    db: DbClient,
    catalog: SchemaCatalog,
    browser: QueryBrowser,
}

impl SessionManager {
    pub fn new(db: DbClient, catalog: SchemaCatalog, browser: QueryBrowser) -> Self {
        Self {
            sessions: DashMap::new(),
            db,
            catalog,
            browser,
        }
    }

    /// Open (or restart) a session for `user` at mode selection.
    pub fn open(&self, user: UserId) -> SessionReply {
        self.sessions.insert(user, SessionState::ChoosingMode);
        SessionReply::ModeMenu
    }

    /// Drop `user`'s session unconditionally.
    pub fn clear(&self, user: UserId) {
        self.sessions.remove(&user);
    }

    /// Current state, if a session is open.
    pub fn state(&self, user: UserId) -> Option<SessionState> {
        self.sessions.get(&user).map(|s| s.clone())
    }

    /// Apply one event to `user`'s session and execute the resulting
    /// effect. The state map is updated before any effect runs, so a
    /// failing execution still leaves the session cleared.
    pub async fn handle(&self, user: UserId, event: SessionEvent) -> EngineResult<SessionReply> {
        let Some(state) = self.state(user) else {
            return Ok(SessionReply::NoSession);
        };

        let t = transition(&state, event);
        match t.next {
            Some(next) => {
                self.sessions.insert(user, next);
            }
            None => {
                self.sessions.remove(&user);
            }
        }

        match t.effect {
            Effect::ListTables => {
                let mut tables = self.catalog.list_tables().await?;
                if tables.is_empty() {
                    self.sessions.remove(&user);
                    return Ok(SessionReply::NoTables);
                }
                tables.truncate(TABLE_MENU_CAP);
                Ok(SessionReply::TableMenu(tables))
            }
            Effect::PromptLimit { table } => Ok(SessionReply::LimitMenu { table }),
            Effect::Browse { table, limit } => {
                let result = self.browser.browse(&table, i64::from(limit), 0).await?;
                Ok(SessionReply::BrowseResult { table, result })
            }
            Effect::PromptSql => Ok(SessionReply::SqlPrompt),
            Effect::ExecuteRaw { sql } => self.run_raw(&sql).await,
            Effect::AckCancel => Ok(SessionReply::Cancelled),
            Effect::Reject(msg) => Ok(SessionReply::Rejected(msg.to_string())),
        }
    }

    /// Validate, cap, and execute a raw statement. The session was already
    /// cleared; rejection and database failure both leave no state behind.
    async fn run_raw(&self, sql: &str) -> EngineResult<SessionReply> {
        if let Err(rejected) = validate_select(sql) {
            tracing::debug!(reason = %rejected, "raw statement rejected");
            return Ok(SessionReply::Rejected(rejected.to_string()));
        }
        let limited = ensure_limit(sql, RAW_SQL_MAX_ROWS);
        let rows = self.db.execute_readonly(&wrap_row_to_json(&limited)).await?;
        let (columns, rows) = decode_json_rows(&rows);
        Ok(SessionReply::RawResult(ReadOnlyQueryResult {
            columns,
            rows,
            total: None,
        }))
    }
}
