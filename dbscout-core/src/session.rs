//! Guided Query Session State Machine
//!
//! Multi-step construction of a bounded SELECT: choose a mode, pick a
//! table, pick a row limit, execute — or branch into raw-SQL entry. The
//! machine is expressed as pure transitions from `(state, event)` to
//! `(next state, effect)`; the engine owns the per-user state map and
//! executes effects against the database.

use serde::{Deserialize, Serialize};

use crate::identifier::is_safe_identifier;

/// Per-user identity key for session storage.
pub type UserId = i64;

/// Fixed row-limit menu offered in the guided flow.
pub const LIMIT_OPTIONS: [u32; 3] = [10, 50, 100];

/// Presentation safety cap on the table-pick menu.
pub const TABLE_MENU_CAP: usize = 20;

/// Current position in the guided flow. Accumulated selections live inside
/// the state variant that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the user to choose guided vs raw mode.
    ChoosingMode,
    /// Guided: waiting for a table selection.
    PickingTable,
    /// Guided: table chosen, waiting for a row limit.
    PickingLimit { table: String },
    /// Raw branch: waiting for a free-text SELECT.
    EnteringRawSql,
}

/// An input applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    GuidedSelected,
    RawSelected,
    TableChosen(String),
    LimitChosen(u32),
    SqlEntered(String),
    Cancel,
}

/// Side-effect instruction for the engine. Transitions never touch the
/// database themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch up to [`TABLE_MENU_CAP`] table names and present them.
    ListTables,
    /// Present the limit menu for the chosen table.
    PromptLimit { table: String },
    /// Run exactly one browse call; the session is over.
    Browse { table: String, limit: u32 },
    /// Prompt for a raw SELECT.
    PromptSql,
    /// Validate + limit + execute the statement; the session is over.
    ExecuteRaw { sql: String },
    /// Tell the user the session was cancelled.
    AckCancel,
    /// Refuse the event and stay (or clear, per `next`).
    Reject(&'static str),
}

/// Result of applying one event: the replacement state (`None` clears the
/// session) and the effect to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<SessionState>,
    pub effect: Effect,
}

impl Transition {
    fn stay(state: SessionState, effect: Effect) -> Self {
        Self {
            next: Some(state),
            effect,
        }
    }

    fn clear(effect: Effect) -> Self {
        Self { next: None, effect }
    }
}

/// Apply `event` to `state`. Pure: table identifiers are validated here
/// (both when chosen and again when the limit arrives, guarding against
/// stale or forged state), but all IO is deferred to the returned effect.
pub fn transition(state: &SessionState, event: SessionEvent) -> Transition {
    if event == SessionEvent::Cancel {
        return Transition::clear(Effect::AckCancel);
    }

    match (state, event) {
        (SessionState::ChoosingMode, SessionEvent::GuidedSelected) => {
            Transition::stay(SessionState::PickingTable, Effect::ListTables)
        }
        (SessionState::ChoosingMode, SessionEvent::RawSelected) => {
            Transition::stay(SessionState::EnteringRawSql, Effect::PromptSql)
        }
        (SessionState::PickingTable, SessionEvent::TableChosen(table)) => {
            if !is_safe_identifier(&table) {
                return Transition::stay(
                    SessionState::PickingTable,
                    Effect::Reject("Invalid table."),
                );
            }
            Transition::stay(
                SessionState::PickingLimit {
                    table: table.clone(),
                },
                Effect::PromptLimit { table },
            )
        }
        (SessionState::PickingLimit { table }, SessionEvent::LimitChosen(limit)) => {
            if !LIMIT_OPTIONS.contains(&limit) {
                return Transition::stay(
                    SessionState::PickingLimit {
                        table: table.clone(),
                    },
                    Effect::Reject("Invalid limit."),
                );
            }
            // Defense against stale or forged session state.
            if !is_safe_identifier(table) {
                return Transition::clear(Effect::Reject("Invalid table."));
            }
            Transition::clear(Effect::Browse {
                table: table.clone(),
                limit,
            })
        }
        (SessionState::EnteringRawSql, SessionEvent::SqlEntered(sql)) => {
            Transition::clear(Effect::ExecuteRaw { sql })
        }
        (state, _) => Transition::stay(state.clone(), Effect::Reject("Not expected here.")),
    }
}
