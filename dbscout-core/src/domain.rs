//! Health-Data Domain Mapping
//!
//! The target database is an existing schema under unknown naming: the
//! weight table might be `measurements_weight` or `body_weight`, its value
//! column `weight_kg` or just `value`. Each domain carries a fixed,
//! prioritized candidate list for its table name and for every semantic
//! column role. Resolution is first-match-wins with no scoring; an
//! unmatched optional role is simply absent.
//!
//! This module holds the domain vocabulary and the pure matching step. The
//! engine performs the catalog lookups and produces one immutable
//! [`DomainMapping`] per domain at bootstrap.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// DOMAINS AND ROLES
// ============================================================================

/// A semantic data category the system understands independent of actual
/// table naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Weight,
    Steps,
    Sleep,
    HeartRate,
}

impl Domain {
    /// All domains, in resolution/reporting order.
    pub const ALL: [Domain; 4] = [
        Domain::Weight,
        Domain::Steps,
        Domain::Sleep,
        Domain::HeartRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Weight => "weight",
            Domain::Steps => "steps",
            Domain::Sleep => "sleep",
            Domain::HeartRate => "heart_rate",
        }
    }

    /// Candidate table names, tried in order; the first that exists wins.
    pub fn table_candidates(&self) -> &'static [&'static str] {
        match self {
            Domain::Weight => &["measurements_weight", "weight", "weight_measurements", "body_weight"],
            Domain::Steps => &["steps_daily", "steps", "daily_steps", "activity_steps"],
            Domain::Sleep => &["sleep_sessions", "sleep", "sleep_data", "sleep_records"],
            Domain::HeartRate => &[
                "heart_rate_daily",
                "heart_rate_samples",
                "heart_rate",
                "heartrate",
                "hr_data",
            ],
        }
    }

    /// Column roles this domain tries to resolve.
    pub fn roles(&self) -> &'static [ColumnRole] {
        match self {
            Domain::Weight | Domain::Steps => {
                &[ColumnRole::Date, ColumnRole::Value, ColumnRole::Source]
            }
            Domain::Sleep => &[
                ColumnRole::Start,
                ColumnRole::End,
                ColumnRole::Duration,
                ColumnRole::Stages,
                ColumnRole::Date,
            ],
            Domain::HeartRate => &[
                ColumnRole::Date,
                ColumnRole::Value,
                ColumnRole::Min,
                ColumnRole::Max,
            ],
        }
    }

    /// Candidate column names for `role` within this domain, tried in order.
    pub fn role_candidates(&self, role: ColumnRole) -> &'static [&'static str] {
        match (self, role) {
            (Domain::Weight, ColumnRole::Date) => {
                &["date", "measured_at", "timestamp", "created_at", "time"]
            }
            (Domain::Weight, ColumnRole::Value) => &["weight_kg", "weight", "value", "kg"],
            (Domain::Steps, ColumnRole::Date) => {
                &["date", "measured_at", "timestamp", "created_at", "day"]
            }
            (Domain::Steps, ColumnRole::Value) => &["steps", "step_count", "value", "total_steps"],
            (Domain::Weight | Domain::Steps, ColumnRole::Source) => {
                &["source", "data_source", "origin"]
            }
            (Domain::Sleep, ColumnRole::Start) => {
                &["start", "start_time", "sleep_start", "bedtime", "started_at"]
            }
            (Domain::Sleep, ColumnRole::End) => {
                &["end", "end_time", "sleep_end", "wake_time", "ended_at"]
            }
            (Domain::Sleep, ColumnRole::Duration) => {
                &["duration", "duration_minutes", "total_minutes", "sleep_duration"]
            }
            (Domain::Sleep, ColumnRole::Stages) => &["stages", "stages_summary", "sleep_stages"],
            (Domain::Sleep, ColumnRole::Date) => &["date", "night", "created_at"],
            (Domain::HeartRate, ColumnRole::Date) => {
                &["date", "measured_at", "timestamp", "created_at", "time", "day"]
            }
            (Domain::HeartRate, ColumnRole::Value) => {
                &["bpm", "heart_rate", "avg_bpm", "value", "resting_hr", "avg_hr"]
            }
            (Domain::HeartRate, ColumnRole::Min) => &["min_bpm", "min_hr", "resting_hr"],
            (Domain::HeartRate, ColumnRole::Max) => &["max_bpm", "max_hr"],
            _ => &[],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic column roles a domain may resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Date/order column (orderable, used for DESC/range queries).
    Date,
    /// Primary numeric reading (weight_kg, steps, bpm).
    Value,
    /// Data provenance column.
    Source,
    /// Sleep session start.
    Start,
    /// Sleep session end.
    End,
    /// Sleep duration.
    Duration,
    /// Sleep stage summary.
    Stages,
    /// Daily minimum (heart rate).
    Min,
    /// Daily maximum (heart rate).
    Max,
}

// ============================================================================
// RESOLVED MAPPING
// ============================================================================

/// How resolution ended for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Table and every required role resolved; domain is queryable.
    Resolved,
    /// No candidate table exists in the schema.
    TableNotFound,
    /// A table was found, but a required role has no matching column.
    ColumnsUnresolvable,
}

/// The immutable result of resolving one domain against the live schema.
///
/// Produced once at process start and shared read-only afterwards;
/// re-resolution requires a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    pub domain: Domain,
    /// Resolved table name, if any candidate existed.
    pub table: Option<String>,
    /// Role -> actual column name (catalog casing preserved).
    pub columns: BTreeMap<ColumnRole, String>,
    pub outcome: ResolutionOutcome,
}

impl DomainMapping {
    /// Mapping for a domain whose table was not found.
    pub fn table_not_found(domain: Domain) -> Self {
        Self {
            domain,
            table: None,
            columns: BTreeMap::new(),
            outcome: ResolutionOutcome::TableNotFound,
        }
    }

    /// Match `columns` (the live column names of `table`) against the
    /// domain's role candidates. Pure: no catalog access.
    pub fn from_columns(domain: Domain, table: impl Into<String>, columns: &[String]) -> Self {
        let mut resolved = BTreeMap::new();
        for &role in domain.roles() {
            if let Some(name) = first_match(columns, domain.role_candidates(role)) {
                resolved.insert(role, name);
            }
        }

        let mut mapping = Self {
            domain,
            table: Some(table.into()),
            columns: resolved,
            outcome: ResolutionOutcome::Resolved,
        };
        if !mapping.required_roles_met() {
            mapping.outcome = ResolutionOutcome::ColumnsUnresolvable;
        }
        mapping
    }

    /// Actual column name resolved for `role`, if any.
    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    /// The column used for ordering and range filters: the start time for
    /// sleep sessions (falling back to the date column), the date column
    /// everywhere else.
    pub fn order_column(&self) -> Option<&str> {
        match self.domain {
            Domain::Sleep => self
                .column(ColumnRole::Start)
                .or_else(|| self.column(ColumnRole::Date)),
            _ => self.column(ColumnRole::Date),
        }
    }

    /// The primary reading column, if resolved.
    pub fn value_column(&self) -> Option<&str> {
        match self.domain {
            // Sleep has no single reading; duration is the closest analogue.
            Domain::Sleep => self.column(ColumnRole::Duration),
            _ => self.column(ColumnRole::Value),
        }
    }

    /// True when every role the domain's queries depend on is resolved.
    fn required_roles_met(&self) -> bool {
        match self.domain {
            Domain::Weight | Domain::Steps | Domain::HeartRate => {
                self.column(ColumnRole::Date).is_some() && self.column(ColumnRole::Value).is_some()
            }
            Domain::Sleep => self.order_column().is_some(),
        }
    }

    /// True when the domain's query operations may run. Unavailable domains
    /// answer every query with an empty no-op result.
    pub fn is_available(&self) -> bool {
        self.outcome == ResolutionOutcome::Resolved
    }
}

/// First candidate whose case-insensitive form matches an existing column;
/// returns the column's actual casing.
fn first_match(columns: &[String], candidates: &[&str]) -> Option<String> {
    for cand in candidates {
        if let Some(col) = columns.iter().find(|c| c.eq_ignore_ascii_case(cand)) {
            return Some(col.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_match_is_candidate_priority_not_column_order() {
        let columns = cols(&["id", "weight", "weight_kg"]);
        // weight_kg outranks weight in the candidate list even though the
        // column list has weight first.
        assert_eq!(
            first_match(&columns, Domain::Weight.role_candidates(ColumnRole::Value)),
            Some("weight_kg".to_string())
        );
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_actual_casing() {
        let columns = cols(&["ID", "Measured_At", "Weight_KG"]);
        let mapping = DomainMapping::from_columns(Domain::Weight, "weight", &columns);
        assert_eq!(mapping.column(ColumnRole::Date), Some("Measured_At"));
        assert_eq!(mapping.column(ColumnRole::Value), Some("Weight_KG"));
        assert!(mapping.is_available());
    }

    #[test]
    fn weight_resolution_example() {
        let columns = cols(&["id", "measured_at", "weight_kg"]);
        let mapping = DomainMapping::from_columns(Domain::Weight, "measurements_weight", &columns);
        assert_eq!(mapping.outcome, ResolutionOutcome::Resolved);
        assert_eq!(mapping.column(ColumnRole::Date), Some("measured_at"));
        assert_eq!(mapping.column(ColumnRole::Value), Some("weight_kg"));
        assert_eq!(mapping.column(ColumnRole::Source), None);
        assert_eq!(mapping.order_column(), Some("measured_at"));
    }

    #[test]
    fn missing_required_role_marks_unavailable() {
        let columns = cols(&["id", "weight_kg"]);
        let mapping = DomainMapping::from_columns(Domain::Weight, "weight", &columns);
        assert_eq!(mapping.outcome, ResolutionOutcome::ColumnsUnresolvable);
        assert!(!mapping.is_available());
    }

    #[test]
    fn missing_optional_role_is_absent_not_fatal() {
        let columns = cols(&["date", "steps"]);
        let mapping = DomainMapping::from_columns(Domain::Steps, "steps_daily", &columns);
        assert!(mapping.is_available());
        assert_eq!(mapping.column(ColumnRole::Source), None);
    }

    #[test]
    fn sleep_accepts_start_or_date_fallback() {
        let with_start = DomainMapping::from_columns(
            Domain::Sleep,
            "sleep_sessions",
            &cols(&["bedtime", "wake_time", "duration_minutes"]),
        );
        assert!(with_start.is_available());
        assert_eq!(with_start.order_column(), Some("bedtime"));

        let date_only =
            DomainMapping::from_columns(Domain::Sleep, "sleep", &cols(&["night", "stages"]));
        assert!(date_only.is_available());
        assert_eq!(date_only.order_column(), Some("night"));

        let neither = DomainMapping::from_columns(Domain::Sleep, "sleep", &cols(&["id", "notes"]));
        assert_eq!(neither.outcome, ResolutionOutcome::ColumnsUnresolvable);
    }

    #[test]
    fn heart_rate_resolves_min_max_when_present() {
        let mapping = DomainMapping::from_columns(
            Domain::HeartRate,
            "heart_rate_daily",
            &cols(&["day", "avg_bpm", "min_bpm", "max_bpm"]),
        );
        assert!(mapping.is_available());
        assert_eq!(mapping.column(ColumnRole::Value), Some("avg_bpm"));
        assert_eq!(mapping.column(ColumnRole::Min), Some("min_bpm"));
        assert_eq!(mapping.column(ColumnRole::Max), Some("max_bpm"));
    }

    #[test]
    fn table_not_found_mapping_is_unavailable() {
        let mapping = DomainMapping::table_not_found(Domain::Steps);
        assert!(!mapping.is_available());
        assert_eq!(mapping.table, None);
        assert_eq!(mapping.order_column(), None);
    }

    #[test]
    fn every_candidate_name_is_a_safe_identifier() {
        // Candidates are interpolated after quoting; the lists themselves
        // must satisfy the identifier grammar.
        for domain in Domain::ALL {
            for table in domain.table_candidates() {
                assert!(crate::identifier::is_safe_identifier(table), "{table}");
            }
            for &role in domain.roles() {
                for col in domain.role_candidates(role) {
                    assert!(crate::identifier::is_safe_identifier(col), "{col}");
                }
            }
        }
    }
}
