//! Startup Domain Resolution
//!
//! Matches each health-data domain's candidate tables and columns against
//! the live schema once at bootstrap. All four domains resolve
//! concurrently with independent failure isolation: a database error while
//! probing one domain leaves only that domain unavailable.
//!
//! The result is an immutable [`DomainMap`] threaded to consumers by
//! value/`Arc`, never ambient global state.

use std::collections::HashMap;

use dbscout_core::{Domain, DomainMapping, ResolutionOutcome};
use futures_util::future::join_all;

use crate::catalog::SchemaCatalog;
use crate::error::EngineResult;

/// Immutable mapping of every domain, produced once per process.
#[derive(Debug, Clone)]
pub struct DomainMap {
    inner: HashMap<Domain, DomainMapping>,
}

impl DomainMap {
    pub fn get(&self, domain: Domain) -> &DomainMapping {
        // Resolution always produces an entry per domain.
        &self.inner[&domain]
    }

    /// Domains whose queries may run.
    pub fn available(&self) -> Vec<Domain> {
        Domain::ALL
            .into_iter()
            .filter(|d| self.get(*d).is_available())
            .collect()
    }
}

/// Resolve all domains against the catalog concurrently.
pub async fn resolve_all(catalog: &SchemaCatalog) -> DomainMap {
    let futures = Domain::ALL.map(|domain| resolve_domain(catalog, domain));
    let results = join_all(futures).await;

    let mut inner = HashMap::new();
    for (domain, result) in Domain::ALL.into_iter().zip(results) {
        let mapping = match result {
            Ok(mapping) => mapping,
            Err(err) => {
                // Failure isolation: a probe error downgrades this domain
                // only.
                tracing::warn!(domain = %domain, error = %err, "domain resolution failed");
                DomainMapping::table_not_found(domain)
            }
        };
        match mapping.outcome {
            ResolutionOutcome::Resolved => {
                tracing::info!(
                    domain = %domain,
                    table = mapping.table.as_deref().unwrap_or(""),
                    "domain ready"
                );
            }
            ResolutionOutcome::TableNotFound => {
                tracing::info!(domain = %domain, "domain unavailable: no candidate table found");
            }
            ResolutionOutcome::ColumnsUnresolvable => {
                tracing::info!(
                    domain = %domain,
                    table = mapping.table.as_deref().unwrap_or(""),
                    "domain unavailable: required columns unresolvable"
                );
            }
        }
        inner.insert(domain, mapping);
    }

    DomainMap { inner }
}

/// Resolve one domain: first existing candidate table wins (remaining
/// candidates are ignored even if present), then roles match against its
/// live columns.
async fn resolve_domain(catalog: &SchemaCatalog, domain: Domain) -> EngineResult<DomainMapping> {
    let mut table = None;
    for candidate in domain.table_candidates() {
        if catalog.table_exists(candidate).await? {
            table = Some(*candidate);
            break;
        }
    }
    let Some(table) = table else {
        return Ok(DomainMapping::table_not_found(domain));
    };

    let columns: Vec<String> = catalog
        .list_columns(table)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    Ok(DomainMapping::from_columns(domain, table, &columns))
}
