//! Delegated graph algorithms.
//!
//! PageRank, Betweenness and Label Propagation are never computed here.
//! They are invoked through the store's procedure facility (Neo4j GDS
//! `CALL gds.*` by default) with a node-selection sub-query and a
//! relationship-selection sub-query, both passed as parameters.
//!
//! The facility may be missing. Each algorithm carries a fixed
//! [`FailurePolicy`] that decides what its caller sees when the call fails:
//!
//! | Algorithm | Policy | Caller sees |
//! |-----------|--------|-------------|
//! | PageRank | `Fallback` | degree centrality |
//! | Betweenness | `Absorb` | empty scores |
//! | Label Propagation | `Propagate` | the error |

use std::fmt;

use tracing::{info, warn};

use crate::config::ProcedureNames;
use crate::executor::{self, QueryExecutor};
use crate::model::{self, Params, Record, Scalar};
use crate::{Error, Result};

// ============================================================================
// Algorithm registry
// ============================================================================

/// The delegated algorithms this crate knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    PageRank,
    Betweenness,
    LabelPropagation,
}

/// What to do when a delegated call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Substitute an approximation computed from aggregate queries.
    Fallback,
    /// Swallow the failure and return an empty result.
    Absorb,
    /// Surface the failure to the caller.
    Propagate,
}

impl Algorithm {
    /// Capability name, as listed in `ExecutorCapabilities`.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::PageRank => "pagerank",
            Algorithm::Betweenness => "betweenness",
            Algorithm::LabelPropagation => "label-propagation",
        }
    }

    pub fn policy(self) -> FailurePolicy {
        match self {
            Algorithm::PageRank => FailurePolicy::Fallback,
            Algorithm::Betweenness => FailurePolicy::Absorb,
            Algorithm::LabelPropagation => FailurePolicy::Propagate,
        }
    }

    /// Columns yielded by the procedure.
    pub fn yields(self) -> &'static [&'static str] {
        match self {
            Algorithm::PageRank | Algorithm::Betweenness => &["nodeId", "score"],
            Algorithm::LabelPropagation => &["nodeCount", "communityCount", "ranIterations", "didConverge"],
        }
    }

    /// Procedure name in the target store.
    pub fn procedure(self, names: &ProcedureNames) -> &str {
        match self {
            Algorithm::PageRank => &names.page_rank,
            Algorithm::Betweenness => &names.betweenness,
            Algorithm::LabelPropagation => &names.label_propagation,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Call building
// ============================================================================

/// One delegated procedure call: sub-queries plus algorithm settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmCall {
    pub algorithm: Algorithm,
    pub procedure: String,
    pub node_query: String,
    pub relationship_query: String,
    /// Procedure configuration entries, each bound as `$key`.
    pub settings: Vec<(&'static str, Scalar)>,
}

impl AlgorithmCall {
    pub fn new(
        algorithm: Algorithm,
        names: &ProcedureNames,
        node_query: String,
        relationship_query: String,
    ) -> Self {
        Self {
            algorithm,
            procedure: algorithm.procedure(names).to_string(),
            node_query,
            relationship_query,
            settings: Vec::new(),
        }
    }

    pub fn setting(mut self, key: &'static str, value: impl Into<Scalar>) -> Self {
        self.settings.push((key, value.into()));
        self
    }

    /// `CALL proc({nodeQuery: $nodeQuery, ...}) YIELD cols RETURN cols`
    pub fn pattern(&self) -> String {
        let mut entries = vec![
            "nodeQuery: $nodeQuery".to_string(),
            "relationshipQuery: $relationshipQuery".to_string(),
        ];
        entries.extend(self.settings.iter().map(|(key, _)| format!("{key}: ${key}")));
        let cols = self.algorithm.yields().join(", ");
        format!(
            "CALL {}({{{}}}) YIELD {cols} RETURN {cols}",
            self.procedure,
            entries.join(", "),
        )
    }

    pub fn params(&self) -> Params {
        let mut params = model::params([
            ("nodeQuery", self.node_query.as_str()),
            ("relationshipQuery", self.relationship_query.as_str()),
        ]);
        params.extend(self.settings.iter().map(|(key, value)| ((*key).to_string(), value.clone())));
        params
    }
}

// ============================================================================
// Invocation and policy
// ============================================================================

/// Run a delegated call.
///
/// Fails with [`Error::CapabilityUnavailable`] without issuing anything when
/// the executor explicitly does not offer the algorithm.
pub async fn invoke<E: QueryExecutor + ?Sized>(executor: &E, call: &AlgorithmCall) -> Result<Vec<Record>> {
    let algorithm = call.algorithm;
    if !executor.capabilities().may_run(algorithm.name()) {
        return Err(Error::CapabilityUnavailable(algorithm.name().to_string()));
    }
    let records = executor::fetch(executor, &call.pattern(), call.params()).await?;
    info!(%algorithm, procedure = %call.procedure, rows = records.len(), "delegated algorithm completed");
    Ok(records)
}

/// Apply `algorithm`'s failure policy to the outcome of its call.
///
/// - success → `Ok(Some(value))`
/// - `Fallback` → `Ok(None)`: the caller computes its approximation
/// - `Absorb` → `Ok(Some(T::default()))`
/// - `Propagate` → `Err(error)`
pub fn settle<T: Default>(algorithm: Algorithm, outcome: Result<T>) -> Result<Option<T>> {
    let err = match outcome {
        Ok(value) => return Ok(Some(value)),
        Err(err) => err,
    };
    match algorithm.policy() {
        FailurePolicy::Fallback => {
            warn!(%algorithm, error = %err, "delegated algorithm unavailable, falling back");
            Ok(None)
        }
        FailurePolicy::Absorb => {
            warn!(%algorithm, error = %err, "delegated algorithm unavailable, returning empty result");
            Ok(Some(T::default()))
        }
        FailurePolicy::Propagate => Err(err),
    }
}
