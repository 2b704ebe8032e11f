//! # Query Executor Trait
//!
//! This is THE contract between hypograph and any graph store.
//! Every metric and test is derived from what `execute()` returns.
//!
//! ## Implementations
//!
//! | Executor | Module | Description |
//! |----------|--------|-------------|
//! | `ScriptedExecutor` | `scripted` | Canned answers for testing/embedding |
//!
//! Driver adapters (Bolt, RedisGraph/FalkorDB, ...) live outside this crate
//! and implement [`QueryExecutor`] directly.

pub mod scripted;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::model::{Params, Record};
use crate::{Error, Result};

pub use scripted::{ScriptedExecutor, ScriptedFailure, IssuedQuery};

// ============================================================================
// Capabilities
// ============================================================================

/// What an executor declares about itself.
///
/// All fields default to "not declared". Executors override via `capabilities()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorCapabilities {
    /// Delegated algorithms the store can run (`pagerank`, `betweenness`,
    /// `label-propagation`). `None` means the executor does not say, so
    /// delegated calls are attempted and their failure resolved by policy.
    pub delegated_algorithms: Option<Vec<String>>,
}

impl ExecutorCapabilities {
    /// Declare a fixed set of delegated algorithms.
    pub fn with_algorithms<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delegated_algorithms: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Declare that no delegated algorithm facility exists.
    pub fn without_algorithms() -> Self {
        Self { delegated_algorithms: Some(Vec::new()) }
    }

    /// False only when the executor explicitly excludes `algorithm`.
    pub fn may_run(&self, algorithm: &str) -> bool {
        match &self.delegated_algorithms {
            None => true,
            Some(names) => names.iter().any(|n| n == algorithm),
        }
    }
}

// ============================================================================
// QueryExecutor Trait
// ============================================================================

/// The query-execution contract.
///
/// Implementations must fail with [`Error::Connection`] when the store is
/// unreachable and [`Error::Query`] when it rejects a pattern. No retries
/// happen above this trait.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `pattern` with `params` and return every record.
    async fn execute(&self, pattern: &str, params: Params) -> Result<Vec<Record>>;

    /// Report what this executor can do.
    fn capabilities(&self) -> ExecutorCapabilities {
        ExecutorCapabilities::default()
    }
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    async fn execute(&self, pattern: &str, params: Params) -> Result<Vec<Record>> {
        (**self).execute(pattern, params).await
    }

    fn capabilities(&self) -> ExecutorCapabilities {
        (**self).capabilities()
    }
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for Box<E> {
    async fn execute(&self, pattern: &str, params: Params) -> Result<Vec<Record>> {
        (**self).execute(pattern, params).await
    }

    fn capabilities(&self) -> ExecutorCapabilities {
        (**self).capabilities()
    }
}

// ============================================================================
// Call helpers shared by the engines
// ============================================================================

/// Issue one pattern. Every query the engines send goes through here.
pub(crate) async fn fetch<E: QueryExecutor + ?Sized>(
    executor: &E,
    pattern: &str,
    params: Params,
) -> Result<Vec<Record>> {
    debug!(pattern, params = params.len(), "issuing query");
    let records = executor.execute(pattern, params).await?;
    debug!(rows = records.len(), "query returned");
    Ok(records)
}

/// Issue an aggregate pattern and read `field` from its single row.
///
/// An empty result or a `null` aggregate reads as `None`.
pub(crate) async fn fetch_aggregate<E: QueryExecutor + ?Sized>(
    executor: &E,
    pattern: &str,
    field: &str,
) -> Result<Option<f64>> {
    let records = fetch(executor, pattern, Params::new()).await?;
    match records.first() {
        Some(row) => row.get_opt::<f64>(field),
        None => Ok(None),
    }
}

/// Issue a `count(...)` pattern and read `field` as a non-negative count.
pub(crate) async fn fetch_count<E: QueryExecutor + ?Sized>(
    executor: &E,
    pattern: &str,
    field: &str,
) -> Result<u64> {
    let records = fetch(executor, pattern, Params::new()).await?;
    match records.first() {
        Some(row) => Ok(row.get_opt::<u64>(field)?.unwrap_or(0)),
        None => Ok(0),
    }
}

/// Reject property names that would change the shape of a generated pattern.
///
/// Property keys cannot be passed as parameters in Cypher, so they are
/// interpolated; anything but a plain identifier is refused.
pub(crate) fn property_key(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(Error::Config(format!("invalid property name: {name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_capabilities_allow_attempt() {
        let caps = ExecutorCapabilities::default();
        assert!(caps.may_run("pagerank"));
    }

    #[test]
    fn test_declared_capabilities() {
        let caps = ExecutorCapabilities::with_algorithms(["pagerank"]);
        assert!(caps.may_run("pagerank"));
        assert!(!caps.may_run("betweenness"));
        assert!(!ExecutorCapabilities::without_algorithms().may_run("pagerank"));
    }

    #[test]
    fn test_property_key_validation() {
        assert_eq!(property_key("weight").unwrap(), "weight");
        assert_eq!(property_key("_score2").unwrap(), "_score2");
        assert!(property_key("").is_err());
        assert!(property_key("2x").is_err());
        assert!(property_key("w) RETURN 1 //").is_err());
    }
}
