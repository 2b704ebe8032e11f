//! Scripted in-memory executor.
//!
//! Answers patterns from a list of rules instead of a real store.
//! Each rule names one or more fragments; the first rule whose fragments
//! all occur in the issued pattern supplies the records. Unmatched patterns
//! return no records.
//!
//! ## Limitations
//!
//! - **No query evaluation**: patterns are matched by substring only, so
//!   rule order matters when one fragment is contained in another pattern.
//! - **Failures before rules**: a pattern matching a failure fragment fails
//!   even if a rule would also answer it.
//!
//! Use this executor for:
//! - Testing engines without a database
//! - Asserting on the exact patterns and parameters an operation issues

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::model::{Params, Record};
use crate::{Error, Result};
use super::{ExecutorCapabilities, QueryExecutor};

// ============================================================================
// ScriptedExecutor
// ============================================================================

/// Kind of failure a scripted pattern raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    Connection,
    Query,
}

/// A pattern and its parameters, as received.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedQuery {
    pub pattern: String,
    pub params: Params,
}

/// In-memory executor with canned answers.
#[derive(Clone)]
pub struct ScriptedExecutor {
    inner: Arc<ScriptedInner>,
}

struct ScriptedInner {
    rules: RwLock<Vec<Rule>>,
    failures: RwLock<Vec<(String, ScriptedFailure)>>,
    capabilities: RwLock<ExecutorCapabilities>,
    /// Every pattern received, in order.
    log: Mutex<Vec<IssuedQuery>>,
}

struct Rule {
    fragments: Vec<String>,
    records: Vec<Record>,
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                rules: RwLock::new(Vec::new()),
                failures: RwLock::new(Vec::new()),
                capabilities: RwLock::new(ExecutorCapabilities::default()),
                log: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Answer patterns containing `fragment` with `records`.
    pub fn respond(self, fragment: &str, records: Vec<Record>) -> Self {
        self.respond_all(&[fragment], records)
    }

    /// Answer patterns containing every one of `fragments` with `records`.
    pub fn respond_all(self, fragments: &[&str], records: Vec<Record>) -> Self {
        self.inner.rules.write().push(Rule {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            records,
        });
        self
    }

    /// Fail patterns containing `fragment`.
    pub fn fail_on(self, fragment: &str, failure: ScriptedFailure) -> Self {
        self.inner.failures.write().push((fragment.to_string(), failure));
        self
    }

    pub fn with_capabilities(self, capabilities: ExecutorCapabilities) -> Self {
        *self.inner.capabilities.write() = capabilities;
        self
    }

    /// Snapshot of every query received so far.
    pub fn issued(&self) -> Vec<IssuedQuery> {
        self.inner.log.lock().clone()
    }

    pub fn issued_count(&self) -> usize {
        self.inner.log.lock().len()
    }

    /// Patterns received that contain `fragment`.
    pub fn issued_matching(&self, fragment: &str) -> Vec<IssuedQuery> {
        self.inner.log.lock().iter()
            .filter(|q| q.pattern.contains(fragment))
            .cloned()
            .collect()
    }
}

// ============================================================================
// QueryExecutor impl
// ============================================================================

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn execute(&self, pattern: &str, params: Params) -> Result<Vec<Record>> {
        self.inner.log.lock().push(IssuedQuery {
            pattern: pattern.to_string(),
            params,
        });

        let failure = self.inner.failures.read().iter()
            .find(|(fragment, _)| pattern.contains(fragment.as_str()))
            .map(|(fragment, kind)| (fragment.clone(), *kind));
        if let Some((fragment, kind)) = failure {
            return Err(match kind {
                ScriptedFailure::Connection => Error::Connection(format!("scripted outage on '{fragment}'")),
                ScriptedFailure::Query => Error::Query(format!("scripted rejection of '{fragment}'")),
            });
        }

        let rules = self.inner.rules.read();
        let records = rules.iter()
            .find(|rule| rule.fragments.iter().all(|f| pattern.contains(f.as_str())))
            .map(|rule| rule.records.clone())
            .unwrap_or_default();
        Ok(records)
    }

    fn capabilities(&self) -> ExecutorCapabilities {
        self.inner.capabilities.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let exec = ScriptedExecutor::new()
            .respond_all(&["count(n)", "WHERE"], vec![Record::from([("count", 2)])])
            .respond("count(n)", vec![Record::from([("count", 4)])]);

        let filtered = exec.execute("MATCH (n) WHERE n.x RETURN count(n) AS count", Params::new()).await.unwrap();
        let all = exec.execute("MATCH (n) RETURN count(n) AS count", Params::new()).await.unwrap();
        assert_eq!(filtered[0].get::<u64>("count").unwrap(), 2);
        assert_eq!(all[0].get::<u64>("count").unwrap(), 4);
        assert_eq!(exec.issued_count(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_pattern_is_empty() {
        let exec = ScriptedExecutor::new();
        assert!(exec.execute("RETURN 1", Params::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_take_precedence() {
        let exec = ScriptedExecutor::new()
            .respond("gds.", vec![Record::new()])
            .fail_on("gds.", ScriptedFailure::Query);
        let err = exec.execute("CALL gds.pageRank.stream({})", Params::new()).await.unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert_eq!(exec.issued_matching("gds.").len(), 1);
    }
}
