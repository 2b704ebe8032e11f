//! # hypograph: graph metrics and statistical inference over any graph store
//!
//! Turns a query-execution capability into graph-level measurements
//! (density, degree distribution, centrality, modularity) and hypothesis
//! tests (frequentist and Bayesian) over a filtered node/edge subset,
//! without ever loading the graph into process memory. Every number is
//! derived from aggregate query results.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `QueryExecutor` is the only contract with the store
//! 2. **Stateless engines**: each call re-queries; nothing is cached
//! 3. **Pattern builders own nothing**: filters → Cypher is a pure function
//! 4. **Named failure policies**: delegated algorithms degrade predictably
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hypograph::{Analyzer, Direction, ScriptedExecutor, SubgraphFilter};
//!
//! # async fn example() -> hypograph::Result<()> {
//! let analyzer = Analyzer::new(ScriptedExecutor::new());
//! let adults = SubgraphFilter::all().with_node("n.age >= 18");
//!
//! let density = analyzer.metrics().density(None, &adults).await?;
//! let scores = analyzer.centrality().page_rank(&adults).await?;
//! let central = analyzer.metrics().degree_centrality(Direction::Both, &adults).await?;
//! # let _ = (density, scores, central);
//! # Ok(())
//! # }
//! ```
//!
//! ## Engines
//!
//! | Engine | Module | Computes |
//! |--------|--------|----------|
//! | `MetricsEngine` | `metrics` | density, degree distribution, degree centrality |
//! | `CentralityDelegate` | `centrality` | PageRank, betweenness (delegated) |
//! | `CommunityEngine` | `community` | label propagation (delegated), modularity |
//! | `InferenceEngine` | `inference` | z-test, ANOVA, correlation, chi-square |
//! | `BayesianEngine` | `bayes` | Beta-Binomial density, Bayes factor |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod cypher;
pub mod filter;
pub mod executor;
pub mod stats;
pub mod config;
pub mod delegate;
pub mod metrics;
pub mod centrality;
pub mod community;
pub mod inference;
pub mod bayes;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Scalar, Record, FromScalar, Params, Direction,
    CentralityScores, DegreeBucket, DegreeDistribution,
    HypothesisResult, ChiSquareResult, CommunityRun,
    Posterior, BetaBinomialResult,
};

// ============================================================================
// Re-exports: Executor, filters, config
// ============================================================================

pub use executor::{QueryExecutor, ExecutorCapabilities, ScriptedExecutor, ScriptedFailure};
pub use filter::{FilterComposer, SubgraphFilter, SubstitutionStrategy};
pub use config::AnalyzerConfig;
pub use delegate::{Algorithm, FailurePolicy};

// ============================================================================
// Re-exports: Engines
// ============================================================================

pub use metrics::MetricsEngine;
pub use centrality::CentralityDelegate;
pub use community::CommunityEngine;
pub use inference::{InferenceEngine, CorrelationMethod};
pub use bayes::BayesianEngine;

// ============================================================================
// Top-level Analyzer handle
// ============================================================================

/// The primary entry point. An `Analyzer` owns an executor and a
/// configuration and hands out engines that borrow both.
pub struct Analyzer<E: QueryExecutor> {
    executor: E,
    config: AnalyzerConfig,
}

impl<E: QueryExecutor> Analyzer<E> {
    /// Create an Analyzer with the default configuration.
    pub fn new(executor: E) -> Self {
        Self { executor, config: AnalyzerConfig::default() }
    }

    /// Create an Analyzer with `config`, rejecting invalid values.
    pub fn with_config(executor: E, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { executor, config })
    }

    /// Access the underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsEngine<'_, E> {
        MetricsEngine::new(&self.executor, &self.config)
    }

    pub fn centrality(&self) -> CentralityDelegate<'_, E> {
        CentralityDelegate::new(&self.executor, &self.config)
    }

    pub fn community(&self) -> CommunityEngine<'_, E> {
        CommunityEngine::new(&self.executor, &self.config)
    }

    pub fn inference(&self) -> InferenceEngine<'_, E> {
        InferenceEngine::new(&self.executor, &self.config)
    }

    pub fn bayes(&self) -> BayesianEngine<'_, E> {
        BayesianEngine::new(&self.executor, &self.config)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cypher syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Insufficient data: need at least {required}, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("Delegated algorithm unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
