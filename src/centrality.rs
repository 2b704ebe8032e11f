//! Delegated centrality: PageRank and Betweenness.
//!
//! PageRank falls back to degree centrality when the store cannot run it;
//! Betweenness has no cheap approximation and comes back empty instead.

use crate::config::{validate_page_rank, AnalyzerConfig};
use crate::cypher::patterns;
use crate::delegate::{self, Algorithm, AlgorithmCall};
use crate::executor::QueryExecutor;
use crate::filter::{FilterComposer, SubgraphFilter};
use crate::metrics::MetricsEngine;
use crate::model::{CentralityScores, Direction, Record, Scalar};
use crate::Result;

pub struct CentralityDelegate<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    config: &'a AnalyzerConfig,
    composer: FilterComposer,
}

impl<'a, E: QueryExecutor + ?Sized> CentralityDelegate<'a, E> {
    pub fn new(executor: &'a E, config: &'a AnalyzerConfig) -> Self {
        Self {
            executor,
            config,
            composer: FilterComposer::new(config.substitution),
        }
    }

    /// PageRank with the configured damping factor and iteration count.
    pub async fn page_rank(&self, filter: &SubgraphFilter) -> Result<CentralityScores> {
        let defaults = self.config.page_rank;
        self.page_rank_with(defaults.damping, defaults.iterations, filter).await
    }

    /// PageRank; on any failure of the delegated call, degree centrality
    /// over both directions.
    pub async fn page_rank_with(
        &self,
        damping: f64,
        iterations: u32,
        filter: &SubgraphFilter,
    ) -> Result<CentralityScores> {
        validate_page_rank(damping, iterations)?;
        let call = self.call(Algorithm::PageRank, filter)
            .setting("dampingFactor", damping)
            .setting("maxIterations", iterations);

        let outcome = self.stream_scores(&call).await;
        match delegate::settle(Algorithm::PageRank, outcome)? {
            Some(scores) => Ok(scores),
            None => {
                MetricsEngine::new(self.executor, self.config)
                    .degree_centrality(Direction::Both, filter)
                    .await
            }
        }
    }

    /// Betweenness; empty on any failure of the delegated call.
    pub async fn betweenness(&self, filter: &SubgraphFilter) -> Result<CentralityScores> {
        let call = self.call(Algorithm::Betweenness, filter);
        let outcome = self.stream_scores(&call).await;
        Ok(delegate::settle(Algorithm::Betweenness, outcome)?.unwrap_or_default())
    }

    fn call(&self, algorithm: Algorithm, filter: &SubgraphFilter) -> AlgorithmCall {
        let node = self.composer.compose_node(filter.node());
        let edges = self.composer.edges_of(filter);
        AlgorithmCall::new(
            algorithm,
            &self.config.procedures,
            patterns::node_selection(&node),
            patterns::relationship_selection(&edges, None),
        )
    }

    async fn stream_scores(&self, call: &AlgorithmCall) -> Result<CentralityScores> {
        let rows = delegate::invoke(self.executor, call).await?;
        scores_from(&rows)
    }
}

/// `(nodeId, score)` rows keyed by the node id's canonical string.
fn scores_from(rows: &[Record]) -> Result<CentralityScores> {
    let mut scores = CentralityScores::with_capacity(rows.len());
    for row in rows {
        let id = row.get::<Scalar>("nodeId")?.key();
        scores.insert(id, row.get::<f64>("score")?);
    }
    Ok(scores)
}
