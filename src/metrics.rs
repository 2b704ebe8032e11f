//! Graph-level metrics from aggregate counts.
//!
//! Density, degree distribution and degree centrality. Each is one or two
//! aggregate queries plus arithmetic; no adjacency is ever held in memory.

use crate::config::AnalyzerConfig;
use crate::cypher::patterns;
use crate::executor::{self, property_key, QueryExecutor};
use crate::filter::{FilterComposer, SubgraphFilter};
use crate::model::{CentralityScores, DegreeBucket, DegreeDistribution, Direction, Params, Scalar};
use crate::Result;

pub struct MetricsEngine<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    composer: FilterComposer,
}

impl<'a, E: QueryExecutor + ?Sized> MetricsEngine<'a, E> {
    pub fn new(executor: &'a E, config: &AnalyzerConfig) -> Self {
        Self {
            executor,
            composer: FilterComposer::new(config.substitution),
        }
    }

    /// Number of nodes matching the node filter.
    pub async fn node_count(&self, filter: &SubgraphFilter) -> Result<u64> {
        let node = self.composer.compose_node(filter.node());
        executor::fetch_count(self.executor, &patterns::node_count(&node), "count").await
    }

    /// Directed edge count, or total `weight`, between selected nodes.
    ///
    /// A `null` sum (no matching edges) reads as `0`.
    pub async fn edge_aggregate(&self, weight: Option<&str>, filter: &SubgraphFilter) -> Result<f64> {
        let weight = weight.map(property_key).transpose()?;
        let edges = self.composer.edges_of(filter);
        let value = executor::fetch_aggregate(self.executor, &patterns::edge_aggregate(&edges, weight), "value").await?;
        Ok(value.unwrap_or(0.0))
    }

    /// `2·E / (n(n−1))`, or `0.0` below two nodes.
    ///
    /// The factor 2 applies to weighted sums as well; weighted density is
    /// not bounded by 1.
    pub async fn density(&self, weight: Option<&str>, filter: &SubgraphFilter) -> Result<f64> {
        let n = self.node_count(filter).await?;
        if n < 2 {
            return Ok(0.0);
        }
        let edges = self.edge_aggregate(weight, filter).await?;
        let n = n as f64;
        Ok(2.0 * edges / (n * (n - 1.0)))
    }

    /// Node counts per (possibly weighted) undirected degree, ascending.
    pub async fn degree_distribution(
        &self,
        weight: Option<&str>,
        filter: &SubgraphFilter,
    ) -> Result<DegreeDistribution> {
        let weight = weight.map(property_key).transpose()?;
        let node = self.composer.compose_node(filter.node());
        let neighbor = self.composer.compose_neighbor(filter.node(), filter.edge());
        let pattern = patterns::degree_distribution(&node, &neighbor, weight);

        let rows = executor::fetch(self.executor, &pattern, Params::new()).await?;
        let mut buckets = Vec::with_capacity(rows.len());
        for row in &rows {
            buckets.push(DegreeBucket {
                degree: row.get_opt::<f64>("degree")?.unwrap_or(0.0),
                count: row.get::<u64>("count")?,
            });
        }
        Ok(DegreeDistribution::from_buckets(buckets))
    }

    /// Per-node degree in `direction` over `n − 1`; empty when `n ≤ 1`.
    pub async fn degree_centrality(
        &self,
        direction: Direction,
        filter: &SubgraphFilter,
    ) -> Result<CentralityScores> {
        let n = self.node_count(filter).await?;
        if n <= 1 {
            return Ok(CentralityScores::new());
        }
        let node = self.composer.compose_node(filter.node());
        let neighbor = self.composer.compose_neighbor(filter.node(), filter.edge());
        let pattern = patterns::degree_per_node(direction, &node, &neighbor);

        let rows = executor::fetch(self.executor, &pattern, Params::new()).await?;
        let denom = (n - 1) as f64;
        let mut scores = CentralityScores::with_capacity(rows.len());
        for row in &rows {
            let id = row.get::<Scalar>("id")?.key();
            let degree = row.get_opt::<f64>("degree")?.unwrap_or(0.0);
            scores.insert(id, degree / denom);
        }
        Ok(scores)
    }
}
