//! Community detection (delegated) and modularity (aggregated).

use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::cypher::patterns;
use crate::delegate::{self, Algorithm, AlgorithmCall};
use crate::executor::{self, property_key, QueryExecutor};
use crate::filter::{FilterComposer, SubgraphFilter};
use crate::metrics::MetricsEngine;
use crate::model::{CommunityRun, Params, Record, Scalar};
use crate::{Error, Result};

pub struct CommunityEngine<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    config: &'a AnalyzerConfig,
    composer: FilterComposer,
}

impl<'a, E: QueryExecutor + ?Sized> CommunityEngine<'a, E> {
    pub fn new(executor: &'a E, config: &'a AnalyzerConfig) -> Self {
        Self {
            executor,
            config,
            composer: FilterComposer::new(config.substitution),
        }
    }

    /// Run label propagation in the store, writing a community id to
    /// `write_property` on every selected node.
    ///
    /// There is no fallback: an unavailable or failing procedure is an error.
    pub async fn detect_communities(
        &self,
        write_property: &str,
        weight: Option<&str>,
        filter: &SubgraphFilter,
    ) -> Result<CommunityRun> {
        let write_property = property_key(write_property)?;
        let weight = weight.map(property_key).transpose()?;

        let node = self.composer.compose_node(filter.node());
        let edges = self.composer.edges_of(filter);
        let mut call = AlgorithmCall::new(
            Algorithm::LabelPropagation,
            &self.config.procedures,
            patterns::node_selection(&node),
            patterns::relationship_selection(&edges, weight),
        )
        .setting("writeProperty", write_property);
        if weight.is_some() {
            call = call.setting("relationshipWeightProperty", "weight");
        }

        let outcome = delegate::invoke(self.executor, &call)
            .await
            .and_then(|rows| summary_from(&rows));
        settled_run(delegate::settle(Algorithm::LabelPropagation, outcome)?)
    }

    /// Newman modularity of the partition stored in `community_property`:
    ///
    /// `Q = Σ_c [ e_c/m − (a_c/2m)² ]`
    ///
    /// `m` is the total (weighted) selected edge count, `e_c` the intra-community
    /// weight and `a_c` the summed undirected degree of community `c`.
    /// `0.0` when there are no edges. A negative total weight is used as is.
    pub async fn modularity(
        &self,
        community_property: &str,
        weight: Option<&str>,
        filter: &SubgraphFilter,
    ) -> Result<f64> {
        let community = property_key(community_property)?;
        let weight = weight.map(property_key).transpose()?;

        let m = MetricsEngine::new(self.executor, self.config)
            .edge_aggregate(weight, filter)
            .await?;
        if m == 0.0 {
            return Ok(0.0);
        }

        let edges = self.composer.edges_of(filter);
        let intra = patterns::intra_community_weight(&edges, community, weight);
        let intra = self.per_community(&intra, "weight").await?;

        let node = self.composer.compose_node(filter.node());
        let neighbor = self.composer.compose_neighbor(filter.node(), filter.edge());
        let degree = patterns::community_degree(&node, &neighbor, community, weight);
        let degree = self.per_community(&degree, "degree").await?;

        let mut q = 0.0;
        for (label, a_c) in &degree {
            let e_c = intra.get(label).copied().unwrap_or(0.0);
            q += e_c / m - (a_c / (2.0 * m)).powi(2);
        }
        // Intra-community edges whose community has no degree row still count
        for (label, e_c) in &intra {
            if !degree.contains_key(label) {
                q += e_c / m;
            }
        }
        Ok(q)
    }

    /// `(community, field)` rows summed per community label.
    async fn per_community(&self, pattern: &str, field: &str) -> Result<BTreeMap<String, f64>> {
        let rows = executor::fetch(self.executor, pattern, Params::new()).await?;
        let mut totals = BTreeMap::new();
        for row in &rows {
            let label = row.get::<Scalar>("community")?;
            if label.is_null() {
                continue;
            }
            let value = row.get_opt::<f64>(field)?.unwrap_or(0.0);
            *totals.entry(label.key()).or_insert(0.0) += value;
        }
        Ok(totals)
    }
}

/// Label propagation has no substitute result, so a settled call must carry one.
fn settled_run(settled: Option<CommunityRun>) -> Result<CommunityRun> {
    settled.ok_or_else(|| Error::CapabilityUnavailable(Algorithm::LabelPropagation.name().to_string()))
}

/// The single run-summary row yielded by a label-propagation write.
fn summary_from(rows: &[Record]) -> Result<CommunityRun> {
    let row = rows.first()
        .ok_or_else(|| Error::Query("label propagation returned no summary row".into()))?;
    Ok(CommunityRun {
        node_count: row.get("nodeCount")?,
        community_count: row.get("communityCount")?,
        iterations: row.get("ranIterations")?,
        converged: row.get("didConverge")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptedExecutor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_parsing() {
        let rows = vec![Record::from([
            ("nodeCount", Scalar::Int(10)),
            ("communityCount", Scalar::Int(3)),
            ("ranIterations", Scalar::Int(4)),
            ("didConverge", Scalar::Bool(true)),
        ])];
        assert_eq!(
            summary_from(&rows).unwrap(),
            CommunityRun { node_count: 10, community_count: 3, iterations: 4, converged: true }
        );
        assert!(matches!(summary_from(&[]), Err(Error::Query(_))));
    }

    #[test]
    fn test_settled_run_without_result_is_an_error() {
        assert!(matches!(
            settled_run(None),
            Err(Error::CapabilityUnavailable(name)) if name == "label-propagation"
        ));
        let run = CommunityRun { node_count: 2, community_count: 1, iterations: 1, converged: true };
        assert_eq!(settled_run(Some(run)).unwrap(), run);
    }

    #[tokio::test]
    async fn test_weighted_call_settings() {
        let exec = ScriptedExecutor::new().respond(
            "gds.labelPropagation.write",
            vec![Record::from([
                ("nodeCount", Scalar::Int(4)),
                ("communityCount", Scalar::Int(2)),
                ("ranIterations", Scalar::Int(3)),
                ("didConverge", Scalar::Bool(false)),
            ])],
        );
        let config = AnalyzerConfig::default();
        let run = CommunityEngine::new(&exec, &config)
            .detect_communities("community", Some("w"), &SubgraphFilter::all())
            .await
            .unwrap();
        assert_eq!(run.community_count, 2);
        assert!(!run.converged);

        let issued = exec.issued_matching("gds.labelPropagation.write");
        let params = &issued[0].params;
        assert_eq!(params["writeProperty"], Scalar::from("community"));
        assert_eq!(params["relationshipWeightProperty"], Scalar::from("weight"));
        assert_eq!(
            params["relationshipQuery"],
            Scalar::from("MATCH (n)-[r]->(m) RETURN id(n) AS source, id(m) AS target, r.w AS weight")
        );
    }

    #[tokio::test]
    async fn test_two_cliques_modularity() {
        // Two disjoint directed triangles: m = 6, e_c = 3, a_c = 6 each.
        // Q = 2 · (3/6 − (6/12)²) = 0.5
        let exec = ScriptedExecutor::new()
            .respond("count(r) AS value", vec![Record::from([("value", 6)])])
            .respond(
                "AS community, count(r) AS weight",
                vec![
                    Record::from([("community", Scalar::Int(1)), ("weight", Scalar::Int(3))]),
                    Record::from([("community", Scalar::Int(2)), ("weight", Scalar::Int(3))]),
                ],
            )
            .respond(
                "AS community, count(r) AS degree",
                vec![
                    Record::from([("community", Scalar::Int(1)), ("degree", Scalar::Int(6))]),
                    Record::from([("community", Scalar::Int(2)), ("degree", Scalar::Int(6))]),
                ],
            );
        let config = AnalyzerConfig::default();
        let q = CommunityEngine::new(&exec, &config)
            .modularity("community", None, &SubgraphFilter::all())
            .await
            .unwrap();
        assert!((q - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_negative_total_weight_is_not_treated_as_empty() {
        // m = −2, e_c = −1 and a_c = −2 for both: Q = 2 · (1/2 − (1/2)²) = 0.5
        let exec = ScriptedExecutor::new()
            .respond("sum(r.w) AS value", vec![Record::from([("value", -2.0)])])
            .respond(
                "AS community, sum(r.w) AS weight",
                vec![
                    Record::from([("community", Scalar::Int(1)), ("weight", Scalar::Float(-1.0))]),
                    Record::from([("community", Scalar::Int(2)), ("weight", Scalar::Float(-1.0))]),
                ],
            )
            .respond(
                "AS community, sum(coalesce(r.w, 0)) AS degree",
                vec![
                    Record::from([("community", Scalar::Int(1)), ("degree", Scalar::Float(-2.0))]),
                    Record::from([("community", Scalar::Int(2)), ("degree", Scalar::Float(-2.0))]),
                ],
            );
        let config = AnalyzerConfig::default();
        let q = CommunityEngine::new(&exec, &config)
            .modularity("community", Some("w"), &SubgraphFilter::all())
            .await
            .unwrap();
        assert!((q - 0.5).abs() < 1e-12);
        assert_eq!(exec.issued_count(), 3);
    }
}
