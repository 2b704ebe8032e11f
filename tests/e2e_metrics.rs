//! End-to-end tests for density, degree distribution and degree centrality.
//!
//! Each test scripts the aggregate answers a store would give and checks
//! both the computed metric and the patterns that were issued.

use hypograph::{
    Analyzer, AnalyzerConfig, Direction, Error, Record, Scalar, ScriptedExecutor,
    SubgraphFilter, SubstitutionStrategy,
};
use pretty_assertions::assert_eq;

fn count(n: i64) -> Vec<Record> {
    vec![Record::from([("count", n)])]
}

fn value(v: f64) -> Vec<Record> {
    vec![Record::from([("value", v)])]
}

// ============================================================================
// Density
// ============================================================================

#[tokio::test]
async fn test_density_four_nodes_three_edges() {
    let exec = ScriptedExecutor::new()
        .respond("count(n) AS count", count(4))
        .respond("count(r) AS value", vec![Record::from([("value", 3)])]);
    let analyzer = Analyzer::new(exec);

    let density = analyzer.metrics().density(None, &SubgraphFilter::all()).await.unwrap();
    assert_eq!(density, 0.5);
}

#[tokio::test]
async fn test_weighted_density() {
    let exec = ScriptedExecutor::new()
        .respond("count(n) AS count", count(4))
        .respond("sum(r.weight) AS value", value(1.5));
    let analyzer = Analyzer::new(exec);

    let density = analyzer.metrics().density(Some("weight"), &SubgraphFilter::all()).await.unwrap();
    assert_eq!(density, 0.25);
}

#[tokio::test]
async fn test_weighted_density_is_not_renormalized() {
    let exec = ScriptedExecutor::new()
        .respond("count(n) AS count", count(2))
        .respond("sum(r.weight) AS value", value(10.0));
    let analyzer = Analyzer::new(exec);

    let density = analyzer.metrics().density(Some("weight"), &SubgraphFilter::all()).await.unwrap();
    assert_eq!(density, 10.0);
}

#[tokio::test]
async fn test_density_of_empty_graph() {
    let analyzer = Analyzer::new(ScriptedExecutor::new());
    let density = analyzer.metrics().density(None, &SubgraphFilter::all()).await.unwrap();
    assert_eq!(density, 0.0);
}

#[tokio::test]
async fn test_subgraph_filter_reaches_both_endpoints() {
    let exec = ScriptedExecutor::new()
        .respond("count(n) AS count", count(4))
        .respond("count(r) AS value", vec![Record::from([("value", 1)])]);
    let analyzer = Analyzer::new(exec);
    let filter = SubgraphFilter::all()
        .with_node("n.age > 20")
        .with_edge("r.since > 2000");

    analyzer.metrics().density(None, &filter).await.unwrap();

    let patterns: Vec<String> = analyzer.executor().issued().into_iter().map(|q| q.pattern).collect();
    assert_eq!(
        patterns,
        vec![
            "MATCH (n) WHERE (n.age > 20) RETURN count(n) AS count".to_string(),
            "MATCH (n)-[r]->(m) WHERE (n.age > 20) AND (m.age > 20) AND (r.since > 2000) \
             RETURN count(r) AS value"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_textual_substitution_rewrites_string_literals() {
    let exec = ScriptedExecutor::new().respond("count(n) AS count", count(3));
    let analyzer = Analyzer::new(exec);
    let filter = SubgraphFilter::all().with_node("n.name = 'Ann'");

    analyzer.metrics().density(None, &filter).await.unwrap();

    let edge = &analyzer.executor().issued_matching("count(r)")[0];
    assert!(edge.pattern.contains("(m.mame = 'Amm')"));
}

#[tokio::test]
async fn test_identifier_substitution_leaves_literals_alone() {
    let exec = ScriptedExecutor::new().respond("count(n) AS count", count(3));
    let config = AnalyzerConfig { substitution: SubstitutionStrategy::Identifier, ..Default::default() };
    let analyzer = Analyzer::with_config(exec, config).unwrap();
    let filter = SubgraphFilter::all().with_node("n.name = 'Ann'");

    analyzer.metrics().density(None, &filter).await.unwrap();

    let edge = &analyzer.executor().issued_matching("count(r)")[0];
    assert!(edge.pattern.contains("(n.name = 'Ann') AND (m.name = 'Ann')"));
}

// ============================================================================
// Degree distribution
// ============================================================================

#[tokio::test]
async fn test_degree_distribution_includes_isolated_nodes() {
    let exec = ScriptedExecutor::new().respond(
        "RETURN degree, count(n) AS count",
        vec![
            Record::from([("degree", 1), ("count", 2)]),
            Record::from([("degree", 0), ("count", 1)]),
            Record::from([("degree", 2), ("count", 1)]),
        ],
    );
    let analyzer = Analyzer::new(exec);

    let dist = analyzer.metrics().degree_distribution(None, &SubgraphFilter::all()).await.unwrap();
    let pairs: Vec<(f64, u64)> = dist.iter().map(|b| (b.degree, b.count)).collect();
    assert_eq!(pairs, vec![(0.0, 1), (1.0, 2), (2.0, 1)]);
    assert_eq!(dist.node_count(), 4);

    let issued = &analyzer.executor().issued()[0];
    assert!(issued.pattern.contains("OPTIONAL MATCH (n)-[r]-(m)"));
}

#[tokio::test]
async fn test_weighted_degree_distribution_pattern() {
    let analyzer = Analyzer::new(ScriptedExecutor::new());
    let filter = SubgraphFilter::all().with_node("n:User");

    let dist = analyzer.metrics().degree_distribution(Some("w"), &filter).await.unwrap();
    assert!(dist.is_empty());

    let issued = &analyzer.executor().issued()[0];
    assert_eq!(
        issued.pattern,
        "MATCH (n) WHERE (n:User) OPTIONAL MATCH (n)-[r]-(m) WHERE (m:User) \
         WITH n, sum(coalesce(r.w, 0)) AS degree RETURN degree, count(n) AS count ORDER BY degree"
    );
}

// ============================================================================
// Degree centrality
// ============================================================================

#[tokio::test]
async fn test_degree_centrality_five_nodes() {
    let exec = ScriptedExecutor::new()
        .respond("count(n) AS count", count(5))
        .respond(
            "count(r) AS degree",
            vec![
                Record::from([("id", 0), ("degree", 3)]),
                Record::from([("id", 1), ("degree", 1)]),
                Record::from([("id", 2), ("degree", 0)]),
            ],
        );
    let analyzer = Analyzer::new(exec);

    let scores = analyzer
        .metrics()
        .degree_centrality(Direction::Both, &SubgraphFilter::all())
        .await
        .unwrap();
    assert_eq!(scores["0"], 0.75);
    assert_eq!(scores["1"], 0.25);
    assert_eq!(scores["2"], 0.0);
}

#[tokio::test]
async fn test_degree_centrality_empty_for_single_node() {
    for n in [0, 1] {
        let exec = ScriptedExecutor::new().respond("count(n) AS count", count(n));
        let analyzer = Analyzer::new(exec);
        let scores = analyzer
            .metrics()
            .degree_centrality(Direction::Out, &SubgraphFilter::all())
            .await
            .unwrap();
        assert!(scores.is_empty());
        assert_eq!(analyzer.executor().issued_count(), 1);
    }
}

#[tokio::test]
async fn test_degree_centrality_direction_patterns() {
    let exec = ScriptedExecutor::new().respond("count(n) AS count", count(3));
    let analyzer = Analyzer::new(exec);

    for direction in [Direction::In, Direction::Out] {
        analyzer.metrics().degree_centrality(direction, &SubgraphFilter::all()).await.unwrap();
    }
    let degree_queries = analyzer.executor().issued_matching("count(r) AS degree");
    assert!(degree_queries[0].pattern.contains("(n)<-[r]-(m)"));
    assert!(degree_queries[1].pattern.contains("(n)-[r]->(m)"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_connection_failure_surfaces() {
    let exec = ScriptedExecutor::new().fail_on("count(n)", hypograph::ScriptedFailure::Connection);
    let analyzer = Analyzer::new(exec);
    let err = analyzer.metrics().density(None, &SubgraphFilter::all()).await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
}

#[tokio::test]
async fn test_negative_count_is_type_error() {
    let exec = ScriptedExecutor::new().respond("count(n) AS count", vec![Record::from([("count", Scalar::Int(-1))])]);
    let analyzer = Analyzer::new(exec);
    let err = analyzer.metrics().node_count(&SubgraphFilter::all()).await.unwrap_err();
    assert!(matches!(err, Error::TypeError { .. }));
}
