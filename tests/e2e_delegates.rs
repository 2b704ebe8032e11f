//! End-to-end tests for delegated algorithms and their failure policies.
//!
//! PageRank falls back to degree centrality, Betweenness absorbs to an
//! empty result, label propagation propagates the failure.

use hypograph::{
    Analyzer, AnalyzerConfig, CommunityRun, Direction, Error, ExecutorCapabilities, Record,
    Scalar, ScriptedExecutor, ScriptedFailure, SubgraphFilter,
};
use pretty_assertions::assert_eq;

fn degree_graph(exec: ScriptedExecutor) -> ScriptedExecutor {
    exec.respond("count(n) AS count", vec![Record::from([("count", 5)])])
        .respond(
            "count(r) AS degree",
            vec![
                Record::from([("id", 10), ("degree", 3)]),
                Record::from([("id", 11), ("degree", 2)]),
            ],
        )
}

fn summary() -> Vec<Record> {
    vec![Record::from([
        ("nodeCount", Scalar::Int(5)),
        ("communityCount", Scalar::Int(2)),
        ("ranIterations", Scalar::Int(6)),
        ("didConverge", Scalar::Bool(true)),
    ])]
}

// ============================================================================
// PageRank: Fallback
// ============================================================================

#[tokio::test]
async fn test_page_rank_streams_scores() {
    let exec = ScriptedExecutor::new().respond(
        "gds.pageRank.stream",
        vec![
            Record::from([("nodeId", Scalar::Int(10)), ("score", Scalar::Float(0.4))]),
            Record::from([("nodeId", Scalar::Int(11)), ("score", Scalar::Float(0.6))]),
        ],
    );
    let analyzer = Analyzer::new(exec);
    let filter = SubgraphFilter::all().with_node("n:Page");

    let scores = analyzer.centrality().page_rank(&filter).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores["11"], 0.6);

    let call = &analyzer.executor().issued_matching("gds.pageRank.stream")[0];
    assert_eq!(call.params["dampingFactor"], Scalar::Float(0.85));
    assert_eq!(call.params["maxIterations"], Scalar::Int(20));
    assert_eq!(call.params["nodeQuery"], Scalar::from("MATCH (n) WHERE (n:Page) RETURN id(n) AS id"));
    assert_eq!(
        call.params["relationshipQuery"],
        Scalar::from("MATCH (n)-[r]->(m) WHERE (n:Page) AND (m:Page) RETURN id(n) AS source, id(m) AS target")
    );
}

#[tokio::test]
async fn test_page_rank_explicit_settings() {
    let exec = ScriptedExecutor::new();
    let analyzer = Analyzer::new(exec);

    analyzer.centrality().page_rank_with(0.5, 7, &SubgraphFilter::all()).await.unwrap();

    let call = &analyzer.executor().issued_matching("gds.pageRank.stream")[0];
    assert_eq!(call.params["dampingFactor"], Scalar::Float(0.5));
    assert_eq!(call.params["maxIterations"], Scalar::Int(7));
}

#[tokio::test]
async fn test_page_rank_falls_back_on_query_error() {
    let exec = degree_graph(ScriptedExecutor::new()).fail_on("gds.pageRank", ScriptedFailure::Query);
    let analyzer = Analyzer::new(exec);

    let scores = analyzer.centrality().page_rank(&SubgraphFilter::all()).await.unwrap();
    let expected = analyzer
        .metrics()
        .degree_centrality(Direction::Both, &SubgraphFilter::all())
        .await
        .unwrap();
    assert_eq!(scores, expected);
    assert_eq!(scores["10"], 0.75);
}

#[tokio::test]
async fn test_page_rank_fallback_skips_undeclared_procedure() {
    let exec = degree_graph(ScriptedExecutor::new())
        .with_capabilities(ExecutorCapabilities::without_algorithms());
    let analyzer = Analyzer::new(exec);

    let scores = analyzer.centrality().page_rank(&SubgraphFilter::all()).await.unwrap();
    assert_eq!(scores["11"], 0.5);
    assert!(analyzer.executor().issued_matching("gds.").is_empty());
}

#[tokio::test]
async fn test_configured_procedure_name() {
    let mut config = AnalyzerConfig::default();
    config.procedures.page_rank = "algo.pageRank.stream".into();
    let analyzer = Analyzer::with_config(ScriptedExecutor::new(), config).unwrap();

    analyzer.centrality().page_rank(&SubgraphFilter::all()).await.unwrap();
    assert_eq!(analyzer.executor().issued_matching("CALL algo.pageRank.stream(").len(), 1);
}

// ============================================================================
// Betweenness: Absorb
// ============================================================================

#[tokio::test]
async fn test_betweenness_streams_scores() {
    let exec = ScriptedExecutor::new().respond(
        "gds.betweenness.stream",
        vec![Record::from([("nodeId", Scalar::Int(3)), ("score", Scalar::Float(4.0))])],
    );
    let analyzer = Analyzer::new(exec);

    let scores = analyzer.centrality().betweenness(&SubgraphFilter::all()).await.unwrap();
    assert_eq!(scores["3"], 4.0);
}

#[tokio::test]
async fn test_betweenness_absorbs_failure() {
    for failure in [ScriptedFailure::Connection, ScriptedFailure::Query] {
        let exec = degree_graph(ScriptedExecutor::new()).fail_on("gds.betweenness", failure);
        let analyzer = Analyzer::new(exec);

        let scores = analyzer.centrality().betweenness(&SubgraphFilter::all()).await.unwrap();
        assert!(scores.is_empty());
        // No approximation is attempted
        assert_eq!(analyzer.executor().issued_count(), 1);
    }
}

// ============================================================================
// Label propagation: Propagate
// ============================================================================

#[tokio::test]
async fn test_detect_communities_reports_summary() {
    let exec = ScriptedExecutor::new().respond("gds.labelPropagation.write", summary());
    let analyzer = Analyzer::new(exec);

    let run = analyzer
        .community()
        .detect_communities("community", None, &SubgraphFilter::all())
        .await
        .unwrap();
    assert_eq!(run, CommunityRun { node_count: 5, community_count: 2, iterations: 6, converged: true });

    let call = &analyzer.executor().issued()[0];
    assert_eq!(
        call.pattern,
        "CALL gds.labelPropagation.write({nodeQuery: $nodeQuery, relationshipQuery: $relationshipQuery, \
         writeProperty: $writeProperty}) YIELD nodeCount, communityCount, ranIterations, didConverge \
         RETURN nodeCount, communityCount, ranIterations, didConverge"
    );
    assert!(!call.params.contains_key("relationshipWeightProperty"));
}

#[tokio::test]
async fn test_detect_communities_propagates_failure() {
    let exec = ScriptedExecutor::new().fail_on("gds.labelPropagation", ScriptedFailure::Query);
    let analyzer = Analyzer::new(exec);

    let err = analyzer
        .community()
        .detect_communities("community", None, &SubgraphFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
}

#[tokio::test]
async fn test_detect_communities_unavailable() {
    let exec = ScriptedExecutor::new()
        .with_capabilities(ExecutorCapabilities::with_algorithms(["pagerank", "betweenness"]));
    let analyzer = Analyzer::new(exec);

    let err = analyzer
        .community()
        .detect_communities("community", None, &SubgraphFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CapabilityUnavailable(ref name) if name == "label-propagation"));
    assert_eq!(analyzer.executor().issued_count(), 0);
}

#[tokio::test]
async fn test_detect_communities_without_summary_row() {
    let analyzer = Analyzer::new(ScriptedExecutor::new());
    let err = analyzer
        .community()
        .detect_communities("community", None, &SubgraphFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
}

#[tokio::test]
async fn test_detect_communities_rejects_bad_property() {
    let analyzer = Analyzer::new(ScriptedExecutor::new());
    let err = analyzer
        .community()
        .detect_communities("community; DROP", None, &SubgraphFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

// ============================================================================
// Modularity
// ============================================================================

#[tokio::test]
async fn test_modularity_zero_without_edges() {
    let exec = ScriptedExecutor::new()
        .respond("count(r) AS value", vec![Record::from([("value", 0)])]);
    let analyzer = Analyzer::new(exec);

    let q = analyzer
        .community()
        .modularity("community", None, &SubgraphFilter::all())
        .await
        .unwrap();
    assert_eq!(q, 0.0);
    assert_eq!(analyzer.executor().issued_count(), 1);
}

#[tokio::test]
async fn test_modularity_zero_for_null_weight_sum() {
    let exec = ScriptedExecutor::new()
        .respond("sum(r.w) AS value", vec![Record::new().with("value", Scalar::Null)]);
    let analyzer = Analyzer::new(exec);

    let q = analyzer
        .community()
        .modularity("community", Some("w"), &SubgraphFilter::all())
        .await
        .unwrap();
    assert_eq!(q, 0.0);
}

#[tokio::test]
async fn test_modularity_single_community_is_zero() {
    // All 4 edges inside one community: Q = 4/4 − (8/8)² = 0
    let exec = ScriptedExecutor::new()
        .respond("count(r) AS value", vec![Record::from([("value", 4)])])
        .respond(
            "count(r) AS weight",
            vec![Record::from([("community", Scalar::from("a")), ("weight", Scalar::Int(4))])],
        )
        .respond(
            "count(r) AS degree",
            vec![Record::from([("community", Scalar::from("a")), ("degree", Scalar::Int(8))])],
        );
    let analyzer = Analyzer::new(exec);

    let q = analyzer
        .community()
        .modularity("community", None, &SubgraphFilter::all())
        .await
        .unwrap();
    assert!(q.abs() < 1e-12);
}

#[tokio::test]
async fn test_weighted_modularity_two_communities() {
    // m = 6, e_c = {3, 1.5}, a_c = {7.5, 4.5}
    // Q = (3/6 − (7.5/12)²) + (1.5/6 − (4.5/12)²) = 0.21875
    let exec = ScriptedExecutor::new()
        .respond("sum(r.w) AS value", vec![Record::from([("value", 6.0)])])
        .respond(
            "AS community, sum(r.w) AS weight",
            vec![
                Record::from([("community", Scalar::from("red")), ("weight", Scalar::Float(3.0))]),
                Record::from([("community", Scalar::from("blue")), ("weight", Scalar::Float(1.5))]),
            ],
        )
        .respond(
            "AS community, sum(coalesce(r.w, 0)) AS degree",
            vec![
                Record::from([("community", Scalar::from("red")), ("degree", Scalar::Float(7.5))]),
                Record::from([("community", Scalar::from("blue")), ("degree", Scalar::Float(4.5))]),
            ],
        );
    let analyzer = Analyzer::new(exec);

    let q = analyzer
        .community()
        .modularity("community", Some("w"), &SubgraphFilter::all())
        .await
        .unwrap();
    assert!((q - 0.21875).abs() < 1e-12, "modularity {q}");

    let issued: Vec<String> = analyzer.executor().issued().into_iter().map(|q| q.pattern).collect();
    assert_eq!(
        issued,
        vec![
            "MATCH (n)-[r]->(m) RETURN sum(r.w) AS value".to_string(),
            "MATCH (n)-[r]->(m) WHERE n.community IS NOT NULL AND n.community = m.community \
             RETURN n.community AS community, sum(r.w) AS weight"
                .to_string(),
            "MATCH (n) WHERE n.community IS NOT NULL OPTIONAL MATCH (n)-[r]-(m) \
             RETURN n.community AS community, sum(coalesce(r.w, 0)) AS degree"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_modularity_queries_share_filters() {
    let exec = ScriptedExecutor::new().respond("count(r) AS value", vec![Record::from([("value", 2)])]);
    let analyzer = Analyzer::new(exec);
    let filter = SubgraphFilter::all().with_node("n.x > 1").with_edge("r.y = 2");

    analyzer.community().modularity("group", None, &filter).await.unwrap();

    let issued: Vec<String> = analyzer.executor().issued().into_iter().map(|q| q.pattern).collect();
    assert_eq!(issued.len(), 3);
    assert_eq!(
        issued[1],
        "MATCH (n)-[r]->(m) WHERE n.group IS NOT NULL AND n.group = m.group \
         AND (n.x > 1) AND (m.x > 1) AND (r.y = 2) RETURN n.group AS community, count(r) AS weight"
    );
    assert_eq!(
        issued[2],
        "MATCH (n) WHERE n.group IS NOT NULL AND (n.x > 1) OPTIONAL MATCH (n)-[r]-(m) \
         WHERE (m.x > 1) AND (r.y = 2) RETURN n.group AS community, count(r) AS degree"
    );
}
