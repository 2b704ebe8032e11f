//! Pattern builders: every query string the engines issue.
//!
//! Conditions arrive already composed (see [`crate::filter`]); property names
//! arrive already validated. Nothing here touches the executor.

use crate::filter::FilterComposer;
use crate::model::Direction;

/// Join non-empty fragments with single spaces.
fn line(parts: &[&str]) -> String {
    parts.iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn where_with(conditions: &[String], extra: &[String]) -> String {
    let all: Vec<String> = extra.iter().chain(conditions).cloned().collect();
    FilterComposer::where_clause(&all)
}

fn weight_sum(weight: &str) -> String {
    format!("sum(coalesce(r.{weight}, 0))")
}

// ============================================================================
// Counting and aggregation
// ============================================================================

/// `count` of the selected nodes.
pub fn node_count(node: &[String]) -> String {
    line(&["MATCH (n)", &FilterComposer::where_clause(node), "RETURN count(n) AS count"])
}

/// Edge count, or weight sum, over the selected directed edges as `value`.
pub fn edge_aggregate(edges: &[String], weight: Option<&str>) -> String {
    let agg = match weight {
        Some(w) => format!("sum(r.{w}) AS value"),
        None => "count(r) AS value".to_string(),
    };
    line(&[
        "MATCH (n)-[r]->(m)",
        &FilterComposer::where_clause(edges),
        &format!("RETURN {agg}"),
    ])
}

/// Per-degree node counts, zero-degree nodes included.
pub fn degree_distribution(node: &[String], neighbor: &[String], weight: Option<&str>) -> String {
    let degree = match weight {
        Some(w) => weight_sum(w),
        None => "count(r)".to_string(),
    };
    line(&[
        "MATCH (n)",
        &FilterComposer::where_clause(node),
        "OPTIONAL MATCH (n)-[r]-(m)",
        &FilterComposer::where_clause(neighbor),
        &format!("WITH n, {degree} AS degree"),
        "RETURN degree, count(n) AS count",
        "ORDER BY degree",
    ])
}

/// Per-node degree in `direction`, zero-degree nodes included.
pub fn degree_per_node(direction: Direction, node: &[String], neighbor: &[String]) -> String {
    line(&[
        "MATCH (n)",
        &FilterComposer::where_clause(node),
        &format!("OPTIONAL MATCH {}", direction.pattern()),
        &FilterComposer::where_clause(neighbor),
        "RETURN id(n) AS id, count(r) AS degree",
    ])
}

// ============================================================================
// Sub-queries handed to delegated algorithms
// ============================================================================

/// Node-selection sub-query.
pub fn node_selection(node: &[String]) -> String {
    line(&["MATCH (n)", &FilterComposer::where_clause(node), "RETURN id(n) AS id"])
}

/// Relationship-selection sub-query, with `weight` when given.
pub fn relationship_selection(edges: &[String], weight: Option<&str>) -> String {
    let weight_col = weight.map(|w| format!(", r.{w} AS weight")).unwrap_or_default();
    line(&[
        "MATCH (n)-[r]->(m)",
        &FilterComposer::where_clause(edges),
        &format!("RETURN id(n) AS source, id(m) AS target{weight_col}"),
    ])
}

// ============================================================================
// Community aggregates
// ============================================================================

/// Intra-community edge weight per community, as `community`, `weight`.
pub fn intra_community_weight(edges: &[String], community: &str, weight: Option<&str>) -> String {
    let agg = match weight {
        Some(w) => format!("sum(r.{w})"),
        None => "count(r)".to_string(),
    };
    let same = vec![
        format!("n.{community} IS NOT NULL"),
        format!("n.{community} = m.{community}"),
    ];
    line(&[
        "MATCH (n)-[r]->(m)",
        &where_with(edges, &same),
        &format!("RETURN n.{community} AS community, {agg} AS weight"),
    ])
}

/// Total undirected degree per community, as `community`, `degree`.
pub fn community_degree(
    node: &[String],
    neighbor: &[String],
    community: &str,
    weight: Option<&str>,
) -> String {
    let degree = match weight {
        Some(w) => weight_sum(w),
        None => "count(r)".to_string(),
    };
    let labelled = vec![format!("n.{community} IS NOT NULL")];
    line(&[
        "MATCH (n)",
        &where_with(node, &labelled),
        "OPTIONAL MATCH (n)-[r]-(m)",
        &FilterComposer::where_clause(neighbor),
        &format!("RETURN n.{community} AS community, {degree} AS degree"),
    ])
}

// ============================================================================
// Property samples
// ============================================================================

fn both_present(a: &str, b: &str) -> Vec<String> {
    vec![format!("n.{a} IS NOT NULL"), format!("n.{b} IS NOT NULL")]
}

/// Raw `(group, value)` pairs for nodes carrying both properties.
pub fn group_values(node: &[String], group: &str, metric: &str) -> String {
    line(&[
        "MATCH (n)",
        &where_with(node, &both_present(group, metric)),
        &format!("RETURN n.{group} AS group, n.{metric} AS value"),
    ])
}

/// Raw `(a, b)` pairs for nodes carrying both properties.
pub fn property_pairs(node: &[String], a: &str, b: &str) -> String {
    line(&[
        "MATCH (n)",
        &where_with(node, &both_present(a, b)),
        &format!("RETURN n.{a} AS a, n.{b} AS b"),
    ])
}

/// `(a, b, count)` cells of the contingency table.
pub fn contingency(node: &[String], a: &str, b: &str) -> String {
    line(&[
        "MATCH (n)",
        &where_with(node, &both_present(a, b)),
        &format!("RETURN n.{a} AS a, n.{b} AS b, count(n) AS count"),
    ])
}
