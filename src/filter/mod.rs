//! # Filter Composition
//!
//! Turns the caller's node and edge predicates into the WHERE conditions of
//! the generated patterns.
//!
//! The node filter is written against `n`. On a two-endpoint pattern
//! `(n)-[r]->(m)` it is applied once as written (source) and once with `n`
//! rewritten to `m` (target), so both endpoints lie in the selected node
//! subset. The edge filter is written against `r` and applied as is.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

use crate::cypher::lexer::{self, TokenKind};
use crate::Result;

/// Variable the node filter is written against.
pub const SOURCE_VAR: &str = "n";
/// Variable the opposite endpoint is bound to.
pub const TARGET_VAR: &str = "m";

/// Parenthesized predicates to AND together. Never more than three.
pub type Clauses = SmallVec<[String; 3]>;

// ============================================================================
// SubgraphFilter
// ============================================================================

/// The caller's selection of nodes (`n`) and relationships (`r`).
///
/// Blank predicates are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphFilter {
    pub node: Option<String>,
    pub edge: Option<String>,
}

impl SubgraphFilter {
    /// No filtering: the whole graph.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, predicate: impl Into<String>) -> Self {
        self.node = Some(predicate.into());
        self
    }

    pub fn with_edge(mut self, predicate: impl Into<String>) -> Self {
        self.edge = Some(predicate.into());
        self
    }

    pub fn node(&self) -> Option<&str> {
        non_blank(self.node.as_deref())
    }

    pub fn edge(&self) -> Option<&str> {
        non_blank(self.edge.as_deref())
    }
}

fn non_blank(predicate: Option<&str>) -> Option<&str> {
    predicate.filter(|p| !p.trim().is_empty())
}

// ============================================================================
// Substitution
// ============================================================================

/// How a node filter is mirrored onto the opposite endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionStrategy {
    /// Replace every occurrence of the variable's text, wherever it appears.
    /// `"n.name = 'Ann'"` becomes `"m.mame = 'Amm'"`.
    #[default]
    Textual,
    /// Rewrite only identifier tokens that denote the variable; property
    /// keys, labels, map keys, parameters and string literals are untouched.
    Identifier,
}

/// Textual variable substitution: every occurrence of `from` is replaced.
///
/// This is a plain substring rewrite, not a semantic one. Any substring match
/// is replaced, including inside property names, labels and literals.
/// A filter that does not contain `from` comes back unchanged.
pub fn substitute(filter: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return filter.to_string();
    }
    filter.replace(from, to)
}

/// Identifier-aware variable substitution.
///
/// Fails only when the filter cannot be tokenized.
pub fn rename_identifier(filter: &str, from: &str, to: &str) -> Result<String> {
    let tokens = lexer::tokenize(filter)?;
    let mut out = String::with_capacity(filter.len());
    let mut cursor = 0;
    let mut brace_depth = 0usize;

    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LBrace => brace_depth += 1,
            TokenKind::RBrace => brace_depth = brace_depth.saturating_sub(1),
            _ => {}
        }
        let named = matches!(tok.kind, TokenKind::Identifier | TokenKind::EscapedIdentifier);
        if !named || tok.text != from {
            continue;
        }

        let prev = i.checked_sub(1).map(|j| tokens[j].kind);
        let next = tokens.get(i + 1).map(|t| t.kind);
        // n.from  /  n:from (label; inside braces a colon introduces a value)
        let property_or_label = prev == Some(TokenKind::Dot)
            || (prev == Some(TokenKind::Colon) && brace_depth == 0);
        // {from: ...}
        let map_key = brace_depth > 0
            && matches!(prev, Some(TokenKind::LBrace | TokenKind::Comma))
            && next == Some(TokenKind::Colon);
        if property_or_label || map_key {
            continue;
        }

        out.push_str(&filter[cursor..tok.span.start]);
        if tok.kind == TokenKind::EscapedIdentifier {
            out.push('`');
            out.push_str(to);
            out.push('`');
        } else {
            out.push_str(to);
        }
        cursor = tok.span.end;
    }

    out.push_str(&filter[cursor..]);
    Ok(out)
}

// ============================================================================
// FilterComposer
// ============================================================================

/// Builds the WHERE conditions for node-only and two-endpoint patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterComposer {
    strategy: SubstitutionStrategy,
}

impl FilterComposer {
    pub fn new(strategy: SubstitutionStrategy) -> Self {
        Self { strategy }
    }

    /// Rebind `filter` from `from` to `to` using the configured strategy.
    pub fn substitute(&self, filter: &str, from: &str, to: &str) -> String {
        match self.strategy {
            SubstitutionStrategy::Textual => substitute(filter, from, to),
            SubstitutionStrategy::Identifier => rename_identifier(filter, from, to)
                .unwrap_or_else(|err| {
                    warn!(filter, error = %err, "filter not tokenizable, using textual substitution");
                    substitute(filter, from, to)
                }),
        }
    }

    /// Conditions for a two-endpoint edge pattern `(n)-[r]->(m)`:
    /// `(node)`, `(node[n→m])`, `(edge)`, absent ones omitted.
    pub fn compose(&self, node: Option<&str>, edge: Option<&str>) -> Clauses {
        let mut clauses = Clauses::new();
        if let Some(node) = non_blank(node) {
            clauses.push(format!("({node})"));
            clauses.push(format!("({})", self.substitute(node, SOURCE_VAR, TARGET_VAR)));
        }
        if let Some(edge) = non_blank(edge) {
            clauses.push(format!("({edge})"));
        }
        clauses
    }

    /// Conditions for a node-only pattern `(n)`.
    pub fn compose_node(&self, node: Option<&str>) -> Clauses {
        let mut clauses = Clauses::new();
        if let Some(node) = non_blank(node) {
            clauses.push(format!("({node})"));
        }
        clauses
    }

    /// Conditions for the optional-match side `(n)-[r]-(m)` of a per-node
    /// aggregation, where `n` is already constrained: `(node[n→m])`, `(edge)`.
    pub fn compose_neighbor(&self, node: Option<&str>, edge: Option<&str>) -> Clauses {
        let mut clauses = Clauses::new();
        if let Some(node) = non_blank(node) {
            clauses.push(format!("({})", self.substitute(node, SOURCE_VAR, TARGET_VAR)));
        }
        if let Some(edge) = non_blank(edge) {
            clauses.push(format!("({edge})"));
        }
        clauses
    }

    /// Shorthand for [`FilterComposer::compose`] over a [`SubgraphFilter`].
    pub fn edges_of(&self, filter: &SubgraphFilter) -> Clauses {
        self.compose(filter.node(), filter.edge())
    }

    /// `"WHERE a AND b"`, or `""` for no conditions.
    pub fn where_clause(conditions: &[String]) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }
}
