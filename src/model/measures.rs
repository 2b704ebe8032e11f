//! Result DTOs produced by the engines.

use serde::{Deserialize, Serialize};

/// Node identifier (as rendered by `id(n)`) → score.
pub type CentralityScores = hashbrown::HashMap<String, f64>;

/// Number of nodes sharing one degree value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeBucket {
    /// Degree, or strength when a weight property is used.
    pub degree: f64,
    pub count: u64,
}

/// Degree → node count, ascending by degree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegreeDistribution {
    buckets: Vec<DegreeBucket>,
}

impl DegreeDistribution {
    /// Build from unordered buckets; equal degrees are merged.
    pub fn from_buckets(mut buckets: Vec<DegreeBucket>) -> Self {
        buckets.sort_by(|a, b| a.degree.total_cmp(&b.degree));
        let mut merged: Vec<DegreeBucket> = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            match merged.last_mut() {
                Some(last) if last.degree == bucket.degree => last.count += bucket.count,
                _ => merged.push(bucket),
            }
        }
        Self { buckets: merged }
    }

    pub fn buckets(&self) -> &[DegreeBucket] {
        &self.buckets
    }

    pub fn count_of(&self, degree: f64) -> u64 {
        self.buckets.iter()
            .find(|b| b.degree == degree)
            .map_or(0, |b| b.count)
    }

    /// Total number of nodes across all buckets.
    pub fn node_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DegreeBucket> {
        self.buckets.iter()
    }
}

/// A test statistic with its p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypothesisResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl HypothesisResult {
    pub const fn new(statistic: f64, p_value: f64) -> Self {
        Self { statistic, p_value }
    }

    /// `(0, 1)`: nothing observed, nothing rejected.
    pub const fn null() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Chi-square independence test over a contingency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: u64,
    /// Row labels (distinct values of the first property, sorted).
    pub rows: Vec<String>,
    /// Column labels (distinct values of the second property, sorted).
    pub columns: Vec<String>,
    pub observed: Vec<Vec<f64>>,
    pub expected: Vec<Vec<f64>>,
}

/// Summary reported by a delegated community-detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRun {
    pub node_count: u64,
    pub community_count: u64,
    pub iterations: u64,
    pub converged: bool,
}

/// Beta distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    pub alpha: f64,
    pub beta: f64,
}

impl Posterior {
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Beta(1, 1).
    pub const fn uniform() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}

/// Outcome of a Beta-Binomial density estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaBinomialResult {
    pub mean: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub posterior: Posterior,
}
