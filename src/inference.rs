//! Frequentist hypothesis tests over node properties and graph density.
//!
//! Small or degenerate samples resolve to `(0, 1)` (nothing rejected) rather
//! than failing. ANOVA with fewer than two groups is the exception.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::cypher::patterns;
use crate::executor::{self, property_key, QueryExecutor};
use crate::filter::{FilterComposer, SubgraphFilter};
use crate::metrics::MetricsEngine;
use crate::model::{ChiSquareResult, HypothesisResult, Params, Record, Scalar};
use crate::stats;
use crate::{Error, Result};

/// Correlation coefficient used by [`InferenceEngine::correlation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    /// Pearson over average ranks.
    Spearman,
}

pub struct InferenceEngine<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    config: &'a AnalyzerConfig,
    composer: FilterComposer,
}

impl<'a, E: QueryExecutor + ?Sized> InferenceEngine<'a, E> {
    pub fn new(executor: &'a E, config: &'a AnalyzerConfig) -> Self {
        Self {
            executor,
            config,
            composer: FilterComposer::new(config.substitution),
        }
    }

    // ========================================================================
    // Density
    // ========================================================================

    /// Two-tailed z-test of observed density against `expected`, with
    /// `n(n−1)/2` possible pairs.
    ///
    /// `(0, 1)` when no pair is possible, decided before `expected` is checked
    /// or anything is queried; `(0, 0)` when `expected` is exactly 0 or 1.
    pub async fn z_test_density(
        &self,
        expected: f64,
        n_nodes: u64,
        weight: Option<&str>,
        filter: &SubgraphFilter,
    ) -> Result<HypothesisResult> {
        let n = n_nodes as f64;
        let possible_pairs = n * (n - 1.0) / 2.0;
        if possible_pairs <= 0.0 {
            return Ok(HypothesisResult::null());
        }
        if !(0.0..=1.0).contains(&expected) {
            return Err(Error::Config(format!("expected density must be in [0, 1], got {expected}")));
        }
        let observed = MetricsEngine::new(self.executor, self.config)
            .density(weight, filter)
            .await?;

        let se = (expected * (1.0 - expected) / possible_pairs).sqrt();
        if se == 0.0 {
            return Ok(HypothesisResult::new(0.0, 0.0));
        }
        let z = (observed - expected) / se;
        Ok(HypothesisResult::new(z, stats::normal_two_tailed(z)))
    }

    // ========================================================================
    // ANOVA
    // ========================================================================

    /// One-way ANOVA of `metric_property` across the values of `group_property`.
    ///
    /// Fails with [`Error::InsufficientData`] below two groups.
    pub async fn anova(
        &self,
        group_property: &str,
        metric_property: &str,
        node_filter: Option<&str>,
    ) -> Result<HypothesisResult> {
        let group = property_key(group_property)?;
        let metric = property_key(metric_property)?;
        let node = self.composer.compose_node(node_filter);
        let rows = self.rows(&patterns::group_values(&node, group, metric)).await?;

        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &rows {
            let (Some(label), Some(value)) = (non_null(row, "group")?, row.get_opt::<f64>("value")?) else {
                continue;
            };
            groups.entry(label.key()).or_default().push(value);
        }
        if groups.len() < 2 {
            return Err(Error::InsufficientData { required: 2, found: groups.len() });
        }
        Ok(one_way_anova(groups.values()))
    }

    // ========================================================================
    // Correlation
    // ========================================================================

    /// Correlation between two numeric properties with a two-tailed t-test
    /// on `n − 2` degrees of freedom.
    pub async fn correlation(
        &self,
        property_a: &str,
        property_b: &str,
        method: CorrelationMethod,
        node_filter: Option<&str>,
    ) -> Result<HypothesisResult> {
        let a = property_key(property_a)?;
        let b = property_key(property_b)?;
        let node = self.composer.compose_node(node_filter);
        let rows = self.rows(&patterns::property_pairs(&node, a, b)).await?;

        let mut xs = Vec::with_capacity(rows.len());
        let mut ys = Vec::with_capacity(rows.len());
        for row in &rows {
            if let (Some(x), Some(y)) = (row.get_opt::<f64>("a")?, row.get_opt::<f64>("b")?) {
                xs.push(x);
                ys.push(y);
            }
        }
        Ok(correlation_test(&xs, &ys, method))
    }

    // ========================================================================
    // Chi-square
    // ========================================================================

    /// Chi-square test of independence between two categorical properties.
    ///
    /// Rows and columns follow the sorted canonical strings of the observed
    /// values, so the result does not depend on record order.
    pub async fn chi_square(
        &self,
        property_a: &str,
        property_b: &str,
        node_filter: Option<&str>,
    ) -> Result<ChiSquareResult> {
        let a = property_key(property_a)?;
        let b = property_key(property_b)?;
        let node = self.composer.compose_node(node_filter);
        let rows = self.rows(&patterns::contingency(&node, a, b)).await?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            let (Some(x), Some(y)) = (non_null(row, "a")?, non_null(row, "b")?) else {
                continue;
            };
            cells.push((x.key(), y.key(), row.get::<u64>("count")? as f64));
        }
        Ok(contingency_test(&cells))
    }

    async fn rows(&self, pattern: &str) -> Result<Vec<Record>> {
        executor::fetch(self.executor, pattern, Params::new()).await
    }
}

fn non_null(row: &Record, field: &str) -> Result<Option<Scalar>> {
    row.get_opt::<Scalar>(field)
}

// ============================================================================
// Test statistics
// ============================================================================

/// F = MSB / MSW with `(k − 1, N − k)` degrees of freedom.
pub(crate) fn one_way_anova<'g, I>(groups: I) -> HypothesisResult
where
    I: IntoIterator<Item = &'g Vec<f64>> + Clone,
{
    let (mut k, mut total, mut sum) = (0usize, 0usize, 0.0);
    for g in groups.clone() {
        k += 1;
        total += g.len();
        sum += g.iter().sum::<f64>();
    }
    if k < 2 || total <= k {
        return HypothesisResult::null();
    }
    let grand = sum / total as f64;

    let (mut ssb, mut ssw) = (0.0, 0.0);
    for g in groups {
        let m = stats::mean(g);
        ssb += g.len() as f64 * (m - grand).powi(2);
        ssw += g.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    }
    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    let (msb, msw) = (ssb / df1, ssw / df2);

    if msw == 0.0 {
        return if msb > 0.0 { HypothesisResult::new(0.0, 0.0) } else { HypothesisResult::null() };
    }
    let f = msb / msw;
    HypothesisResult::new(f, stats::f_sf(f, df1, df2))
}

/// `r` with its two-tailed p-value.
pub(crate) fn correlation_test(xs: &[f64], ys: &[f64], method: CorrelationMethod) -> HypothesisResult {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return HypothesisResult::null();
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let r = match method {
        CorrelationMethod::Pearson => stats::pearson(xs, ys),
        CorrelationMethod::Spearman => stats::spearman(xs, ys),
    };
    let Some(r) = r else {
        return HypothesisResult::null();
    };
    if n == 2 {
        return HypothesisResult::new(r, 1.0);
    }
    if r.abs() >= 1.0 {
        return HypothesisResult::new(r, 0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    HypothesisResult::new(r, stats::student_t_two_tailed(t, df))
}

/// Pearson's χ² over `(row label, column label, count)` cells.
/// Repeated cells accumulate.
pub(crate) fn contingency_test(cells: &[(String, String, f64)]) -> ChiSquareResult {
    let rows: Vec<String> = cells.iter().map(|c| c.0.clone()).collect::<BTreeSet<_>>().into_iter().collect();
    let columns: Vec<String> = cells.iter().map(|c| c.1.clone()).collect::<BTreeSet<_>>().into_iter().collect();

    let mut observed = vec![vec![0.0; columns.len()]; rows.len()];
    for (a, b, count) in cells {
        // Labels were collected from these same cells
        if let (Ok(i), Ok(j)) = (rows.binary_search(a), columns.binary_search(b)) {
            observed[i][j] += count;
        }
    }

    let row_sums: Vec<f64> = observed.iter().map(|r| r.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..columns.len())
        .map(|j| observed.iter().map(|r| r[j]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();

    let mut expected = vec![vec![0.0; columns.len()]; rows.len()];
    let mut statistic = 0.0;
    if total > 0.0 {
        for i in 0..rows.len() {
            for j in 0..columns.len() {
                let e = row_sums[i] * col_sums[j] / total;
                expected[i][j] = e;
                if e > 0.0 {
                    statistic += (observed[i][j] - e).powi(2) / e;
                }
            }
        }
    }

    let dof = (rows.len().saturating_sub(1) * columns.len().saturating_sub(1)) as u64;
    let p_value = if dof == 0 { 1.0 } else { stats::chi_square_sf(statistic, dof as f64) };
    ChiSquareResult { statistic, p_value, dof, rows, columns, observed, expected }
}
