//! Bayesian density estimation.
//!
//! Every ordered node pair is an independent edge-presence trial with a
//! Beta prior on the success probability, so the posterior after observing
//! `s` edges among `n(n−1)` pairs is `Beta(α₀ + s, β₀ + n(n−1) − s)`.

use crate::config::AnalyzerConfig;
use crate::executor::QueryExecutor;
use crate::filter::SubgraphFilter;
use crate::metrics::MetricsEngine;
use crate::model::{BetaBinomialResult, Posterior};
use crate::stats;
use crate::{Error, Result};

pub struct BayesianEngine<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    config: &'a AnalyzerConfig,
}

impl<'a, E: QueryExecutor + ?Sized> BayesianEngine<'a, E> {
    pub fn new(executor: &'a E, config: &'a AnalyzerConfig) -> Self {
        Self { executor, config }
    }

    /// Posterior over directed edge density.
    ///
    /// Below two nodes no trial is possible: the prior comes back unchanged
    /// with mean and interval `0`.
    pub async fn beta_binomial(
        &self,
        alpha_prior: f64,
        beta_prior: f64,
        filter: &SubgraphFilter,
    ) -> Result<BetaBinomialResult> {
        let prior = validate_prior(alpha_prior, beta_prior)?;
        let metrics = MetricsEngine::new(self.executor, self.config);

        let n = metrics.node_count(filter).await?;
        if n < 2 {
            return Ok(BetaBinomialResult { mean: 0.0, ci_low: 0.0, ci_high: 0.0, posterior: prior });
        }
        let possible = (n * (n - 1)) as f64;
        let successes = metrics.edge_aggregate(None, filter).await?;

        let posterior = update(prior, successes, possible);
        let (ci_low, ci_high) = credible_interval(posterior, self.config.credible_mass);
        Ok(BetaBinomialResult { mean: posterior.mean(), ci_low, ci_high, posterior })
    }

    /// Bayes factor of `θ > θ₀` against `θ ≤ θ₀`: posterior odds over prior
    /// odds. `+∞` when any odds denominator is zero.
    pub async fn bayes_factor(
        &self,
        theta0: f64,
        alpha_prior: f64,
        beta_prior: f64,
        filter: &SubgraphFilter,
    ) -> Result<f64> {
        if !(0.0..=1.0).contains(&theta0) {
            return Err(Error::Config(format!("theta0 must be in [0, 1], got {theta0}")));
        }
        let prior = validate_prior(alpha_prior, beta_prior)?;
        let result = self.beta_binomial(alpha_prior, beta_prior, filter).await?;
        Ok(directional_bayes_factor(theta0, prior, result.posterior))
    }
}

fn validate_prior(alpha: f64, beta: f64) -> Result<Posterior> {
    if !(alpha > 0.0 && beta > 0.0) || !alpha.is_finite() || !beta.is_finite() {
        return Err(Error::Config(format!(
            "Beta prior parameters must be positive, got ({alpha}, {beta})"
        )));
    }
    Ok(Posterior::new(alpha, beta))
}

/// Conjugate update with `successes` out of `trials`.
///
/// Parallel edges can push `successes` past `trials`; failures never go
/// negative.
pub(crate) fn update(prior: Posterior, successes: f64, trials: f64) -> Posterior {
    Posterior::new(prior.alpha + successes, prior.beta + (trials - successes).max(0.0))
}

/// Equal-tailed interval holding `mass` of the distribution.
pub(crate) fn credible_interval(dist: Posterior, mass: f64) -> (f64, f64) {
    let tail = (1.0 - mass) / 2.0;
    (
        stats::beta_inv(tail, dist.alpha, dist.beta),
        stats::beta_inv(1.0 - tail, dist.alpha, dist.beta),
    )
}

pub(crate) fn directional_bayes_factor(theta0: f64, prior: Posterior, posterior: Posterior) -> f64 {
    let prior_below = stats::beta_cdf(theta0, prior.alpha, prior.beta);
    if prior_below == 0.0 {
        return f64::INFINITY;
    }
    let prior_odds = (1.0 - prior_below) / prior_below;

    let post_below = stats::beta_cdf(theta0, posterior.alpha, posterior.beta);
    if post_below == 0.0 {
        return f64::INFINITY;
    }
    let post_odds = (1.0 - post_below) / post_below;

    if prior_odds == 0.0 {
        return f64::INFINITY;
    }
    post_odds / prior_odds
}
