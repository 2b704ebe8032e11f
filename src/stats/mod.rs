//! Distribution functions and sample statistics.
//!
//! Everything the inference and Bayesian engines need from a statistics
//! library: normal and Student's t tail probabilities, F and chi-square
//! survival functions, the Beta CDF and its inverse, and Pearson/Spearman
//! correlation over paired samples.

pub mod special;

use std::f64::consts::SQRT_2;

use special::{erfc, reg_inc_beta, reg_upper_gamma};

// ============================================================================
// Normal
// ============================================================================

/// Two-tailed p-value `2·(1 − Φ(|z|))`, computed without cancellation.
pub fn normal_two_tailed(z: f64) -> f64 {
    erfc(z.abs() / SQRT_2)
}

// ============================================================================
// Student's t
// ============================================================================

/// Two-tailed p-value `P(|T| ≥ |t|)` for `df` degrees of freedom.
pub fn student_t_two_tailed(t: f64, df: f64) -> f64 {
    if df <= 0.0 || t.is_nan() {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }
    reg_inc_beta(df / 2.0, 0.5, df / (df + t * t))
}

// ============================================================================
// F and chi-square
// ============================================================================

/// Survival function `P(F ≥ f)` of the F distribution with `(d1, d2)` dof.
pub fn f_sf(f: f64, d1: f64, d2: f64) -> f64 {
    if f <= 0.0 || f.is_nan() {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    reg_inc_beta(d2 / 2.0, d1 / 2.0, d2 / (d2 + d1 * f))
}

/// Survival function `P(X ≥ x)` of χ² with `k` dof.
pub fn chi_square_sf(x: f64, k: f64) -> f64 {
    if x <= 0.0 || k <= 0.0 || x.is_nan() {
        return 1.0;
    }
    reg_upper_gamma(k / 2.0, x / 2.0)
}

// ============================================================================
// Beta
// ============================================================================

/// Beta(a, b) CDF at `x`.
pub fn beta_cdf(x: f64, a: f64, b: f64) -> f64 {
    reg_inc_beta(a, b, x)
}

/// Inverse Beta(a, b) CDF (quantile) by bisection on the CDF.
pub fn beta_inv(p: f64, a: f64, b: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if beta_cdf(mid, a, b) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }
    0.5 * (lo + hi)
}

// ============================================================================
// Sample statistics
// ============================================================================

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Pearson correlation. `None` when either sample has zero variance or the
/// samples differ in length or hold fewer than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(xs), mean(ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 1-based ranks; ties share the average of the ranks they span.
pub fn ranks(xs: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&i, &j| xs[i].total_cmp(&xs[j]));

    let mut out = vec![0.0; xs.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && xs[order[end]] == xs[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1 ..= end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            out[idx] = avg;
        }
        start = end;
    }
    out
}

/// Spearman rank correlation: Pearson over average ranks.
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    pearson(&ranks(xs), &ranks(ys))
}
