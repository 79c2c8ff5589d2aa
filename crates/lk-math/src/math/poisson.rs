//! Poisson distribution kernels.

use super::gamma::{chi_square_quantile, gamma_p, gamma_q};
use super::stable::log_factorial;

/// log P(X = k) for X ~ Poisson(lambda).
pub fn poisson_log_pmf(k: u64, lambda: f64) -> f64 {
    if lambda.is_nan() || lambda < 0.0 {
        return f64::NAN;
    }
    if lambda == 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    (k as f64) * lambda.ln() - lambda - log_factorial(k)
}

/// P(X = k) for X ~ Poisson(lambda).
pub fn poisson_pmf(k: u64, lambda: f64) -> f64 {
    let lp = poisson_log_pmf(k, lambda);
    if lp.is_nan() {
        return f64::NAN;
    }
    lp.exp()
}

/// P(X <= k) = Q(k + 1, lambda).
pub fn poisson_cdf(k: u64, lambda: f64) -> f64 {
    if lambda.is_nan() || lambda < 0.0 {
        return f64::NAN;
    }
    if lambda == 0.0 {
        return 1.0;
    }
    gamma_q(k as f64 + 1.0, lambda)
}

/// P(X >= k) = P(k, lambda); 1 for k = 0.
pub fn poisson_sf_inclusive(k: u64, lambda: f64) -> f64 {
    if lambda.is_nan() || lambda < 0.0 {
        return f64::NAN;
    }
    if k == 0 {
        return 1.0;
    }
    if lambda == 0.0 {
        return 0.0;
    }
    gamma_p(k as f64, lambda)
}

/// Garwood exact interval for a Poisson rate, given `total` events over
/// `exposure` units (for a sample mean, exposure is the sample size).
pub fn poisson_rate_interval(total: u64, exposure: f64, confidence: f64) -> (f64, f64) {
    let alpha = 1.0 - confidence;
    let t = total as f64;
    let lower = if total == 0 {
        0.0
    } else {
        chi_square_quantile(alpha / 2.0, 2.0 * t) / 2.0
    };
    let upper = chi_square_quantile(1.0 - alpha / 2.0, 2.0 * t + 2.0) / 2.0;
    (lower / exposure, upper / exposure)
}
