//! Inverse-transform samplers driven by [`LawRng`].
//!
//! Each sampler consumes exactly one uniform per draw so a seed fixes the
//! output for every law.

use lk_math::{normal_cdf, normal_quantile, poisson_cdf, poisson_pmf};

use super::rng::LawRng;

/// Log-uniform on [lo, hi): mantissas follow Benford's law when hi/lo is a
/// power of ten.
pub fn log_uniform(rng: &mut LawRng, lo: f64, hi: f64) -> f64 {
    lo * (hi / lo).powf(rng.next_f64())
}

/// A value with a uniformly chosen leading digit and a random mantissa,
/// at the decade of `near` when that stays inside [lo, hi].
pub fn uniform_first_digit(rng: &mut LawRng, near: f64, lo: f64, hi: f64) -> f64 {
    let digit = 1 + rng.below(9);
    let mantissa = digit as f64 + rng.next_f64();
    let decade = near.log10().floor();
    [decade, decade - 1.0, decade + 1.0]
        .into_iter()
        .map(|e| mantissa * 10f64.powf(e))
        .find(|v| (lo..=hi).contains(v))
        .unwrap_or(near)
}

/// Bounded Pareto on [lo, hi] with shape `alpha`.
pub fn bounded_pareto(rng: &mut LawRng, lo: f64, hi: f64, alpha: f64) -> f64 {
    let u = rng.next_f64();
    let tail = 1.0 - (lo / hi).powf(alpha);
    (lo * (1.0 - u * tail).powf(-1.0 / alpha)).min(hi)
}

/// Cumulative Zipf weights r^-s over ranks lo..=hi.
pub fn zipf_table(lo: u64, hi: u64, exponent: f64) -> Vec<f64> {
    let mut total = 0.0;
    (lo..=hi)
        .map(|r| {
            total += (r as f64).powf(-exponent);
            total
        })
        .collect()
}

/// Index into the table drawn by inverse CDF.
pub fn zipf_index(rng: &mut LawRng, cumulative: &[f64]) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let target = rng.next_f64() * total;
    cumulative
        .partition_point(|&c| c <= target)
        .min(cumulative.len().saturating_sub(1))
}

/// Normal(mean, sd) truncated to [lo, hi] via the inverse CDF.
pub fn truncated_normal(rng: &mut LawRng, mean: f64, sd: f64, lo: f64, hi: f64) -> f64 {
    let fa = normal_cdf((lo - mean) / sd);
    let fb = normal_cdf((hi - mean) / sd);
    let u = fa + rng.next_open01() * (fb - fa);
    (mean + sd * normal_quantile(u)).clamp(lo, hi)
}

/// Poisson(lambda) restricted to lo..=hi, by CDF inversion starting from
/// the mode.
pub fn poisson(rng: &mut LawRng, lambda: f64, lo: u64, hi: u64) -> u64 {
    let below_lo = if lo == 0 { 0.0 } else { poisson_cdf(lo - 1, lambda) };
    let upto_hi = poisson_cdf(hi, lambda);
    let u = below_lo + rng.next_open01() * (upto_hi - below_lo);
    poisson_inverse(u, lambda).clamp(lo, hi)
}

/// Smallest k with P(X <= k) >= u.
pub fn poisson_inverse(u: f64, lambda: f64) -> u64 {
    if lambda <= 0.0 {
        return 0;
    }
    let mut k = lambda.floor() as u64;
    let mut p = poisson_pmf(k, lambda);
    let mut cdf = poisson_cdf(k, lambda);
    if u <= cdf {
        while k > 0 {
            let below = cdf - p;
            if u > below {
                break;
            }
            cdf = below;
            p *= k as f64 / lambda;
            k -= 1;
        }
    } else {
        while u > cdf && p > 0.0 {
            k += 1;
            p *= lambda / k as f64;
            cdf += p;
        }
    }
    k
}
