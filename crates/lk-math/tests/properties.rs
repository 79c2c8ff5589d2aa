//! Property-based tests for lk-math numerical functions.
//!
//! Uses proptest to verify distributional identities hold across many random inputs.

use proptest::prelude::*;
use lk_math::descriptive::{mean, median, quantile};
use lk_math::{
    chi_square_cdf, chi_square_quantile, chi_square_sf, gamma_p, gamma_q, kolmogorov_sf,
    log_factorial, log_gamma, normal_cdf, normal_quantile, poisson_cdf, poisson_pmf,
};

const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Gamma family
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// log_gamma satisfies the recurrence Gamma(z+1) = z * Gamma(z).
    #[test]
    fn log_gamma_recurrence(z in 0.1..80.0f64) {
        let lhs = log_gamma(z + 1.0);
        let rhs = z.ln() + log_gamma(z);
        prop_assert!(approx_eq(lhs, rhs, 1e-8), "z={} lhs={} rhs={}", z, lhs, rhs);
    }

    /// log(n!) = log((n-1)!) + log(n).
    #[test]
    fn log_factorial_recurrence(n in 1u64..5000) {
        let lhs = log_factorial(n);
        let rhs = log_factorial(n - 1) + (n as f64).ln();
        prop_assert!(approx_eq(lhs, rhs, 1e-8));
    }

    /// P and Q partition unit mass.
    #[test]
    fn incomplete_gamma_complement(a in 0.05..200.0f64, x in 0.0..400.0f64) {
        let sum = gamma_p(a, x) + gamma_q(a, x);
        prop_assert!(approx_eq(sum, 1.0, 1e-9), "a={} x={} P+Q={}", a, x, sum);
    }

    /// Chi-square survival is non-increasing in the statistic.
    #[test]
    fn chi_square_sf_monotone(x in 0.0..200.0f64, dx in 0.0..50.0f64, df in 1u32..120) {
        let df = df as f64;
        prop_assert!(chi_square_sf(x + dx, df) <= chi_square_sf(x, df) + TOL);
    }

    /// The chi-square quantile inverts the CDF.
    #[test]
    fn chi_square_quantile_roundtrip(p in 0.001..0.999f64, df in 1u32..200) {
        let df = df as f64;
        let x = chi_square_quantile(p, df);
        prop_assert!(approx_eq(chi_square_cdf(x, df), p, 1e-6), "p={} df={} x={}", p, df, x);
    }
}

// ============================================================================
// Normal and Kolmogorov
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Phi(-z) = 1 - Phi(z).
    #[test]
    fn normal_cdf_symmetry(z in -8.0..8.0f64) {
        prop_assert!(approx_eq(normal_cdf(-z), 1.0 - normal_cdf(z), 1e-12));
    }

    /// Quantile is the inverse of the CDF.
    #[test]
    fn normal_quantile_roundtrip(p in 1e-8..(1.0 - 1e-8)) {
        let z = normal_quantile(p);
        prop_assert!((normal_cdf(z) - p).abs() <= 1e-9 * p.min(1.0 - p).max(1e-6));
    }

    /// Kolmogorov survival stays a probability and decreases.
    #[test]
    fn kolmogorov_sf_monotone(l in 0.0..4.0f64, dl in 0.0..1.0f64) {
        let a = kolmogorov_sf(l);
        let b = kolmogorov_sf(l + dl);
        prop_assert!((0.0..=1.0).contains(&a));
        prop_assert!(b <= a + 1e-9, "sf({})={} sf({})={}", l, a, l + dl, b);
    }
}

// ============================================================================
// Poisson
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The closed-form CDF matches the running pmf sum.
    #[test]
    fn poisson_cdf_is_pmf_sum(lambda in 0.01..40.0f64, k in 0u64..80) {
        let sum: f64 = (0..=k).map(|i| poisson_pmf(i, lambda)).sum();
        prop_assert!(approx_eq(poisson_cdf(k, lambda), sum.min(1.0), 1e-8));
    }
}

// ============================================================================
// Descriptive
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Quantiles are bounded by min and max and monotone in p.
    #[test]
    fn quantiles_bounded_and_monotone(
        data in prop::collection::vec(-1e6..1e6f64, 1..200),
        p1 in 0.0..1.0f64,
        p2 in 0.0..1.0f64,
    ) {
        let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let qlo = quantile(&data, lo).unwrap();
        let qhi = quantile(&data, hi).unwrap();
        prop_assert!(qlo >= min && qhi <= max);
        prop_assert!(qlo <= qhi);
    }

    /// Mean and median lie within the sample range.
    #[test]
    fn centers_within_range(data in prop::collection::vec(-1e6..1e6f64, 1..200)) {
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let m = mean(&data).unwrap();
        let med = median(&data).unwrap();
        prop_assert!(m >= min - 1e-6 && m <= max + 1e-6);
        prop_assert!(med >= min && med <= max);
    }
}
