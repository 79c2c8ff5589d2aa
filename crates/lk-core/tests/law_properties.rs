//! Property-based tests for the law analyzers and the numeral normalizer.

use proptest::prelude::*;
use lk_common::{DistributionDetail, LawKind, RiskLevel};
use lk_config::AnalysisConfig;
use lk_core::laws::pareto::{gini_coefficient, lorenz_curve};
use lk_core::laws::risk::classify;
use lk_core::numerals::normalize_token;
use lk_core::{analyze_law, generate, Dataset, GenerateOptions, LocaleHint};

fn sorted(mut v: Vec<f64>) -> Vec<f64> {
    v.sort_by(f64::total_cmp);
    v
}

// ============================================================================
// Benford
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Observed digit proportions form a distribution.
    #[test]
    fn benford_proportions_sum_to_one(values in prop::collection::vec(1e-3..1e9f64, 5..300)) {
        let ds = Dataset::from_values(values);
        let result = analyze_law(LawKind::Benford, &ds, &AnalysisConfig::default()).unwrap();
        let DistributionDetail::Benford(detail) = result.detail else {
            panic!("expected Benford detail");
        };
        let observed: f64 = detail.buckets.iter().map(|b| b.observed).sum();
        let expected: f64 = detail.buckets.iter().map(|b| b.expected).sum();
        prop_assert!((observed - 1.0).abs() < 1e-9, "observed sum {}", observed);
        prop_assert!((expected - 1.0).abs() < 1e-9, "expected sum {}", expected);
        prop_assert!((0.0..=1.0).contains(&result.p_value));
    }
}

// ============================================================================
// Pareto
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn gini_in_unit_interval(values in prop::collection::vec(0.0..1e6f64, 1..200)) {
        let v = sorted(values);
        if let Some(g) = gini_coefficient(&v) {
            prop_assert!((0.0..=1.0).contains(&g), "gini {}", g);
        }
    }

    #[test]
    fn gini_of_identical_values_is_zero(x in 1e-3..1e6f64, n in 1usize..100) {
        let g = gini_coefficient(&vec![x; n]).unwrap();
        prop_assert!(g.abs() < 1e-9, "gini {}", g);
    }

    /// One holder of everything approaches 1 as n grows.
    #[test]
    fn gini_of_full_concentration(x in 1.0..1e6f64, n in 2usize..500) {
        let mut v = vec![0.0; n - 1];
        v.push(x);
        let g = gini_coefficient(&v).unwrap();
        let expected = 1.0 - 1.0 / n as f64;
        prop_assert!((g - expected).abs() < 1e-9, "n={} gini={}", n, g);
    }

    #[test]
    fn lorenz_runs_from_origin_to_unit(values in prop::collection::vec(1e-3..1e6f64, 1..200)) {
        let curve = lorenz_curve(&sorted(values));
        let first = curve.first().unwrap();
        let last = curve.last().unwrap();
        prop_assert_eq!((first.population, first.value), (0.0, 0.0));
        prop_assert_eq!((last.population, last.value), (1.0, 1.0));
        for pair in curve.windows(2) {
            prop_assert!(pair[1].population >= pair[0].population);
            prop_assert!(pair[1].value >= pair[0].value - 1e-12);
        }
    }
}

// ============================================================================
// Risk classification
// ============================================================================

proptest! {
    #[test]
    fn risk_is_monotone_in_effect(a in 0.0..1.0f64, b in 0.0..1.0f64, scale in 0.1..3.0f64) {
        let cuts = [0.1, 0.2, 0.3];
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify(lo, &cuts, scale) <= classify(hi, &cuts, scale));
    }

    #[test]
    fn larger_scale_is_never_stricter(effect in 0.0..1.0f64, s in 0.1..3.0f64) {
        let cuts = [0.1, 0.2, 0.3];
        prop_assert!(classify(effect, &cuts, s * 1.5) <= classify(effect, &cuts, s));
        prop_assert!(classify(effect, &cuts, s) >= RiskLevel::Low);
    }
}

// ============================================================================
// Numerals and generator
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Whatever the input, accepted values are finite.
    #[test]
    fn normalizer_never_yields_non_finite(token in "\\PC{0,24}") {
        if let Ok(v) = normalize_token(&token, LocaleHint::Auto) {
            prop_assert!(v.is_finite(), "{:?} -> {}", token, v);
        }
    }

    #[test]
    fn grouped_integers_parse_exactly(n in 0u64..1_000_000_000_000) {
        let plain = n.to_string();
        let mut grouped = String::new();
        for (i, c) in plain.chars().enumerate() {
            if i > 0 && (plain.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        prop_assert_eq!(normalize_token(&plain, LocaleHint::Auto), Ok(n as f64));
        prop_assert_eq!(normalize_token(&grouped, LocaleHint::DotDecimal), Ok(n as f64));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn generation_is_deterministic_per_seed(seed in any::<u64>(), law_idx in 0usize..5) {
        let law = LawKind::ALL[law_idx];
        let options = GenerateOptions::new(200).with_seed(seed);
        let a = generate(law, &options).unwrap();
        let b = generate(law, &options).unwrap();
        prop_assert_eq!(a.dataset.values(), b.dataset.values());
        prop_assert_eq!(a.seed, seed);
    }
}
