//! Zipf's rank-frequency law.
//!
//! Fits `f(r) = C / r^s` by least squares on the log-log rank/frequency
//! pairs. The effect size is the unexplained share of log-frequency
//! variance, `1 - R^2`.

use lk_common::detail::{RankEntry, ZipfDetail};
use lk_common::{AnalyzerResult, ConfidenceInterval, DistributionDetail, Error, LawKind, Result};
use lk_config::AnalysisConfig;
use lk_math::regression::linear_fit;
use lk_math::{chi_square_sf, generalized_harmonic, stable_sum, z_for_confidence};
use tracing::{debug, instrument};

use super::risk::{self, Cutoffs};
use super::{ensure_finite, probability};
use crate::dataset::Dataset;

const LAW: LawKind = LawKind::Zipf;

/// Bands for `1 - R^2` of the log-log fit.
pub const FIT_CUTOFFS: Cutoffs = [0.05, 0.15, 0.30];

/// Shannon diversity (natural log) of a frequency vector.
pub fn shannon_diversity(frequencies: &[f64]) -> f64 {
    let total = stable_sum(frequencies.iter().copied());
    if total <= 0.0 {
        return 0.0;
    }
    -stable_sum(
        frequencies
            .iter()
            .filter(|f| **f > 0.0)
            .map(|&f| {
                let p = f / total;
                p * p.ln()
            }),
    )
}

#[instrument(level = "debug", skip_all, fields(law = "zipf", n = dataset.len()))]
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    let minimum = LAW.default_minimum_sample();
    let min_count = config.zipf.min_count;
    let labels = dataset.labels();

    // Stable descending order keeps first-occurrence order among ties.
    let mut order: Vec<usize> = (0..dataset.len())
        .filter(|&i| dataset.values()[i] > 0.0)
        .collect();
    let non_positive = dataset.len() - order.len();
    order.sort_by(|&a, &b| dataset.values()[b].total_cmp(&dataset.values()[a]));

    let (kept, dropped): (Vec<usize>, Vec<usize>) = order
        .into_iter()
        .partition(|&i| dataset.values()[i] >= min_count);
    let filtered_occurrences = stable_sum(dropped.iter().map(|&i| dataset.values()[i]));

    let frequencies: Vec<f64> = kept.iter().map(|&i| dataset.values()[i]).collect();
    let k = frequencies.len();
    if k < minimum {
        return Err(Error::insufficient_counted(LAW, "ranks", k, minimum));
    }

    let log_rank: Vec<f64> = (1..=k).map(|r| (r as f64).ln()).collect();
    let log_freq: Vec<f64> = frequencies.iter().map(|f| f.ln()).collect();
    let fit = linear_fit(&log_rank, &log_freq)
        .ok_or_else(|| Error::computation(LAW, "log-log regression is degenerate"))?;
    let exponent = ensure_finite(LAW, "Zipf exponent", -fit.slope)?;
    let r_squared = fit.r_squared.clamp(0.0, 1.0);
    let effect = 1.0 - r_squared;

    let total = stable_sum(frequencies.iter().copied());
    let harmonic = generalized_harmonic(k, exponent);
    let expected: Vec<f64> = (1..=k)
        .map(|r| total * (r as f64).powf(-exponent) / harmonic)
        .collect();
    let chi_square = ensure_finite(
        LAW,
        "chi-square statistic",
        stable_sum(
            frequencies
                .iter()
                .zip(&expected)
                .map(|(o, e)| (o - e).powi(2) / e),
        ),
    )?;
    let p_value = probability(LAW, chi_square_sf(chi_square, (k - 2) as f64))?;

    let half = z_for_confidence(config.confidence_level) * fit.slope_std_error;
    let ranks = kept
        .iter()
        .zip(&frequencies)
        .zip(&expected)
        .enumerate()
        .map(|(r, ((&i, &frequency), &expected))| RankEntry {
            rank: r + 1,
            token: labels.map(|l| l[i].clone()),
            frequency,
            expected,
        })
        .collect();

    let risk_level = risk::assess(
        effect,
        &FIT_CUTOFFS,
        config.threshold_profile,
        config.confidence_level,
        k,
    );
    debug!(exponent, r_squared, chi_square, risk = %risk_level, "zipf computed");

    let mut warnings = Vec::new();
    if !dropped.is_empty() {
        warnings.push(format!(
            "{} items below min_count {min_count} were excluded from the fit",
            dropped.len()
        ));
    }
    if non_positive > 0 {
        warnings.push(format!("{non_positive} non-positive frequencies were ignored"));
    }

    Ok(AnalyzerResult {
        law: LAW,
        sample_count: k,
        minimum_sample: minimum,
        test_statistic: chi_square,
        p_value,
        effect_size: effect,
        confidence_interval: ConfidenceInterval {
            parameter: "exponent".to_string(),
            estimate: exponent,
            lower: exponent - half,
            upper: exponent + half,
            level: config.confidence_level,
        },
        risk_level,
        detail: DistributionDetail::Zipf(ZipfDetail {
            exponent,
            intercept: fit.intercept,
            r_squared,
            exponent_deviation: (exponent - 1.0).abs(),
            diversity: shannon_diversity(&frequencies),
            ranks,
            filtered_items: dropped.len(),
            filtered_occurrences,
        }),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TextOptions;
    use lk_common::RiskLevel;

    fn detail(result: &AnalyzerResult) -> &ZipfDetail {
        match &result.detail {
            DistributionDetail::Zipf(d) => d,
            other => panic!("wrong detail: {other:?}"),
        }
    }

    #[test]
    fn ideal_frequencies_fit_exactly() {
        let ds = Dataset::from_values((1..=50).map(|r| 1000.0 / f64::from(r)));
        let result = analyze(&ds, &AnalysisConfig::default()).unwrap();
        let d = detail(&result);
        assert!((d.exponent - 1.0).abs() < 1e-9);
        assert!(d.r_squared > 0.999_999);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(d.exponent_deviation < 1e-9);
        let ci = &result.confidence_interval;
        assert!(ci.lower <= ci.estimate && ci.estimate <= ci.upper);
    }

    #[test]
    fn text_ranks_keep_first_occurrence_order_for_ties() {
        let ds = Dataset::from_text("b a c a b a d", TextOptions::default());
        let result = analyze(&ds, &AnalysisConfig::default()).unwrap();
        let tokens: Vec<_> = detail(&result)
            .ranks
            .iter()
            .map(|r| r.token.clone().unwrap_or_default())
            .collect();
        assert_eq!(tokens, ["a", "b", "c", "d"]);
    }

    #[test]
    fn min_count_filters_before_fitting() {
        let mut config = AnalysisConfig::default();
        config.zipf.min_count = 2.0;
        let ds = Dataset::from_values([100.0, 50.0, 33.0, 25.0, 1.0, 1.0]);
        let result = analyze(&ds, &config).unwrap();
        let d = detail(&result);
        assert_eq!(d.ranks.len(), 4);
        assert_eq!(d.filtered_items, 2);
        assert_eq!(d.filtered_occurrences, 2.0);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn two_ranks_are_insufficient() {
        let err = analyze(&Dataset::from_values([10.0, 5.0]), &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_skippable());
        assert!(err.to_string().contains("ranks 2 < minimum 3"));
    }

    #[test]
    fn flat_frequencies_are_not_zipfian() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 - f64::from(i % 2)).collect();
        let result = analyze(&Dataset::from_values(values), &AnalysisConfig::default()).unwrap();
        assert!(detail(&result).exponent.abs() < 0.1);
    }

    #[test]
    fn diversity_of_uniform_counts_is_log_k() {
        let h = shannon_diversity(&[5.0; 8]);
        assert!((h - 8f64.ln()).abs() < 1e-12);
    }
}
