//! Cross-law diagnostics: conflicts, consistency, data characteristics.

use lk_common::result::{DataType, OutlierLevel, SampleSizeCategory, ScaleRange};
use lk_common::{
    AnalyzerResult, Conflict, ConflictKind, DataCharacteristics, LawKind, OverallAssessment,
    RiskLevel,
};
use lk_math::descriptive::population_variance;

use crate::dataset::Dataset;
use crate::laws::normal::outliers;

/// Risk-level steps two laws must differ by to count as conflicting.
pub const CONFLICT_STEP_GAP: u8 = 2;

/// Attached to every diagnostic report.
pub const METHOD_NOTE: &str = "Conflicts are flagged when two laws' risk levels differ by more \
than one step. This compares effect-size bands heuristically; it is not a formal statistical test.";

const DISCRETE_MAX_LEVELS: usize = 20;
const IQR_FENCE: f64 = 1.5;

fn conflict_kind(a: LawKind, b: LawKind) -> ConflictKind {
    use LawKind::*;
    let pair = |x, y| (a == x && b == y) || (a == y && b == x);
    if a == Benford || b == Benford {
        ConflictKind::QualityDisagreement
    } else if pair(Normal, Poisson) {
        ConflictKind::DistributionMismatch
    } else if pair(Pareto, Zipf) {
        ConflictKind::ScaleIncompatibility
    } else {
        ConflictKind::Methodological
    }
}

fn explain(kind: ConflictKind) -> (&'static str, &'static str) {
    match kind {
        ConflictKind::QualityDisagreement => (
            "digit-level quality and distribution shape point in different directions",
            "check the source for rounding, thresholds or manual entry before trusting either verdict",
        ),
        ConflictKind::DistributionMismatch => (
            "the data cannot be both continuous-symmetric and count-like at once",
            "decide whether the values are measurements or event counts and keep the matching law",
        ),
        ConflictKind::ScaleIncompatibility => (
            "concentration and rank-frequency laws react differently to the value scale",
            "confirm the values are magnitudes (Pareto) or frequencies (Zipf), not a mixture",
        ),
        ConflictKind::Methodological => (
            "the laws measure unrelated properties of the data",
            "weigh the law whose assumptions match how the data was produced",
        ),
    }
}

/// Every pair of results whose risk levels are at least
/// [`CONFLICT_STEP_GAP`] steps apart, in result order.
pub fn conflicts(results: &[AnalyzerResult]) -> Vec<Conflict> {
    let mut out = Vec::new();
    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            let gap = a.risk_level.steps_between(b.risk_level);
            if gap < CONFLICT_STEP_GAP {
                continue;
            }
            let kind = conflict_kind(a.law, b.law);
            let (cause, resolution) = explain(kind);
            out.push(Conflict {
                kind,
                laws: [a.law, b.law],
                risk_levels: [a.risk_level, b.risk_level],
                step_gap: gap,
                effect_sizes: [a.effect_size, b.effect_size],
                description: format!(
                    "{} reports {} risk while {} reports {}",
                    a.law, a.risk_level, b.law, b.risk_level
                ),
                likely_cause: cause.to_string(),
                resolution: resolution.to_string(),
            });
        }
    }
    out
}

/// One minus the population variance of the per-law quality scores.
pub fn consistency_score(results: &[AnalyzerResult]) -> f64 {
    let scores: Vec<f64> = results.iter().map(|r| r.risk_level.quality_score()).collect();
    population_variance(&scores).map_or(1.0, |v| (1.0 - v).clamp(0.0, 1.0))
}

pub fn overall_assessment(results: &[AnalyzerResult], conflicts: &[Conflict]) -> OverallAssessment {
    let n = results.len();
    let low = results.iter().filter(|r| r.risk_level == RiskLevel::Low).count();
    let bad = results.iter().filter(|r| r.risk_level >= RiskLevel::High).count();
    if n > 0 && low == n {
        OverallAssessment::Excellent
    } else if 2 * bad >= n {
        OverallAssessment::Problematic
    } else if bad > 0 && conflicts.len() > 2 {
        OverallAssessment::Concerning
    } else if bad == 0 && 3 * low >= 2 * n {
        OverallAssessment::Good
    } else {
        OverallAssessment::Mixed
    }
}

pub fn characteristics(dataset: &Dataset) -> DataCharacteristics {
    let values = dataset.values();

    let data_type = if values.iter().all(|v| v.fract() == 0.0) {
        let mut levels = values.to_vec();
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        if levels.len() <= DISCRETE_MAX_LEVELS {
            DataType::Discrete
        } else {
            DataType::Integer
        }
    } else {
        DataType::Continuous
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale_range = if values.is_empty() || min <= 0.0 {
        ScaleRange::Mixed
    } else {
        match max / min {
            r if r < 100.0 => ScaleRange::Narrow,
            r if r < 1e4 => ScaleRange::Medium,
            _ => ScaleRange::Wide,
        }
    };

    let sample_size = match values.len() {
        n if n < 30 => SampleSizeCategory::Small,
        n if n < 300 => SampleSizeCategory::Medium,
        n if n < 3000 => SampleSizeCategory::Large,
        _ => SampleSizeCategory::VeryLarge,
    };

    let ratio = if values.is_empty() {
        0.0
    } else {
        outliers::iqr(values, IQR_FENCE).len() as f64 / values.len() as f64
    };
    let outlier_level = match ratio {
        r if r == 0.0 => OutlierLevel::None,
        r if r < 0.05 => OutlierLevel::Low,
        r if r < 0.1 => OutlierLevel::Moderate,
        r if r < 0.2 => OutlierLevel::High,
        _ => OutlierLevel::Extreme,
    };

    DataCharacteristics {
        data_type,
        scale_range,
        sample_size,
        outlier_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lk_common::detail::{BenfordDetail, ConformityVerdict};
    use lk_common::{ConfidenceInterval, DigitTest, DistributionDetail};

    fn result(law: LawKind, risk: RiskLevel) -> AnalyzerResult {
        AnalyzerResult {
            law,
            sample_count: 100,
            minimum_sample: 5,
            test_statistic: 0.0,
            p_value: 1.0,
            effect_size: 0.0,
            confidence_interval: ConfidenceInterval {
                parameter: "x".into(),
                estimate: 0.0,
                lower: 0.0,
                upper: 0.0,
                level: 0.95,
            },
            risk_level: risk,
            detail: DistributionDetail::Benford(BenfordDetail {
                test: DigitTest::First,
                buckets: Vec::new(),
                mad: 0.0,
                verdict: ConformityVerdict::CloseConformity,
                ignored: 0,
            }),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn one_step_apart_is_not_a_conflict() {
        let rs = [
            result(LawKind::Benford, RiskLevel::Low),
            result(LawKind::Pareto, RiskLevel::Medium),
        ];
        assert!(conflicts(&rs).is_empty());
    }

    #[test]
    fn low_versus_critical_conflicts() {
        let rs = [
            result(LawKind::Normal, RiskLevel::Low),
            result(LawKind::Poisson, RiskLevel::Critical),
            result(LawKind::Benford, RiskLevel::High),
        ];
        let found = conflicts(&rs);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, ConflictKind::DistributionMismatch);
        assert_eq!(found[0].step_gap, 3);
        assert_eq!(found[1].laws, [LawKind::Normal, LawKind::Benford]);
        assert_eq!(found[1].kind, ConflictKind::QualityDisagreement);
    }

    #[test]
    fn conflict_kinds_for_remaining_pairs() {
        assert_eq!(conflict_kind(LawKind::Zipf, LawKind::Pareto), ConflictKind::ScaleIncompatibility);
        assert_eq!(conflict_kind(LawKind::Pareto, LawKind::Normal), ConflictKind::Methodological);
    }

    #[test]
    fn consistency_and_assessment() {
        let all_low: Vec<_> = LawKind::ALL.iter().map(|&l| result(l, RiskLevel::Low)).collect();
        assert_eq!(consistency_score(&all_low), 1.0);
        assert_eq!(overall_assessment(&all_low, &[]), OverallAssessment::Excellent);

        let split = [
            result(LawKind::Benford, RiskLevel::Low),
            result(LawKind::Normal, RiskLevel::Critical),
        ];
        assert!((consistency_score(&split) - 0.75).abs() < 1e-12);
        assert_eq!(overall_assessment(&split, &conflicts(&split)), OverallAssessment::Problematic);

        let mostly_low = [
            result(LawKind::Benford, RiskLevel::Low),
            result(LawKind::Pareto, RiskLevel::Low),
            result(LawKind::Zipf, RiskLevel::Medium),
        ];
        assert_eq!(overall_assessment(&mostly_low, &[]), OverallAssessment::Good);
    }

    #[test]
    fn characteristics_of_counts_and_measurements() {
        let counts = Dataset::from_values((0..50).map(|i| f64::from(i % 4)));
        let c = characteristics(&counts);
        assert_eq!(c.data_type, DataType::Discrete);
        assert_eq!(c.scale_range, ScaleRange::Mixed);
        assert_eq!(c.sample_size, SampleSizeCategory::Medium);

        let measured = Dataset::from_values((1..=400).map(|i| f64::from(i) * 1.5));
        let c = characteristics(&measured);
        assert_eq!(c.data_type, DataType::Continuous);
        assert_eq!(c.scale_range, ScaleRange::Medium);
        assert_eq!(c.sample_size, SampleSizeCategory::Large);
        assert_eq!(c.outlier_level, OutlierLevel::None);
    }
}
