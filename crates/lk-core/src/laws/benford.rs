//! Benford's law of significant digits.
//!
//! Three tests share one pipeline: bucket each value by a digit key, compare
//! the observed proportions with the expected ones by chi-square, and grade
//! the mean absolute deviation (MAD) against Nigrini's conformity bands.

use lk_common::detail::{BenfordDetail, ConformityVerdict, DigitBucket};
use lk_common::{
    AnalyzerResult, ConfidenceInterval, DigitTest, DistributionDetail, Error, LawKind, Result,
    RiskLevel,
};
use lk_config::AnalysisConfig;
use lk_math::{chi_square_sf, z_for_confidence};
use tracing::{debug, instrument, warn};

use super::risk::{self, Cutoffs};
use super::{ensure_finite, probability, SMALL_SAMPLE_WARNING};
use crate::dataset::Dataset;

const LAW: LawKind = LawKind::Benford;

/// Nigrini's MAD conformity bands per test.
pub const FIRST_DIGIT_CUTOFFS: Cutoffs = [0.006, 0.012, 0.015];
pub const SECOND_DIGIT_CUTOFFS: Cutoffs = [0.008, 0.010, 0.012];
pub const LAST_TWO_CUTOFFS: Cutoffs = [0.003, 0.005, 0.007];

/// Expected first-digit proportion, P(d) = log10(1 + 1/d).
pub fn first_digit_probability(d: u8) -> f64 {
    (1.0 + 1.0 / f64::from(d)).log10()
}

/// Expected second-digit proportion, summed over every first digit.
pub fn second_digit_probability(d: u8) -> f64 {
    (1..=9u32)
        .map(|k| (1.0 + 1.0 / f64::from(10 * k + u32::from(d))).log10())
        .sum()
}

/// Significant digits of |v| as produced by scientific formatting.
fn significant_digits(value: f64) -> Option<(u8, u8)> {
    let abs = value.abs();
    if !abs.is_finite() || abs == 0.0 {
        return None;
    }
    let formatted = format!("{abs:e}");
    let mut chars = formatted.chars().filter(|c| *c != '.');
    let first = chars.next()?.to_digit(10)? as u8;
    let second = match chars.next() {
        Some(c) if c.is_ascii_digit() => c.to_digit(10)? as u8,
        _ => 0,
    };
    Some((first, second))
}

/// Leading significant digit 1..=9 of |v|, or `None` for zero.
pub fn first_digit(value: f64) -> Option<u8> {
    significant_digits(value).map(|(f, _)| f)
}

/// Bucket key for a value under a test, or `None` if the value is ignored.
pub fn digit_key(value: f64, test: DigitTest) -> Option<u8> {
    match test {
        DigitTest::First => first_digit(value),
        DigitTest::Second => {
            if value.abs() < 10.0 {
                return None;
            }
            significant_digits(value).map(|(_, s)| s)
        }
        DigitTest::LastTwo => {
            let int = value.abs().trunc();
            if int < 10.0 || !int.is_finite() {
                return None;
            }
            Some((int % 100.0) as u8)
        }
    }
}

struct TestShape {
    keys: Vec<u8>,
    expected: Vec<f64>,
    cutoffs: Cutoffs,
}

fn shape(test: DigitTest) -> TestShape {
    match test {
        DigitTest::First => {
            let keys: Vec<u8> = (1..=9).collect();
            let expected = keys.iter().map(|&d| first_digit_probability(d)).collect();
            TestShape {
                keys,
                expected,
                cutoffs: FIRST_DIGIT_CUTOFFS,
            }
        }
        DigitTest::Second => {
            let keys: Vec<u8> = (0..=9).collect();
            let expected = keys.iter().map(|&d| second_digit_probability(d)).collect();
            TestShape {
                keys,
                expected,
                cutoffs: SECOND_DIGIT_CUTOFFS,
            }
        }
        DigitTest::LastTwo => TestShape {
            keys: (0..=99).collect(),
            expected: vec![0.01; 100],
            cutoffs: LAST_TWO_CUTOFFS,
        },
    }
}

/// Wilson score interval for a proportion.
pub fn wilson_interval(successes: u64, n: u64, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 1.0);
    }
    let nf = n as f64;
    let p = successes as f64 / nf;
    let z2 = z * z;
    let denom = 1.0 + z2 / nf;
    let center = (p + z2 / (2.0 * nf)) / denom;
    let half = z / denom * (p * (1.0 - p) / nf + z2 / (4.0 * nf * nf)).sqrt();
    ((center - half).max(0.0), (center + half).min(1.0))
}

pub fn verdict_for(risk: RiskLevel) -> ConformityVerdict {
    match risk {
        RiskLevel::Low => ConformityVerdict::CloseConformity,
        RiskLevel::Medium => ConformityVerdict::AcceptableConformity,
        RiskLevel::High => ConformityVerdict::MarginalConformity,
        RiskLevel::Critical => ConformityVerdict::Nonconformity,
    }
}

#[instrument(level = "debug", skip_all, fields(law = "benford", n = dataset.len()))]
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    let test = config.benford.test_method;
    let minimum = LAW.default_minimum_sample();
    let shape = shape(test);

    let mut counts = vec![0u64; shape.keys.len()];
    let mut ignored = 0usize;
    let offset = usize::from(shape.keys[0]);
    for &v in dataset.values() {
        match digit_key(v, test) {
            Some(k) => counts[usize::from(k) - offset] += 1,
            None => ignored += 1,
        }
    }
    let n: u64 = counts.iter().sum();
    let n_usize = n as usize;
    if n_usize < minimum {
        return Err(Error::insufficient_counted(
            LAW,
            "values with a usable digit",
            n_usize,
            minimum,
        ));
    }

    let mut warnings = Vec::new();
    if n_usize < SMALL_SAMPLE_WARNING {
        warn!(n = n_usize, "small Benford sample");
        warnings.push(format!(
            "{n_usize} values analyzed; Benford conformity is unreliable below {SMALL_SAMPLE_WARNING}"
        ));
    }
    if ignored > 0 {
        warnings.push(format!("{ignored} values without a usable digit were ignored"));
    }

    let z = z_for_confidence(config.confidence_level);
    let nf = n as f64;
    let mut chi_square = 0.0;
    let mut mad_sum = 0.0;
    let mut mad_lower = 0.0;
    let mut mad_upper = 0.0;
    let mut buckets = Vec::with_capacity(shape.keys.len());
    for ((&digit, &expected), &count) in shape.keys.iter().zip(&shape.expected).zip(&counts) {
        let observed = count as f64 / nf;
        let expected_count = expected * nf;
        chi_square += (count as f64 - expected_count).powi(2) / expected_count;
        mad_sum += (observed - expected).abs();

        let (lower, upper) = wilson_interval(count, n, z);
        mad_lower += if expected < lower {
            lower - expected
        } else if expected > upper {
            expected - upper
        } else {
            0.0
        };
        mad_upper += (lower - expected).abs().max((upper - expected).abs());

        buckets.push(DigitBucket {
            digit,
            observed_count: count,
            observed,
            expected,
            lower,
            upper,
        });
    }
    let k = shape.keys.len() as f64;
    let mad = ensure_finite(LAW, "mean absolute deviation", mad_sum / k)?;
    let chi_square = ensure_finite(LAW, "chi-square statistic", chi_square)?;
    let df = k - 1.0;
    let p_value = probability(LAW, chi_square_sf(chi_square, df))?;

    let risk_level = risk::assess(
        mad,
        &shape.cutoffs,
        config.threshold_profile,
        config.confidence_level,
        n_usize,
    );
    debug!(mad, chi_square, p_value, risk = %risk_level, "benford computed");

    Ok(AnalyzerResult {
        law: LAW,
        sample_count: n_usize,
        minimum_sample: minimum,
        test_statistic: chi_square,
        p_value,
        effect_size: mad,
        confidence_interval: ConfidenceInterval {
            parameter: "mad".to_string(),
            estimate: mad,
            lower: (mad_lower / k).min(mad),
            upper: (mad_upper / k).max(mad),
            level: config.confidence_level,
        },
        risk_level,
        detail: DistributionDetail::Benford(BenfordDetail {
            test,
            buckets,
            mad,
            verdict: verdict_for(risk_level),
            ignored,
        }),
        warnings,
    })
}
