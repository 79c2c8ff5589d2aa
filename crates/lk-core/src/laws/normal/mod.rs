//! Normal distribution analysis.
//!
//! The shape test (Shapiro-Wilk, Anderson-Darling or Lilliefors) supplies the
//! p-value; risk follows the larger of |skewness| and |excess kurtosis| / 2.
//! Outlier detection, process capability and rolling-window monitoring are
//! reported alongside.

pub mod outliers;
pub mod process;

use lk_common::detail::NormalDetail;
use lk_common::{
    AnalyzerResult, ConfidenceInterval, DistributionDetail, Error, LawKind, NormalityTest, Result,
};
use lk_config::AnalysisConfig;
use lk_math::descriptive::moments;
use lk_math::shapiro::{shapiro_wilk, SHAPIRO_MAX_N};
use lk_math::{
    anderson_darling_normal_p_value, anderson_darling_statistic, ks_statistic,
    lilliefors_p_value, normal_cdf_with, z_for_confidence,
};
use tracing::{debug, instrument};

use super::risk::{self, Cutoffs};
use super::{ensure_finite, probability, require_sample};
use crate::dataset::Dataset;

const LAW: LawKind = LawKind::Normal;

/// Bands for max(|skewness|, |excess kurtosis| / 2).
pub const SHAPE_CUTOFFS: Cutoffs = [0.5, 1.0, 2.0];

/// The Lilliefors p-value approximation needs at least this many values.
pub const LILLIEFORS_MINIMUM: usize = 4;

/// Evenly spaced order statistics, keeping both extremes.
fn even_subsample(sorted: &[f64], size: usize) -> Vec<f64> {
    if sorted.len() <= size {
        return sorted.to_vec();
    }
    let last = sorted.len() - 1;
    (0..size).map(|i| sorted[i * last / (size - 1)]).collect()
}

#[instrument(level = "debug", skip_all, fields(law = "normal", n = dataset.len()))]
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    let options = &config.normal;
    let minimum = LAW.default_minimum_sample();
    let values = dataset.values();
    let n = values.len();
    require_sample(LAW, n, minimum)?;

    let m = moments(values)
        .ok_or_else(|| Error::computation(LAW, "sample has zero variance"))?;
    let skewness = ensure_finite(LAW, "skewness", m.skewness)?;
    let excess_kurtosis = ensure_finite(LAW, "excess kurtosis", m.excess_kurtosis)?;
    let effect = skewness.abs().max(excess_kurtosis.abs() / 2.0);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let cdf = |x: f64| normal_cdf_with(x, m.mean, m.std_dev);
    let mut test_subsample = None;
    let (statistic, p_value) = match options.test_method {
        NormalityTest::Shapiro => {
            let sample = if n > SHAPIRO_MAX_N {
                test_subsample = Some(SHAPIRO_MAX_N);
                even_subsample(&sorted, SHAPIRO_MAX_N)
            } else {
                sorted.clone()
            };
            let sw = shapiro_wilk(&sample)
                .ok_or_else(|| Error::computation(LAW, "Shapiro-Wilk is undefined for this sample"))?;
            (sw.w, sw.p_value)
        }
        NormalityTest::Anderson => {
            let a2 = anderson_darling_statistic(&sorted, cdf);
            (a2, anderson_darling_normal_p_value(a2, n))
        }
        NormalityTest::Ks => {
            if n < LILLIEFORS_MINIMUM {
                return Err(Error::insufficient_counted(
                    LAW,
                    "values for the Lilliefors test",
                    n,
                    LILLIEFORS_MINIMUM,
                ));
            }
            let d = ks_statistic(&sorted, cdf);
            (d, lilliefors_p_value(d, n))
        }
    };
    let statistic = ensure_finite(LAW, "normality statistic", statistic)?;
    let p_value = probability(LAW, p_value)?;

    let outliers = outliers::detect(values, config.outlier_method, options);
    let quality = options
        .spec_limits
        .map(|limits| process::capability(values, m.mean, m.std_dev, limits));
    let time_series = options
        .timeseries_window
        .map(|w| process::rolling(values, w, options.timeseries_threshold, m.mean, m.std_dev))
        .transpose()?;

    let risk_level = risk::assess(
        effect,
        &SHAPE_CUTOFFS,
        config.threshold_profile,
        config.confidence_level,
        n,
    );
    debug!(
        statistic,
        p_value,
        skewness,
        excess_kurtosis,
        outliers = outliers.indices.len(),
        risk = %risk_level,
        "normal computed"
    );

    let mut warnings = Vec::new();
    if let Some(size) = test_subsample {
        warnings.push(format!(
            "Shapiro-Wilk ran on {size} evenly spaced order statistics of {n} values"
        ));
    }
    if !outliers.indices.is_empty() {
        warnings.push(format!(
            "{} outliers flagged by {}",
            outliers.indices.len(),
            outliers.method
        ));
    }
    if let Some(qc) = &quality {
        if !qc.capable {
            warnings.push(format!("process is not capable (Cpk {:.2})", qc.cpk));
        }
    }

    let half = z_for_confidence(config.confidence_level) * m.std_dev / (n as f64).sqrt();
    Ok(AnalyzerResult {
        law: LAW,
        sample_count: n,
        minimum_sample: minimum,
        test_statistic: statistic,
        p_value,
        effect_size: effect,
        confidence_interval: ConfidenceInterval {
            parameter: "mean".to_string(),
            estimate: m.mean,
            lower: m.mean - half,
            upper: m.mean + half,
            level: config.confidence_level,
        },
        risk_level,
        detail: DistributionDetail::Normal(NormalDetail {
            test: options.test_method,
            mean: m.mean,
            std_dev: m.std_dev,
            skewness,
            excess_kurtosis,
            outliers,
            quality,
            time_series,
            test_subsample,
        }),
        warnings,
    })
}
