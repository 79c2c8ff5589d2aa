//! Pareto concentration analysis.

use lk_common::detail::{LorenzPoint, ParetoDetail, PercentileShare};
use lk_common::{AnalyzerResult, ConfidenceInterval, DistributionDetail, Error, LawKind, Result};
use lk_config::AnalysisConfig;
use lk_math::{ks_p_value, ks_statistic, stable_sum, z_for_confidence};
use tracing::{debug, instrument};

use super::risk::{self, Cutoffs};
use super::{ensure_finite, probability};
use crate::dataset::Dataset;

const LAW: LawKind = LawKind::Pareto;

/// Bands for |Gini - reference Gini|.
pub const GINI_GAP_CUTOFFS: Cutoffs = [0.1, 0.2, 0.35];

/// Longest Lorenz curve emitted in a result; longer curves are thinned.
pub const MAX_LORENZ_POINTS: usize = 201;

/// Gini coefficient of an ascending, non-negative sample.
///
/// Equals one minus twice the trapezoidal area under the discrete Lorenz
/// curve. Zero for identical values, `1 - 1/n` when one item holds
/// everything.
pub fn gini_coefficient(ascending: &[f64]) -> Option<f64> {
    let n = ascending.len();
    let total = stable_sum(ascending.iter().copied());
    if n == 0 || total <= 0.0 || !total.is_finite() {
        return None;
    }
    let weighted = stable_sum(
        ascending
            .iter()
            .enumerate()
            .map(|(i, &x)| (i + 1) as f64 * x),
    );
    let nf = n as f64;
    Some((2.0 * weighted / (nf * total) - (nf + 1.0) / nf).clamp(0.0, 1.0))
}

/// Lorenz curve of an ascending sample: (0,0), then one point per item,
/// ending exactly at (1,1).
pub fn lorenz_curve(ascending: &[f64]) -> Vec<LorenzPoint> {
    let n = ascending.len();
    let total = stable_sum(ascending.iter().copied());
    let mut points = Vec::with_capacity(n + 1);
    points.push(LorenzPoint {
        population: 0.0,
        value: 0.0,
    });
    if n == 0 || total <= 0.0 {
        return points;
    }
    let mut running = 0.0;
    for (i, &x) in ascending.iter().enumerate() {
        running += x;
        points.push(LorenzPoint {
            population: (i + 1) as f64 / n as f64,
            value: (running / total).min(1.0),
        });
    }
    if let Some(last) = points.last_mut() {
        *last = LorenzPoint {
            population: 1.0,
            value: 1.0,
        };
    }
    points
}

fn thin(points: Vec<LorenzPoint>, max: usize) -> Vec<LorenzPoint> {
    if points.len() <= max {
        return points;
    }
    let last = points.len() - 1;
    (0..max)
        .map(|i| points[i * last / (max - 1)])
        .collect()
}

/// Gini implied by a concentration law "top (1 - r) holds r".
///
/// Solves r = (1 - r)^(1 - 1/alpha) for the Pareto shape and returns
/// 1 / (2 alpha - 1); 0 for r = 0.5.
pub fn reference_gini(concentration_ratio: f64) -> f64 {
    let r = concentration_ratio;
    let inv_alpha = 1.0 - r.ln() / (1.0 - r).ln();
    (inv_alpha / (2.0 - inv_alpha)).clamp(0.0, 1.0)
}

/// Share of total value held by the top `fraction` of items, interpolating
/// inside the boundary item.
fn top_share(descending: &[f64], total: f64, fraction: f64) -> f64 {
    let x = fraction.clamp(0.0, 1.0) * descending.len() as f64;
    let whole = x.floor() as usize;
    let mut share = stable_sum(descending.iter().take(whole).copied());
    if let Some(&next) = descending.get(whole) {
        share += (x - whole as f64) * next;
    }
    (share / total).clamp(0.0, 1.0)
}

/// Leave-one-out Gini values in O(n), for the jackknife interval.
fn jackknife_ginis(ascending: &[f64]) -> Vec<f64> {
    let n = ascending.len();
    let total = stable_sum(ascending.iter().copied());
    let weighted = stable_sum(
        ascending
            .iter()
            .enumerate()
            .map(|(i, &x)| (i + 1) as f64 * x),
    );
    let mut suffix = vec![0.0; n + 1];
    for i in (0..n).rev() {
        suffix[i] = suffix[i + 1] + ascending[i];
    }
    let m = (n - 1) as f64;
    (0..n)
        .filter_map(|j| {
            let t = total - ascending[j];
            if t <= 0.0 {
                return None;
            }
            let w = weighted - (j + 1) as f64 * ascending[j] - suffix[j + 1];
            Some((2.0 * w / (m * t) - (m + 1.0) / m).clamp(0.0, 1.0))
        })
        .collect()
}

fn insights(descending: &[f64], total: f64, top_fraction: f64, top: f64) -> Vec<String> {
    let pct = |v: f64| v * 100.0;
    let mut out = Vec::new();
    let ideal = 1.0 - top_fraction;
    if (top - ideal).abs() <= 0.05 {
        out.push(format!(
            "Close to the Pareto principle: the top {:.0}% hold {:.1}% of the total",
            pct(top_fraction),
            pct(top)
        ));
    } else if top > ideal {
        out.push(format!(
            "Highly concentrated: the top {:.0}% hold {:.1}% of the total",
            pct(top_fraction),
            pct(top)
        ));
    } else {
        out.push(format!(
            "Dispersed: the top {:.0}% hold only {:.1}% of the total",
            pct(top_fraction),
            pct(top)
        ));
    }
    out.push(format!(
        "Top 10% concentration: {:.1}% of the total",
        pct(top_share(descending, total, 0.1))
    ));
    let largest = descending[0];
    let median = descending[descending.len() / 2];
    if median > 0.0 {
        let ratio = largest / median;
        out.push(if ratio > 10.0 {
            format!("Extreme disparity: the largest value is {ratio:.1}x the median")
        } else if ratio > 5.0 {
            format!("Marked disparity: the largest value is {ratio:.1}x the median")
        } else {
            format!("Relatively even: the largest value is {ratio:.1}x the median")
        });
    }
    out
}

#[instrument(level = "debug", skip_all, fields(law = "pareto", n = dataset.len()))]
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    let minimum = LAW.default_minimum_sample();
    let ratio = config.pareto.concentration_ratio;

    let mut ascending: Vec<f64> = dataset.values().iter().copied().filter(|v| *v > 0.0).collect();
    let ignored = dataset.len() - ascending.len();
    ascending.sort_by(f64::total_cmp);
    let mut distinct = ascending.clone();
    distinct.dedup();
    if distinct.len() < minimum {
        return Err(Error::insufficient_counted(
            LAW,
            "distinct positive values",
            distinct.len(),
            minimum,
        ));
    }
    let n = ascending.len();
    let total = stable_sum(ascending.iter().copied());
    if !total.is_finite() {
        return Err(Error::computation(LAW, "total value overflows"));
    }

    let descending: Vec<f64> = ascending.iter().rev().copied().collect();
    let mut running = 0.0;
    let cumulative_share: Vec<f64> = descending
        .iter()
        .map(|&x| {
            running += x;
            (running / total).min(1.0)
        })
        .collect();
    let vital_few = cumulative_share
        .iter()
        .position(|&s| s >= ratio - 1e-12)
        .map_or(n, |i| i + 1);
    let pareto_ratio = vital_few as f64 / n as f64;
    let top_fraction = 1.0 - ratio;
    let top = top_share(&descending, total, top_fraction);

    let gini = gini_coefficient(&ascending)
        .ok_or_else(|| Error::computation(LAW, "Gini coefficient is undefined"))?;
    let reference = reference_gini(ratio);
    let effect = ensure_finite(LAW, "Gini gap", (gini - reference).abs())?;

    // Pareto fit by maximum likelihood, scale fixed at the smallest value.
    let x_min = ascending[0];
    let log_sum = stable_sum(ascending.iter().map(|x| (x / x_min).ln()));
    let alpha = ensure_finite(LAW, "Pareto shape", n as f64 / log_sum)?;
    let d = ks_statistic(&ascending, |x| 1.0 - (x_min / x).powf(alpha));
    let p_value = probability(LAW, ks_p_value(d, n))?;

    let jack = jackknife_ginis(&ascending);
    let jack_mean = jack.iter().sum::<f64>() / jack.len().max(1) as f64;
    let jack_var = (n as f64 - 1.0) / n as f64
        * jack.iter().map(|g| (g - jack_mean).powi(2)).sum::<f64>();
    let half = z_for_confidence(config.confidence_level) * jack_var.sqrt();

    let lorenz = lorenz_curve(&ascending);
    let percentiles = config
        .pareto
        .percentiles
        .iter()
        .map(|&p| PercentileShare {
            percentile: p,
            value_share: top_share(&descending, total, p / 100.0),
        })
        .collect();

    let risk_level = risk::assess(
        effect,
        &GINI_GAP_CUTOFFS,
        config.threshold_profile,
        config.confidence_level,
        n,
    );
    debug!(gini, reference, pareto_ratio, alpha, risk = %risk_level, "pareto computed");

    let mut warnings = Vec::new();
    if ignored > 0 {
        warnings.push(format!("{ignored} non-positive values were ignored"));
    }

    Ok(AnalyzerResult {
        law: LAW,
        sample_count: n,
        minimum_sample: minimum,
        test_statistic: d,
        p_value,
        effect_size: effect,
        confidence_interval: ConfidenceInterval {
            parameter: "gini".to_string(),
            estimate: gini,
            lower: (gini - half).clamp(0.0, gini),
            upper: (gini + half).clamp(gini, 1.0),
            level: config.confidence_level,
        },
        risk_level,
        detail: DistributionDetail::Pareto(ParetoDetail {
            concentration_ratio: ratio,
            pareto_ratio,
            top_share: top,
            gini,
            reference_gini: reference,
            alpha,
            cumulative_share,
            lorenz: thin(lorenz, MAX_LORENZ_POINTS),
            percentiles,
            insights: insights(&descending, total, top_fraction, top),
        }),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lk_common::RiskLevel;

    fn detail(result: &AnalyzerResult) -> &ParetoDetail {
        match &result.detail {
            DistributionDetail::Pareto(d) => d,
            other => panic!("wrong detail: {other:?}"),
        }
    }

    #[test]
    fn gini_extremes() {
        assert!(gini_coefficient(&[5.0; 10]).unwrap().abs() < 1e-12);
        let mut concentrated = vec![0.0; 999];
        concentrated.push(100.0);
        let g = gini_coefficient(&concentrated).unwrap();
        assert!((g - 0.999).abs() < 1e-9);
    }

    #[test]
    fn gini_matches_lorenz_area() {
        let asc = [1.0, 2.0, 3.0, 10.0, 40.0];
        let lorenz = lorenz_curve(&asc);
        let area: f64 = lorenz
            .windows(2)
            .map(|w| (w[1].population - w[0].population) * (w[1].value + w[0].value) / 2.0)
            .sum();
        assert!((gini_coefficient(&asc).unwrap() - (1.0 - 2.0 * area)).abs() < 1e-12);
    }

    #[test]
    fn reference_gini_for_eighty_twenty() {
        assert!((reference_gini(0.8) - 0.7565).abs() < 1e-3);
        assert!(reference_gini(0.5).abs() < 1e-12);
    }

    #[test]
    fn jackknife_matches_brute_force() {
        let asc = [1.0, 3.0, 4.0, 9.0, 20.0];
        let fast = jackknife_ginis(&asc);
        for (j, g) in fast.iter().enumerate() {
            let mut rest = asc.to_vec();
            rest.remove(j);
            assert!((g - gini_coefficient(&rest).unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn sales_scenario() {
        let ds = Dataset::from_values([10000.0, 8000.0, 6000.0, 4000.0, 2000.0, 1000.0]);
        let result = analyze(&ds, &AnalysisConfig::default()).unwrap();
        let d = detail(&result);
        assert!(d.pareto_ratio > 0.0 && d.pareto_ratio <= 1.0);
        assert!((0.0..=1.0).contains(&d.gini));
        assert_eq!(d.lorenz.first().map(|p| (p.population, p.value)), Some((0.0, 0.0)));
        assert_eq!(d.lorenz.last().map(|p| (p.population, p.value)), Some((1.0, 1.0)));
        assert_eq!(d.percentiles.len(), 4);
        assert!(!d.insights.is_empty());
        // 10000 + 8000 + 6000 = 24000 of 31000 is below 80%; four items reach it.
        assert!((d.pareto_ratio - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_shares_count_from_the_largest_items() {
        let ds = Dataset::from_values([10000.0, 8000.0, 6000.0, 4000.0, 2000.0, 1000.0]);
        let mut config = AnalysisConfig::default();
        config.pareto.percentiles = vec![50.0, 80.0, 100.0];
        let result = analyze(&ds, &config).unwrap();
        let shares: Vec<f64> = detail(&result)
            .percentiles.iter().map(|p| p.value_share).collect();
        // Top three items hold 24000 of 31000.
        assert!((shares[0] - 24000.0 / 31000.0).abs() < 1e-12);
        // 4.8 items: the four largest plus 0.8 of the 2000.
        assert!((shares[1] - 29600.0 / 31000.0).abs() < 1e-12);
        assert!(shares[1] > 0.8);
        assert_eq!(shares[2], 1.0);
    }

    #[test]
    fn equal_values_are_far_from_the_pareto_law() {
        let values: Vec<f64> = (0..200).map(|i| 100.0 + f64::from(i % 2)).collect();
        let result = analyze(&Dataset::from_values(values), &AnalysisConfig::default()).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn single_distinct_value_is_insufficient() {
        let err = analyze(&Dataset::from_values([3.0; 10]), &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), 11);
        assert!(err.to_string().contains("distinct positive values 1 < minimum 2"));
    }

    #[test]
    fn long_curves_are_thinned_with_endpoints() {
        let values: Vec<f64> = (1..=5000).map(f64::from).collect();
        let result = analyze(&Dataset::from_values(values), &AnalysisConfig::default()).unwrap();
        let d = detail(&result);
        assert_eq!(d.lorenz.len(), MAX_LORENZ_POINTS);
        assert_eq!(d.lorenz[0].population, 0.0);
        assert_eq!(d.lorenz[MAX_LORENZ_POINTS - 1].value, 1.0);
        assert_eq!(d.cumulative_share.len(), 5000);
    }
}
