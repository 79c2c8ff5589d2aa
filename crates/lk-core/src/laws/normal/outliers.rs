//! Outlier detectors for the Normal analyzer.
//!
//! Every detector returns ascending indices into the input slice.

use lk_common::detail::OutlierReport;
use lk_common::OutlierMethod;
use lk_config::NormalOptions;
use lk_math::descriptive::{mean, median, median_abs_deviation, quantile_sorted, std_dev};

/// Scales the MAD so modified z-scores are comparable to z-scores.
const MODIFIED_Z_FACTOR: f64 = 0.6745;
/// Mean absolute deviation to sigma, used when the MAD collapses to zero.
const MEAN_AD_FACTOR: f64 = 1.253_314;
/// Votes an index needs under `ensemble`.
pub const ENSEMBLE_VOTES: usize = 2;

pub fn zscore(values: &[f64], threshold: f64) -> Vec<usize> {
    let (Some(mu), Some(sd)) = (mean(values), std_dev(values)) else {
        return Vec::new();
    };
    if sd <= 0.0 {
        return Vec::new();
    }
    flag(values, |x| ((x - mu) / sd).abs() > threshold)
}

/// Iglewicz-Hoaglin modified z-score.
pub fn modified_zscore(values: &[f64], threshold: f64) -> Vec<usize> {
    let (Some(med), Some(mad)) = (median(values), median_abs_deviation(values)) else {
        return Vec::new();
    };
    let score: Box<dyn Fn(f64) -> f64> = if mad > 0.0 {
        Box::new(move |x| MODIFIED_Z_FACTOR * (x - med) / mad)
    } else {
        let mean_ad = values.iter().map(|x| (x - med).abs()).sum::<f64>() / values.len() as f64;
        if mean_ad <= 0.0 {
            return Vec::new();
        }
        Box::new(move |x| (x - med) / (MEAN_AD_FACTOR * mean_ad))
    };
    flag(values, |x| score(x).abs() > threshold)
}

/// Tukey fences at `multiplier` interquartile ranges.
pub fn iqr(values: &[f64], multiplier: f64) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
    else {
        return Vec::new();
    };
    let spread = q3 - q1;
    let (lo, hi) = (q1 - multiplier * spread, q3 + multiplier * spread);
    flag(values, |x| x < lo || x > hi)
}

/// Local outlier factor of every point, using `k` nearest neighbours on the line.
pub fn local_outlier_factors(values: &[f64], k: usize) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![1.0; n];
    }
    let k = k.clamp(1, n - 1);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();

    // Neighbours in sorted positions, found by expanding outward.
    let neighbours: Vec<Vec<usize>> = (0..n)
        .map(|p| {
            let (mut left, mut right) = (p, p);
            let mut found = Vec::with_capacity(k);
            while found.len() < k {
                let take_left = match (left.checked_sub(1), (right + 1 < n).then_some(right + 1)) {
                    (Some(l), Some(r)) => sorted[p] - sorted[l] <= sorted[r] - sorted[p],
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if take_left {
                    left -= 1;
                    found.push(left);
                } else {
                    right += 1;
                    found.push(right);
                }
            }
            found
        })
        .collect();
    let k_distance: Vec<f64> = (0..n)
        .map(|p| {
            neighbours[p]
                .iter()
                .map(|&o| (sorted[p] - sorted[o]).abs())
                .fold(0.0, f64::max)
        })
        .collect();

    let spread = sorted[n - 1] - sorted[0];
    let floor = (spread * 1e-12).max(f64::MIN_POSITIVE);
    let lrd: Vec<f64> = (0..n)
        .map(|p| {
            let reach: f64 = neighbours[p]
                .iter()
                .map(|&o| k_distance[o].max((sorted[p] - sorted[o]).abs()))
                .sum::<f64>()
                / k as f64;
            1.0 / reach.max(floor)
        })
        .collect();

    let mut factors = vec![1.0; n];
    for p in 0..n {
        let neighbour_lrd = neighbours[p].iter().map(|&o| lrd[o]).sum::<f64>() / k as f64;
        factors[order[p]] = neighbour_lrd / lrd[p];
    }
    factors
}

pub fn lof(values: &[f64], k: usize, threshold: f64) -> Vec<usize> {
    local_outlier_factors(values, k)
        .iter()
        .enumerate()
        .filter(|(_, f)| **f > threshold)
        .map(|(i, _)| i)
        .collect()
}

fn flag(values: &[f64], is_outlier: impl Fn(f64) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &x)| is_outlier(x))
        .map(|(i, _)| i)
        .collect()
}

/// Run the configured detector.
pub fn detect(values: &[f64], method: OutlierMethod, options: &NormalOptions) -> OutlierReport {
    let (indices, threshold) = match method {
        OutlierMethod::Zscore => (zscore(values, options.zscore_threshold), options.zscore_threshold),
        OutlierMethod::ModifiedZscore => (
            modified_zscore(values, options.modified_zscore_threshold),
            options.modified_zscore_threshold,
        ),
        OutlierMethod::Iqr => (iqr(values, options.iqr_multiplier), options.iqr_multiplier),
        OutlierMethod::Lof => (
            lof(values, options.lof_neighbors, options.lof_threshold),
            options.lof_threshold,
        ),
        OutlierMethod::Ensemble => {
            let mut votes = vec![0usize; values.len()];
            for i in zscore(values, options.zscore_threshold)
                .into_iter()
                .chain(modified_zscore(values, options.modified_zscore_threshold))
                .chain(iqr(values, options.iqr_multiplier))
            {
                votes[i] += 1;
            }
            let indices = (0..values.len()).filter(|&i| votes[i] >= ENSEMBLE_VOTES).collect();
            (indices, ENSEMBLE_VOTES as f64)
        }
    };
    OutlierReport {
        method,
        threshold,
        values: indices.iter().map(|&i: &usize| values[i]).collect(),
        indices,
    }
}
