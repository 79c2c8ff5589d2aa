//! Descriptive statistics.
//!
//! Means use compensated summation, variances use Welford's update, and
//! quantiles use R-7 linear interpolation (Hyndman & Fan type 7). Every
//! function returns `None` for input it cannot summarize (empty, too short,
//! or containing non-finite values) instead of a NaN.

use serde::Serialize;

use super::stable::stable_sum;

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(stable_sum(data.iter().copied()) / data.len() as f64)
}

/// Sample variance (denominator n - 1).
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    welford(data)?.sample_variance()
}

/// Population variance (denominator n).
pub fn population_variance(data: &[f64]) -> Option<f64> {
    welford(data)?.population_variance()
}

/// Sample standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

fn welford(data: &[f64]) -> Option<Welford> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut acc = Welford::default();
    for &x in data {
        acc.update(x);
    }
    Some(acc)
}

#[derive(Debug, Default, Clone, Copy)]
struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn sample_variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }

    fn population_variance(&self) -> Option<f64> {
        (self.count >= 1).then(|| self.m2 / self.count as f64)
    }
}

/// First four moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    /// Sample variance (n - 1).
    pub variance: f64,
    pub std_dev: f64,
    /// Moment-based skewness g1 = m3 / m2^(3/2).
    pub skewness: f64,
    /// Moment-based excess kurtosis g2 = m4 / m2^2 - 3.
    pub excess_kurtosis: f64,
}

/// Computes [`Moments`]; needs at least 2 finite values and non-zero spread.
pub fn moments(data: &[f64]) -> Option<Moments> {
    let mean = mean(data)?;
    let variance = variance(data)?;
    let n = data.len() as f64;
    let (m2, m3, m4) = data.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
        let d = x - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);
    if m2 <= 0.0 {
        return None;
    }
    Some(Moments {
        count: data.len(),
        mean,
        variance,
        std_dev: variance.sqrt(),
        skewness: m3 / m2.powf(1.5),
        excess_kurtosis: m4 / (m2 * m2) - 3.0,
    })
}

/// R-7 quantile of an ascending slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// R-7 quantile of an unsorted sample.
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    let sorted = sorted_finite(data)?;
    quantile_sorted(&sorted, p)
}

/// Median of an unsorted sample.
pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// Median absolute deviation around the median (unscaled).
pub fn median_abs_deviation(data: &[f64]) -> Option<f64> {
    let med = median(data)?;
    let deviations: Vec<f64> = data.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

/// Ascending copy of the sample, or `None` if empty or any value is non-finite.
pub fn sorted_finite(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn mean_and_variance() {
        assert!((mean(&SAMPLE).unwrap() - 5.0).abs() < 1e-15);
        assert!((variance(&SAMPLE).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!((population_variance(&SAMPLE).unwrap() - 4.0).abs() < 1e-12);
        assert!((std_dev(&SAMPLE).unwrap() - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(mean(&[]).is_none());
        assert!(mean(&[1.0, f64::NAN]).is_none());
        assert!(variance(&[1.0]).is_none());
        assert!(moments(&[3.0, 3.0, 3.0]).is_none());
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        let m = moments(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(m.skewness.abs() < 1e-12);
        // Uniform-like spacing is platykurtic.
        assert!(m.excess_kurtosis < 0.0);
    }

    #[test]
    fn right_tail_gives_positive_skew() {
        let m = moments(&[1.0, 1.0, 1.0, 2.0, 10.0]).unwrap();
        assert!(m.skewness > 1.0);
    }

    #[test]
    fn r7_quantiles() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.0), Some(1.0));
        assert_eq!(quantile(&data, 1.0), Some(4.0));
        assert!((quantile(&data, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((median(&data).unwrap() - 2.5).abs() < 1e-12);
        assert!(quantile(&data, 1.5).is_none());
    }

    #[test]
    fn mad_of_sample() {
        // median 4.5, deviations 2.5 0.5 0.5 0.5 0.5 0.5 2.5 4.5
        assert!((median_abs_deviation(&SAMPLE).unwrap() - 0.5).abs() < 1e-12);
    }
}
