//! Process capability and rolling-window monitoring.

use lk_common::detail::{QualityControl, TimeSeriesReport};
use lk_common::{Error, Result};
use lk_config::SpecLimits;
use lk_math::descriptive::{mean, std_dev};
use lk_math::normal_cdf_with;
use lk_math::regression::linear_fit;

/// Cpk at which a process counts as capable.
pub const CAPABLE_CPK: f64 = 1.33;

pub fn capability(values: &[f64], mu: f64, sigma: f64, limits: SpecLimits) -> QualityControl {
    let SpecLimits { lower, upper } = limits;
    let cp = (upper - lower) / (6.0 * sigma);
    let cpu = (upper - mu) / (3.0 * sigma);
    let cpl = (mu - lower) / (3.0 * sigma);
    let cpk = cpu.min(cpl);
    let outside = values.iter().filter(|&&x| x < lower || x > upper).count();
    let expected_out =
        normal_cdf_with(lower, mu, sigma) + (1.0 - normal_cdf_with(upper, mu, sigma));
    QualityControl {
        lower_spec: lower,
        upper_spec: upper,
        cp,
        cpk,
        cpu,
        cpl,
        out_of_spec_rate: outside as f64 / values.len() as f64,
        expected_ppm: expected_out * 1e6,
        capable: cpk >= CAPABLE_CPK,
    }
}

/// Rolling mean and standard deviation over `window` consecutive values.
///
/// Entry `i` covers `values[i..i + window]`. A window is flagged (by the
/// index of its last value) when its mean strays from the overall mean by
/// more than `threshold` standard errors of a window mean.
pub fn rolling(
    values: &[f64],
    window: usize,
    threshold: f64,
    mu: f64,
    sigma: f64,
) -> Result<TimeSeriesReport> {
    if window < 2 || values.len() < window {
        return Err(Error::config(
            "normal.timeseries_window",
            format!(
                "window {window} needs at least 2 and no more than the {} values supplied",
                values.len()
            ),
        ));
    }
    let limit = threshold * sigma / (window as f64).sqrt();
    let mut rolling_mean = Vec::with_capacity(values.len() - window + 1);
    let mut rolling_std = Vec::with_capacity(values.len() - window + 1);
    let mut flagged = Vec::new();
    for (start, slice) in values.windows(window).enumerate() {
        let m = mean(slice).unwrap_or(f64::NAN);
        let s = std_dev(slice).unwrap_or(0.0);
        if (m - mu).abs() > limit {
            flagged.push(start + window - 1);
        }
        rolling_mean.push(m);
        rolling_std.push(s);
    }
    let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let trend_slope = linear_fit(&index, values).map_or(0.0, |fit| fit.slope);

    Ok(TimeSeriesReport {
        window,
        threshold,
        rolling_mean,
        rolling_std,
        flagged,
        trend_slope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_process_capability() {
        let values = [9.0, 10.0, 11.0];
        let qc = capability(&values, 10.0, 1.0, SpecLimits { lower: 4.0, upper: 16.0 });
        assert!((qc.cp - 2.0).abs() < 1e-12);
        assert!((qc.cpk - 2.0).abs() < 1e-12);
        assert!(qc.capable);
        assert_eq!(qc.out_of_spec_rate, 0.0);
        assert!(qc.expected_ppm < 0.01);
    }

    #[test]
    fn off_centre_process_uses_the_nearer_limit() {
        let values = [11.0, 12.0, 13.0, 20.0];
        let qc = capability(&values, 12.0, 1.0, SpecLimits { lower: 6.0, upper: 15.0 });
        assert!((qc.cpu - 1.0).abs() < 1e-12);
        assert!((qc.cpl - 2.0).abs() < 1e-12);
        assert_eq!(qc.cpk, qc.cpu);
        assert!(!qc.capable);
        assert_eq!(qc.out_of_spec_rate, 0.25);
    }

    #[test]
    fn level_shift_is_flagged() {
        let mut values = vec![0.0, 1.0].repeat(20);
        values.extend(vec![5.0, 6.0].repeat(5));
        let mu = mean(&values).unwrap();
        let sigma = std_dev(&values).unwrap();
        let report = rolling(&values, 4, 3.0, mu, sigma).unwrap();
        assert_eq!(report.rolling_mean.len(), values.len() - 3);
        assert!(report.flagged.iter().all(|&i| i >= 40));
        assert!(report.flagged.contains(&(values.len() - 1)));
        assert!(report.trend_slope > 0.0);
    }

    #[test]
    fn window_longer_than_series_is_a_config_error() {
        let err = rolling(&[1.0, 2.0, 3.0], 5, 3.0, 2.0, 1.0).unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("normal.timeseries_window"));
    }
}
