//! Ordinary least squares on a single predictor.

use serde::Serialize;

/// Result of fitting `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1].
    pub r_squared: f64,
    /// Standard error of the slope; infinite when n = 2.
    pub slope_std_error: f64,
    pub n: usize,
}

/// Fits a least-squares line. Needs two or more points and a non-constant `x`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return None;
    }
    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let sse = (syy - slope * sxy).max(0.0);
    let r_squared = if syy > 0.0 {
        (1.0 - sse / syy).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let slope_std_error = if n > 2 {
        (sse / (nf - 2.0) / sxx).sqrt()
    } else {
        f64::INFINITY
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        slope_std_error,
        n,
    })
}

/// Pearson correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let fit = linear_fit(x, y)?;
    let r = fit.r_squared.sqrt();
    Some(if fit.slope < 0.0 { -r } else { r })
}
