//! Shapiro-Wilk W test with Royston's (1995) coefficient and p-value
//! approximations (algorithm AS R94).

use serde::Serialize;

use super::normal::{normal_quantile, normal_sf};

/// Largest sample AS R94 is calibrated for.
pub const SHAPIRO_MAX_N: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub w: f64,
    pub p_value: f64,
}

fn poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Runs the test on an ascending sample of 3..=5000 values.
///
/// Returns `None` for out-of-range sizes or a zero-range sample.
pub fn shapiro_wilk(sorted: &[f64]) -> Option<ShapiroWilk> {
    let n = sorted.len();
    if !(3..=SHAPIRO_MAX_N).contains(&n) {
        return None;
    }
    let range = sorted[n - 1] - sorted[0];
    if !range.is_finite() || range <= 0.0 {
        return None;
    }

    let coeffs = coefficients(n);
    let half = n / 2;
    let mut full = vec![0.0; n];
    for (i, &a) in coeffs.iter().enumerate().take(half) {
        full[n - 1 - i] = a;
        full[i] = -a;
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
    let numerator: f64 = full.iter().zip(sorted).map(|(a, x)| a * x).sum();
    let norm: f64 = full.iter().map(|a| a * a).sum();
    let w = ((numerator * numerator) / (norm * ss)).clamp(0.0, 1.0);

    Some(ShapiroWilk {
        w,
        p_value: p_value(w, n),
    })
}

/// Upper-half coefficients a_1 >= a_2 >= ... (positive), largest first.
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }
    let an = n as f64;
    // m[i] is the expected normal order statistic, negative for the lower half.
    let m: Vec<f64> = (1..=half)
        .map(|i| normal_quantile((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a: Vec<f64> = Vec::with_capacity(half);
    a.push(a1);
    if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a.push(a2);
        a.extend(m[2..].iter().map(|mi| -mi / fac));
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        a.extend(m[1..].iter().map(|mi| -mi / fac));
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    let w1 = 1.0 - w;
    if n == 3 {
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        return (pi6 * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0);
    }
    if w1 <= 0.0 {
        return 1.0;
    }
    let an = n as f64;
    let mut y = w1.ln();
    let (mean, sd) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    normal_sf((y - mean) / sd).clamp(0.0, 1.0)
}
