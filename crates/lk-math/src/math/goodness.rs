//! Null distributions for goodness-of-fit statistics.
//!
//! Kolmogorov-Smirnov with a fully specified null, Lilliefors (normal null
//! with estimated parameters) and Anderson-Darling for the normal case.

use std::f64::consts::PI;

const KOLMOGOROV_TERMS: usize = 100;
const KOLMOGOROV_EPS: f64 = 1e-16;

/// Survival function of the limiting Kolmogorov distribution, P(K > lambda).
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda.is_nan() {
        return f64::NAN;
    }
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Jacobi theta form converges fast for small arguments.
        let y = -PI * PI / (8.0 * lambda * lambda);
        let mut cdf = 0.0;
        for k in 1..=KOLMOGOROV_TERMS {
            let odd = (2 * k - 1) as f64;
            let term = (odd * odd * y).exp();
            cdf += term;
            if term < KOLMOGOROV_EPS {
                break;
            }
        }
        let cdf = (2.0 * PI).sqrt() / lambda * cdf;
        return (1.0 - cdf).clamp(0.0, 1.0);
    }

    let mut sum = 0.0;
    for k in 1..=KOLMOGOROV_TERMS {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        if k % 2 == 1 {
            sum += term;
        } else {
            sum -= term;
        }
        if term < KOLMOGOROV_EPS {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// KS statistic D for an ascending sample against a continuous CDF.
pub fn ks_statistic<F>(sorted: &[f64], cdf: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = cdf(x);
            let lower = f - i as f64 / n;
            let upper = (i + 1) as f64 / n - f;
            lower.max(upper)
        })
        .fold(0.0, f64::max)
}

/// P-value of a one-sample KS statistic with a fully specified null.
///
/// Uses Stephens' finite-sample scaling of the Kolmogorov limit.
pub fn ks_p_value(d: f64, n: usize) -> f64 {
    if n == 0 || d.is_nan() {
        return f64::NAN;
    }
    let sqrt_n = (n as f64).sqrt();
    kolmogorov_sf((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
}

/// P-value of the Lilliefors statistic (KS against a normal with estimated
/// mean and variance).
///
/// Dallal-Wilkinson approximation, switching to Stephens' modified statistic
/// when the approximation leaves its accurate range (p > 0.1).
pub fn lilliefors_p_value(d: f64, n: usize) -> f64 {
    if n < 4 || d.is_nan() {
        return f64::NAN;
    }
    let nf = n as f64;
    let (kd, nd) = if n <= 100 {
        (d, nf)
    } else {
        (d * (nf / 100.0).powf(0.49), 100.0)
    };
    let p = (-7.01256 * kd * kd * (nd + 2.78019) + 2.99587 * kd * (nd + 2.78019).sqrt()
        - 0.122119
        + 0.974598 / nd.sqrt()
        + 1.67997 / nd)
        .exp();
    if p <= 0.1 {
        return p.clamp(0.0, 1.0);
    }

    let kk = (nf.sqrt() - 0.01 + 0.85 / nf.sqrt()) * d;
    let p = if kk <= 0.302 {
        1.0
    } else if kk <= 0.5 {
        2.76773 - 19.828315 * kk + 80.709644 * kk.powi(2) - 138.55152 * kk.powi(3)
            + 81.218052 * kk.powi(4)
    } else if kk <= 0.9 {
        -4.901232 + 40.662806 * kk - 97.490286 * kk.powi(2) + 94.029866 * kk.powi(3)
            - 32.355711 * kk.powi(4)
    } else if kk <= 1.31 {
        6.198765 - 19.558097 * kk + 23.186922 * kk.powi(2) - 12.234627 * kk.powi(3)
            + 2.423045 * kk.powi(4)
    } else {
        0.0
    };
    p.clamp(0.0, 1.0)
}

/// Anderson-Darling A^2 for an ascending sample against a continuous CDF.
///
/// CDF values are clamped away from 0 and 1 so extreme points contribute a
/// large but finite penalty.
pub fn anderson_darling_statistic<F>(sorted: &[f64], cdf: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let nf = n as f64;
    let f: Vec<f64> = sorted
        .iter()
        .map(|&x| cdf(x).clamp(1e-300, 1.0 - 1e-16))
        .collect();
    let s: f64 = (0..n)
        .map(|i| {
            let weight = (2 * i + 1) as f64;
            weight * (f[i].ln() + (1.0 - f[n - 1 - i]).ln())
        })
        .sum();
    -nf - s / nf
}

/// P-value of the normal-case Anderson-Darling statistic with estimated
/// parameters (D'Agostino and Stephens).
pub fn anderson_darling_normal_p_value(a2: f64, n: usize) -> f64 {
    if n == 0 || a2.is_nan() {
        return f64::NAN;
    }
    let nf = n as f64;
    let a = a2 * (1.0 + 0.75 / nf + 2.25 / (nf * nf));
    let p = if a >= 0.6 {
        (1.2937 - 5.709 * a + 0.0186 * a * a).exp()
    } else if a >= 0.34 {
        (0.9177 - 4.279 * a - 1.38 * a * a).exp()
    } else if a >= 0.2 {
        1.0 - (-8.318 + 42.796 * a - 59.938 * a * a).exp()
    } else {
        1.0 - (-13.436 + 101.14 * a - 223.73 * a * a).exp()
    };
    p.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kolmogorov_sf_known_values() {
        // P(K > 1.3581) ~ 0.05, P(K > 1.2239) ~ 0.10
        assert!((kolmogorov_sf(1.358_1) - 0.05).abs() < 1e-3);
        assert!((kolmogorov_sf(1.223_9) - 0.10).abs() < 1e-3);
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        assert!(kolmogorov_sf(5.0) < 1e-20);
    }

    #[test]
    fn kolmogorov_branches_agree_at_switch() {
        let below = kolmogorov_sf(1.179_999);
        let above = kolmogorov_sf(1.180_001);
        assert!((below - above).abs() < 1e-5);
    }

    #[test]
    fn ks_statistic_uniform_grid() {
        let data: Vec<f64> = (0..10).map(|i| (i as f64 + 0.5) / 10.0).collect();
        let d = ks_statistic(&data, |x| x.clamp(0.0, 1.0));
        assert!((d - 0.05).abs() < 1e-12);
    }

    #[test]
    fn lilliefors_small_statistic_is_not_significant() {
        let p = lilliefors_p_value(0.05, 50);
        assert!(p > 0.2, "p = {}", p);
    }

    #[test]
    fn lilliefors_large_statistic_is_significant() {
        let p = lilliefors_p_value(0.3, 50);
        assert!(p < 0.001, "p = {}", p);
    }

    #[test]
    fn anderson_darling_p_is_monotone() {
        let mut prev = 1.0;
        for a2 in [0.1, 0.25, 0.4, 0.7, 1.2, 3.0] {
            let p = anderson_darling_normal_p_value(a2, 100);
            assert!(p <= prev + 1e-12, "a2={a2} p={p} prev={prev}");
            prev = p;
        }
    }
}
