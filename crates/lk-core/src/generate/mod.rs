//! Seeded sample generation for each law.
//!
//! The same law, options and seed always yield the same dataset. When no
//! seed is given one is drawn from entropy and reported back so the run can
//! be replayed.

pub mod rng;
pub mod samplers;

use lk_common::{Error, LawKind, Result};
use lk_config::MAX_EVENTS;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::laws::pareto::reference_gini;
use rng::LawRng;

/// Widest Zipf rank range; the sampler keeps one cumulative weight per rank.
pub const MAX_ZIPF_RANKS: u64 = 10_000_000;

/// Distribution parameters; each law reads only its own fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateParams {
    /// Pareto: share of value held by the top (1 - ratio) of items.
    pub concentration_ratio: f64,
    /// Zipf exponent s.
    pub exponent: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub lambda: f64,
}

impl Default for GenerateParams {
    fn default() -> Self {
        GenerateParams {
            concentration_ratio: 0.8,
            exponent: 1.0,
            mean: 100.0,
            std_dev: 15.0,
            lambda: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub sample_count: usize,
    /// Drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Inclusive bounds on generated magnitude (ranks for Zipf).
    pub range: Option<(f64, f64)>,
    /// Benford only: fraction of samples replaced by uniform-digit values.
    pub fraud_rate: f64,
    pub params: GenerateParams,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            sample_count: 1000,
            seed: None,
            range: None,
            fraud_rate: 0.0,
            params: GenerateParams::default(),
        }
    }
}

impl GenerateOptions {
    pub fn new(sample_count: usize) -> Self {
        GenerateOptions {
            sample_count,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        self.range = Some((lo, hi));
        self
    }

    pub fn with_fraud_rate(mut self, rate: f64) -> Self {
        self.fraud_rate = rate;
        self
    }

    pub fn with_params(mut self, params: GenerateParams) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDataset {
    pub dataset: Dataset,
    pub law: LawKind,
    /// Seed actually used.
    pub seed: u64,
    /// Ascending positions replaced by fraud values.
    pub fraud_indices: Vec<usize>,
}

fn default_range(law: LawKind, params: &GenerateParams) -> (f64, f64) {
    match law {
        LawKind::Benford => (1.0, 1e6),
        LawKind::Pareto => (1.0, 1e4),
        LawKind::Zipf => (1.0, 100.0),
        LawKind::Normal => (f64::NEG_INFINITY, f64::INFINITY),
        LawKind::Poisson => (0.0, (params.lambda * 10.0 + 20.0).ceil()),
    }
}

fn check(ok: bool, field: &str, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::config(field, message()))
    }
}

fn validate(law: LawKind, options: &GenerateOptions) -> Result<(f64, f64)> {
    let p = &options.params;
    check(options.sample_count > 0, "generate.sample_count", || {
        "must be at least 1".to_string()
    })?;
    check(
        (0.0..=1.0).contains(&options.fraud_rate),
        "generate.fraud_rate",
        || format!("{} is outside [0, 1]", options.fraud_rate),
    )?;
    check(
        options.fraud_rate == 0.0 || law == LawKind::Benford,
        "generate.fraud_rate",
        || format!("fraud injection is only defined for benford, not {law}"),
    )?;

    let explicit = options.range.is_some();
    let (lo, hi) = options.range.unwrap_or_else(|| default_range(law, p));
    if explicit {
        check(lo.is_finite() && hi.is_finite(), "generate.range", || {
            format!("bounds must be finite, got ({lo}, {hi})")
        })?;
    }
    check(lo < hi, "generate.range", || format!("lower bound {lo} must be below upper bound {hi}"))?;

    match law {
        LawKind::Benford | LawKind::Pareto => {
            check(lo > 0.0, "generate.range", || {
                format!("{law} needs a positive lower bound, got {lo}")
            })?;
        }
        LawKind::Zipf | LawKind::Poisson => {
            let min = if law == LawKind::Zipf { 1.0 } else { 0.0 };
            check(lo >= min && lo.fract() == 0.0 && hi.fract() == 0.0, "generate.range", || {
                format!("{law} needs integer bounds starting at {min} or above, got ({lo}, {hi})")
            })?;
            if law == LawKind::Zipf {
                check(hi - lo < MAX_ZIPF_RANKS as f64, "generate.range", || {
                    format!("zipf spans at most {MAX_ZIPF_RANKS} ranks, got ({lo}, {hi})")
                })?;
            } else {
                check(hi <= MAX_EVENTS as f64, "generate.range", || {
                    format!("poisson counts stop at {MAX_EVENTS}, got upper bound {hi}")
                })?;
            }
        }
        LawKind::Normal => {}
    }

    match law {
        LawKind::Pareto => check(
            p.concentration_ratio > 0.5 && p.concentration_ratio < 1.0,
            "generate.params.concentration_ratio",
            || format!("{} is outside (0.5, 1)", p.concentration_ratio),
        )?,
        LawKind::Zipf => check(
            p.exponent.is_finite() && p.exponent > 0.0,
            "generate.params.exponent",
            || format!("{} must be positive", p.exponent),
        )?,
        LawKind::Normal => {
            check(p.mean.is_finite(), "generate.params.mean", || {
                format!("{} is not finite", p.mean)
            })?;
            check(
                p.std_dev.is_finite() && p.std_dev > 0.0,
                "generate.params.std_dev",
                || format!("{} must be positive", p.std_dev),
            )?;
        }
        LawKind::Poisson => check(
            p.lambda.is_finite() && p.lambda >= 0.0,
            "generate.params.lambda",
            || format!("{} must be non-negative", p.lambda),
        )?,
        LawKind::Benford => {}
    }
    Ok((lo, hi))
}

/// Pareto shape whose top (1 - r) share is r.
fn pareto_alpha(concentration_ratio: f64) -> f64 {
    let r = concentration_ratio;
    1.0 / (1.0 - r.ln() / (1.0 - r).ln())
}

/// Draw a dataset following `law`.
#[instrument(skip(options), fields(n = options.sample_count))]
pub fn generate(law: LawKind, options: &GenerateOptions) -> Result<GeneratedDataset> {
    let (lo, hi) = validate(law, options)?;
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = LawRng::from_seed_u64(seed);
    let n = options.sample_count;
    let p = &options.params;

    let mut fraud_indices = Vec::new();
    let dataset = match law {
        LawKind::Benford => {
            let mut values: Vec<f64> = (0..n).map(|_| samplers::log_uniform(&mut rng, lo, hi)).collect();
            let k = (options.fraud_rate * n as f64).round() as usize;
            if k > 0 {
                // Partial Fisher-Yates picks k distinct positions.
                let mut positions: Vec<usize> = (0..n).collect();
                for i in 0..k {
                    let j = i + rng.below((n - i) as u64) as usize;
                    positions.swap(i, j);
                }
                fraud_indices = positions[..k].to_vec();
                fraud_indices.sort_unstable();
                for &i in &fraud_indices {
                    values[i] = samplers::uniform_first_digit(&mut rng, values[i], lo, hi);
                }
            }
            Dataset::from_values(values)
        }
        LawKind::Pareto => {
            let alpha = pareto_alpha(p.concentration_ratio);
            debug!(alpha, reference_gini = reference_gini(p.concentration_ratio), "pareto shape");
            Dataset::from_values((0..n).map(|_| samplers::bounded_pareto(&mut rng, lo, hi, alpha)))
        }
        LawKind::Zipf => {
            let (first, last) = (lo as u64, hi as u64);
            let table = samplers::zipf_table(first, last, p.exponent);
            let mut counts = vec![0u64; table.len()];
            for _ in 0..n {
                counts[samplers::zipf_index(&mut rng, &table)] += 1;
            }
            Dataset::from_frequencies(
                counts
                    .into_iter()
                    .enumerate()
                    .filter(|(_, c)| *c > 0)
                    .map(|(i, c)| (format!("rank-{}", first + i as u64), c)),
            )
        }
        LawKind::Normal => Dataset::from_values(
            (0..n).map(|_| samplers::truncated_normal(&mut rng, p.mean, p.std_dev, lo, hi)),
        ),
        LawKind::Poisson => {
            let (first, last) = (lo as u64, hi as u64);
            Dataset::from_values(
                (0..n).map(|_| samplers::poisson(&mut rng, p.lambda, first, last) as f64),
            )
        }
    };
    debug!(seed, law = %law, fraud = fraud_indices.len(), "dataset generated");

    Ok(GeneratedDataset {
        dataset,
        law,
        seed,
        fraud_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        for law in LawKind::ALL {
            let options = GenerateOptions::new(500).with_seed(42);
            let a = generate(law, &options).unwrap();
            let b = generate(law, &options).unwrap();
            assert_eq!(a.dataset.values(), b.dataset.values(), "{law}");
            assert_eq!(a.seed, 42);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(LawKind::Benford, &GenerateOptions::new(100).with_seed(1)).unwrap();
        let b = generate(LawKind::Benford, &GenerateOptions::new(100).with_seed(2)).unwrap();
        assert_ne!(a.dataset.values(), b.dataset.values());
    }

    #[test]
    fn entropy_seed_is_reported_and_replayable() {
        let first = generate(LawKind::Normal, &GenerateOptions::new(50)).unwrap();
        let replay = generate(LawKind::Normal, &GenerateOptions::new(50).with_seed(first.seed)).unwrap();
        assert_eq!(first.dataset.values(), replay.dataset.values());
    }

    #[test]
    fn fraud_rate_replaces_the_requested_share() {
        let options = GenerateOptions::new(1000).with_seed(9).with_fraud_rate(0.25);
        let out = generate(LawKind::Benford, &options).unwrap();
        assert_eq!(out.fraud_indices.len(), 250);
        assert!(out.fraud_indices.windows(2).all(|w| w[0] < w[1]));
        assert!(out.dataset.values().iter().all(|v| (1.0..=1e6).contains(v)));
    }

    #[test]
    fn fraud_rate_outside_benford_is_rejected() {
        let err = generate(LawKind::Normal, &GenerateOptions::new(10).with_fraud_rate(0.1)).unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("generate.fraud_rate"));
    }

    #[test]
    fn bad_ranges_are_config_errors() {
        let cases = [
            (LawKind::Benford, GenerateOptions::new(10).with_range(0.0, 100.0)),
            (LawKind::Pareto, GenerateOptions::new(10).with_range(50.0, 5.0)),
            (LawKind::Zipf, GenerateOptions::new(10).with_range(1.5, 10.0)),
            (LawKind::Normal, GenerateOptions::new(10).with_range(f64::NAN, 1.0)),
        ];
        for (law, options) in cases {
            let err = generate(law, &options).unwrap_err();
            assert_eq!(err.code(), 20, "{law}");
        }
    }

    #[test]
    fn oversized_integer_ranges_are_rejected_before_sampling() {
        let err = generate(LawKind::Zipf, &GenerateOptions::new(10).with_range(1.0, 1e12)).unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("generate.range"));

        let widest = GenerateOptions::new(10).with_range(1.0, MAX_ZIPF_RANKS as f64);
        assert!(validate(LawKind::Zipf, &widest).is_ok());
        let too_wide = GenerateOptions::new(10).with_range(1.0, MAX_ZIPF_RANKS as f64 + 1.0);
        assert!(validate(LawKind::Zipf, &too_wide).is_err());

        let err = generate(LawKind::Poisson, &GenerateOptions::new(10).with_range(0.0, 1e12)).unwrap_err();
        assert!(err.to_string().contains("generate.range"));

        // A huge lambda pushes the default range past the count limit too.
        let params = GenerateParams {
            lambda: 1e9,
            ..GenerateParams::default()
        };
        let err = generate(LawKind::Poisson, &GenerateOptions::new(10).with_params(params)).unwrap_err();
        assert_eq!(err.code(), 20);
    }

    #[test]
    fn generated_values_respect_ranges() {
        let normal = generate(LawKind::Normal, &GenerateOptions::new(500).with_seed(3).with_range(90.0, 110.0)).unwrap();
        assert!(normal.dataset.values().iter().all(|v| (90.0..=110.0).contains(v)));

        let poisson = generate(LawKind::Poisson, &GenerateOptions::new(500).with_seed(3).with_range(1.0, 4.0)).unwrap();
        assert!(poisson.dataset.values().iter().all(|v| (1.0..=4.0).contains(v)));

        let zipf = generate(LawKind::Zipf, &GenerateOptions::new(2000).with_seed(3).with_range(1.0, 20.0)).unwrap();
        assert!(zipf.dataset.is_frequency_table());
        assert!(zipf.dataset.len() <= 20);
        assert_eq!(zipf.dataset.values().iter().sum::<f64>(), 2000.0);
    }

    #[test]
    fn pareto_shape_matches_the_eighty_twenty_rule() {
        assert!((pareto_alpha(0.8) - 1.161).abs() < 1e-3);
    }
}
