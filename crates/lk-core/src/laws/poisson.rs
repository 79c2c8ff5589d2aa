//! Poisson event-count analysis.
//!
//! λ is the sample mean. Risk grades the dispersion index var/λ against 1;
//! the goodness-of-fit test chosen in the configuration supplies the
//! p-value. Rare-event mode replaces the asymptotic test with a seeded
//! conditional Monte Carlo test that stays valid for tiny λ and samples.

use lk_common::detail::{CountBucket, EventProbability, PoissonDetail};
use lk_common::{
    AnalyzerResult, ConfidenceInterval, DistributionDetail, Error, LawKind, PoissonTest, Result,
};
use lk_config::{AnalysisConfig, MAX_EVENTS};
use lk_math::descriptive::{mean, variance};
use lk_math::{
    chi_square_cdf, chi_square_sf, ks_p_value, poisson_cdf, poisson_pmf, poisson_rate_interval,
    poisson_sf_inclusive,
};
use tracing::{debug, instrument, warn};

use super::risk::{self, Cutoffs};
use super::{ensure_finite, probability, require_sample};
use crate::dataset::Dataset;
use crate::generate::rng::LawRng;

const LAW: LawKind = LawKind::Poisson;

/// Bands for |var/λ - 1|.
pub const DISPERSION_CUTOFFS: Cutoffs = [0.1, 0.25, 0.5];

/// Minimum sample under rare-event mode.
pub const RARE_EVENT_MINIMUM: usize = 2;

/// Smallest expected count a chi-square bucket may hold after pooling.
pub const MIN_EXPECTED: f64 = 5.0;

/// Shortest default prediction table.
pub const DEFAULT_MAX_EVENTS: u64 = 10;

/// Largest single count accepted; bucket tables are dense up to the maximum.
pub const MAX_EVENT_COUNT: f64 = MAX_EVENTS as f64;

/// Upper bound on simulated event placements (events x simulations).
pub const SIMULATION_BUDGET: u128 = 50_000_000;

struct TestOutcome {
    test: PoissonTest,
    statistic: f64,
    p_value: f64,
    simulations: Option<usize>,
}

/// Observed and expected count buckets, pooled so every expected count
/// reaches [`MIN_EXPECTED`]. The last bucket is open-ended.
pub fn pooled_buckets(counts: &[u64], lambda: f64) -> Vec<CountBucket> {
    let n = counts.len() as f64;
    let max = counts.iter().copied().max().unwrap_or(0);
    let mut observed = vec![0u64; max as usize + 1];
    for &c in counts {
        observed[c as usize] += 1;
    }

    let raw = (0..=max)
        .map(|k| (k, observed[k as usize], n * poisson_pmf(k, lambda)))
        .chain(std::iter::once((max + 1, 0, n * poisson_sf_inclusive(max + 1, lambda))));

    let mut buckets: Vec<CountBucket> = Vec::new();
    let mut open: Option<CountBucket> = None;
    for (k, obs, exp) in raw {
        let bucket = open.get_or_insert(CountBucket {
            low: k,
            high: Some(k),
            observed: 0,
            expected: 0.0,
        });
        bucket.high = Some(k);
        bucket.observed += obs;
        bucket.expected += exp;
        if bucket.expected >= MIN_EXPECTED {
            buckets.extend(open.take());
        }
    }
    if let Some(rest) = open {
        match buckets.last_mut() {
            Some(last) => {
                last.high = rest.high;
                last.observed += rest.observed;
                last.expected += rest.expected;
            }
            None => buckets.push(rest),
        }
    }
    if let Some(last) = buckets.last_mut() {
        last.high = None;
    }
    buckets
}

/// Index-of-dispersion statistic Σ(x - x̄)² / x̄.
fn dispersion_statistic(counts: &[u64], lambda: f64) -> f64 {
    counts
        .iter()
        .map(|&c| (c as f64 - lambda).powi(2))
        .sum::<f64>()
        / lambda
}

fn variance_test(counts: &[u64], lambda: f64) -> TestOutcome {
    let statistic = dispersion_statistic(counts, lambda);
    let df = (counts.len() - 1) as f64;
    let p = 2.0 * chi_square_cdf(statistic, df).min(chi_square_sf(statistic, df));
    TestOutcome {
        test: PoissonTest::Variance,
        statistic,
        p_value: p,
        simulations: None,
    }
}

fn ks_test(counts: &[u64], lambda: f64) -> TestOutcome {
    let n = counts.len();
    let max = counts.iter().copied().max().unwrap_or(0);
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let mut below = 0usize;
    let mut d = 0.0f64;
    for k in 0..=max {
        while below < n && sorted[below] <= k {
            below += 1;
        }
        d = d.max((below as f64 / n as f64 - poisson_cdf(k, lambda)).abs());
    }
    TestOutcome {
        test: PoissonTest::Ks,
        statistic: d,
        p_value: ks_p_value(d, n),
        simulations: None,
    }
}

fn chi_square_test(buckets: &[CountBucket], counts: &[u64]) -> Option<TestOutcome> {
    if buckets.len() < 3 {
        return None;
    }
    let statistic: f64 = buckets
        .iter()
        .map(|b| (b.observed as f64 - b.expected).powi(2) / b.expected)
        .sum();
    let df = (buckets.len() - 2) as f64;
    debug!(buckets = buckets.len(), n = counts.len(), "chi-square pooled");
    Some(TestOutcome {
        test: PoissonTest::ChiSquare,
        statistic,
        p_value: chi_square_sf(statistic, df),
        simulations: None,
    })
}

/// Conditional Monte Carlo dispersion test.
///
/// Given the observed total, Poisson counts are a uniform multinomial over
/// the observations; the two-sided p-value compares the observed dispersion
/// statistic with `simulations` seeded reallocations.
fn rare_event_test(counts: &[u64], lambda: f64, simulations: usize, seed: u64) -> TestOutcome {
    let n = counts.len();
    let total: u64 = counts.iter().sum();
    let observed = dispersion_statistic(counts, lambda);
    let mut rng = LawRng::from_seed_u64(seed);
    let mut cells = vec![0u64; n];
    let (mut at_least, mut at_most) = (0usize, 0usize);
    for _ in 0..simulations {
        cells.fill(0);
        for _ in 0..total {
            cells[rng.below(n as u64) as usize] += 1;
        }
        let simulated = dispersion_statistic(&cells, lambda);
        // Relative tolerance so ties from identical allocations count both ways.
        let tol = 1e-9 * observed.abs().max(1.0);
        if simulated >= observed - tol {
            at_least += 1;
        }
        if simulated <= observed + tol {
            at_most += 1;
        }
    }
    let s = simulations as f64;
    let upper = (at_least as f64 + 1.0) / (s + 1.0);
    let lower = (at_most as f64 + 1.0) / (s + 1.0);
    TestOutcome {
        test: PoissonTest::Variance,
        statistic: observed,
        p_value: 2.0 * upper.min(lower),
        simulations: Some(simulations),
    }
}

/// Probability table for 0..=max_events.
pub fn predictions(lambda: f64, max_events: u64) -> Vec<EventProbability> {
    (0..=max_events)
        .map(|k| EventProbability {
            events: k,
            probability: poisson_pmf(k, lambda),
            cumulative: poisson_cdf(k, lambda),
        })
        .collect()
}

fn as_counts(values: &[f64]) -> Result<Vec<u64>> {
    values
        .iter()
        .map(|&v| {
            if v < 0.0 || v.fract() != 0.0 || v > MAX_EVENT_COUNT {
                Err(Error::invalid_value(
                    LAW,
                    format!(
                        "event counts must be non-negative integers up to {MAX_EVENT_COUNT}, got {v}"
                    ),
                ))
            } else {
                Ok(v as u64)
            }
        })
        .collect()
}

#[instrument(level = "debug", skip_all, fields(law = "poisson", n = dataset.len()))]
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    let options = &config.poisson;
    let minimum = super::minimum_sample(LAW, config);
    let counts = as_counts(dataset.values())?;
    let n = counts.len();
    require_sample(LAW, n, minimum)?;

    let total: u64 = counts.iter().sum();
    let lambda = mean(dataset.values()).unwrap_or(0.0);
    let var = variance(dataset.values()).unwrap_or(0.0);
    let mut warnings = Vec::new();

    let (dispersion_index, buckets, outcome) = if total == 0 {
        // No events at all is exactly what Poisson(0) produces.
        let bucket = CountBucket {
            low: 0,
            high: None,
            observed: n as u64,
            expected: n as f64,
        };
        let outcome = TestOutcome {
            test: options.test_method,
            statistic: 0.0,
            p_value: 1.0,
            simulations: None,
        };
        (1.0, vec![bucket], outcome)
    } else {
        let index = ensure_finite(LAW, "dispersion index", var / lambda)?;
        let buckets = pooled_buckets(&counts, lambda);
        let outcome = if options.rare_event_mode {
            if (total as u128) * (options.simulations as u128) > SIMULATION_BUDGET {
                warn!(total, "too many events to simulate; using the asymptotic dispersion test");
                warnings.push(format!(
                    "{total} events exceed the simulation budget; asymptotic dispersion test used"
                ));
                variance_test(&counts, lambda)
            } else {
                rare_event_test(&counts, lambda, options.simulations, options.simulation_seed)
            }
        } else {
            match options.test_method {
                PoissonTest::ChiSquare => chi_square_test(&buckets, &counts)
                    .unwrap_or_else(|| {
                        warnings.push(format!(
                            "only {} buckets after pooling; dispersion test used instead of chi-square",
                            buckets.len()
                        ));
                        variance_test(&counts, lambda)
                    }),
                PoissonTest::Ks => ks_test(&counts, lambda),
                PoissonTest::Variance => variance_test(&counts, lambda),
            }
        };
        (index, buckets, outcome)
    };
    let statistic = ensure_finite(LAW, "test statistic", outcome.statistic)?;
    let p_value = probability(LAW, outcome.p_value)?;
    let effect = (dispersion_index - 1.0).abs();

    let observed_max = counts.iter().copied().max().unwrap_or(0);
    let max_events = options
        .max_events
        .unwrap_or_else(|| observed_max.max(DEFAULT_MAX_EVENTS));
    let (lower, upper) = poisson_rate_interval(total, n as f64, config.confidence_level);

    let risk_level = risk::assess(
        effect,
        &DISPERSION_CUTOFFS,
        config.threshold_profile,
        config.confidence_level,
        n,
    );
    debug!(lambda, dispersion_index, statistic, p_value, risk = %risk_level, "poisson computed");

    if !options.rare_event_mode && lambda > 0.0 && lambda < 1.0 {
        warnings.push(format!(
            "λ = {lambda:.3} is small; rare_event_mode gives a more reliable test"
        ));
    }

    Ok(AnalyzerResult {
        law: LAW,
        sample_count: n,
        minimum_sample: minimum,
        test_statistic: statistic,
        p_value,
        effect_size: effect,
        confidence_interval: ConfidenceInterval {
            parameter: "lambda".to_string(),
            estimate: lambda,
            lower,
            upper,
            level: config.confidence_level,
        },
        risk_level,
        detail: DistributionDetail::Poisson(PoissonDetail {
            test: outcome.test,
            lambda,
            variance: var,
            dispersion_index,
            rare_event_mode: options.rare_event_mode,
            buckets,
            predictions: predictions(lambda, max_events),
            prob_at_least_one: 1.0 - (-lambda).exp(),
            simulations: outcome.simulations,
        }),
        warnings,
    })
}
