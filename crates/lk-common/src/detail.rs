//! Law-specific payloads carried in `AnalyzerResult::detail`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::options::{DigitTest, NormalityTest, OutlierMethod, PoissonTest};

/// Law-specific distribution detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "law", rename_all = "lowercase")]
pub enum DistributionDetail {
    Benford(BenfordDetail),
    Pareto(ParetoDetail),
    Zipf(ZipfDetail),
    Normal(NormalDetail),
    Poisson(PoissonDetail),
}

// ---------------------------------------------------------------------------
// Benford
// ---------------------------------------------------------------------------

/// Conformity label derived from the Benford risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConformityVerdict {
    CloseConformity,
    AcceptableConformity,
    MarginalConformity,
    Nonconformity,
}

/// One digit bucket of the Benford histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DigitBucket {
    /// Digit (1-9 first, 0-9 second) or two-digit ending (0-99).
    pub digit: u8,
    pub observed_count: u64,
    pub observed: f64,
    pub expected: f64,
    /// Wilson interval around the observed proportion.
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BenfordDetail {
    pub test: DigitTest,
    pub buckets: Vec<DigitBucket>,
    pub mad: f64,
    pub verdict: ConformityVerdict,
    /// Values that carry no digit for this test (e.g. below 10 for `second`).
    pub ignored: usize,
}

// ---------------------------------------------------------------------------
// Pareto
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LorenzPoint {
    /// Cumulative population fraction, ascending by value.
    pub population: f64,
    /// Cumulative value fraction.
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PercentileShare {
    /// Population percentile, in (0, 100].
    pub percentile: f64,
    /// Share of total value held by the top `percentile`% of items.
    pub value_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParetoDetail {
    pub concentration_ratio: f64,
    /// Smallest leading fraction of items (descending) whose value share
    /// reaches `concentration_ratio`.
    pub pareto_ratio: f64,
    /// Share of value held by the top `1 - concentration_ratio` of items.
    pub top_share: f64,
    pub gini: f64,
    /// Gini implied by an exact Pareto law with this concentration ratio.
    pub reference_gini: f64,
    /// Maximum-likelihood Pareto shape.
    pub alpha: f64,
    /// Cumulative value share per item, items sorted descending.
    pub cumulative_share: Vec<f64>,
    pub lorenz: Vec<LorenzPoint>,
    pub percentiles: Vec<PercentileShare>,
    pub insights: Vec<String>,
}

// ---------------------------------------------------------------------------
// Zipf
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankEntry {
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub frequency: f64,
    /// Frequency predicted by the fitted law.
    pub expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ZipfDetail {
    pub exponent: f64,
    /// log10 of the fitted constant C.
    pub intercept: f64,
    pub r_squared: f64,
    /// |exponent - 1|
    pub exponent_deviation: f64,
    /// Shannon diversity of the frequency distribution, in nats.
    pub diversity: f64,
    pub ranks: Vec<RankEntry>,
    /// Items dropped by `min_count`.
    pub filtered_items: usize,
    pub filtered_occurrences: f64,
}

// ---------------------------------------------------------------------------
// Normal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutlierReport {
    pub method: OutlierMethod,
    pub threshold: f64,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityControl {
    pub lower_spec: f64,
    pub upper_spec: f64,
    pub cp: f64,
    pub cpk: f64,
    pub cpu: f64,
    pub cpl: f64,
    /// Observed fraction of values outside the spec limits.
    pub out_of_spec_rate: f64,
    /// Expected defects per million under the fitted normal.
    pub expected_ppm: f64,
    /// cpk >= 1
    pub capable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeSeriesReport {
    pub window: usize,
    pub threshold: f64,
    /// Rolling statistics, one per full window ending at index `window - 1 + i`.
    pub rolling_mean: Vec<f64>,
    pub rolling_std: Vec<f64>,
    /// Indices (into the original sequence) of window ends whose rolling mean
    /// drifted beyond the threshold.
    pub flagged: Vec<usize>,
    pub trend_slope: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalDetail {
    pub test: NormalityTest,
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub outliers: OutlierReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeriesReport>,
    /// Set when the normality test ran on a subsample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_subsample: Option<usize>,
}

// ---------------------------------------------------------------------------
// Poisson
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountBucket {
    pub low: u64,
    /// Inclusive upper bound; `None` for the open tail bucket.
    pub high: Option<u64>,
    pub observed: u64,
    pub expected: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventProbability {
    pub events: u64,
    pub probability: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoissonDetail {
    /// Test that actually produced the statistic, after any fallback.
    pub test: PoissonTest,
    pub lambda: f64,
    pub variance: f64,
    /// variance / mean
    pub dispersion_index: f64,
    pub rare_event_mode: bool,
    pub buckets: Vec<CountBucket>,
    pub predictions: Vec<EventProbability>,
    /// P(X >= 1)
    pub prob_at_least_one: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulations: Option<usize>,
}
