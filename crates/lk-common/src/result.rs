//! Result records produced by analyzers and the orchestrator.
//!
//! These are plain value records. Rendering them (JSON, CSV, text) belongs to
//! the caller; the serde and schemars derives describe field names and types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detail::DistributionDetail;
use crate::law::LawKind;
use crate::risk::RiskLevel;

/// Interval around a named estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfidenceInterval {
    /// Which estimate is bounded (e.g. `mad`, `gini`, `exponent`, `mean`, `lambda`).
    pub parameter: String,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

/// Common envelope, one per executed law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzerResult {
    pub law: LawKind,
    pub sample_count: usize,
    pub minimum_sample: usize,
    pub test_statistic: f64,
    /// Always in [0, 1].
    pub p_value: f64,
    pub effect_size: f64,
    pub confidence_interval: ConfidenceInterval,
    pub risk_level: RiskLevel,
    pub detail: DistributionDetail,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalyzerResult {
    pub fn law_name(&self) -> &'static str {
        self.law.name()
    }
}

/// Where the analyzed values came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatasetSummary {
    pub sample_count: usize,
    pub source_size: usize,
    pub total_extracted: usize,
    pub total_rejected: usize,
    /// Original length when `sample_size_cap` reduced the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_from: Option<usize>,
}

/// A law that was skipped (data error) or failed (computation error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LawIssue {
    pub law: LawKind,
    pub code: u32,
    pub message: String,
}

/// Orchestrator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompositeResult {
    /// Correlates this call's log events.
    pub run_id: String,
    /// SHA-256 of the canonical configuration.
    pub config_fingerprint: String,
    pub dataset: DatasetSummary,
    /// Executed laws, in requested order.
    pub results: Vec<AnalyzerResult>,
    pub laws_executed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<LawIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<LawIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Conflict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl CompositeResult {
    /// Result for one law, if it executed.
    pub fn get(&self, law: LawKind) -> Option<&AnalyzerResult> {
        self.results.iter().find(|r| r.law == law)
    }

    /// Highest risk among executed laws.
    pub fn max_risk(&self) -> Option<RiskLevel> {
        self.results.iter().map(|r| r.risk_level).max()
    }
}

/// One entry of the trust ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedLaw {
    pub law: LawKind,
    pub sample_count: usize,
    pub minimum_sample: usize,
    /// sample_count / minimum_sample
    pub headroom: f64,
    pub risk_level: RiskLevel,
}

/// Which law's verdict to trust most, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub ranked: Vec<RankedLaw>,
    pub rationale: String,
}

impl Recommendation {
    pub fn primary(&self) -> Option<LawKind> {
        self.ranked.first().map(|r| r.law)
    }
}

/// Per-law pass/fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LawVerdict {
    pub law: LawKind,
    pub risk_level: RiskLevel,
    pub pass_threshold: RiskLevel,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub composite: CompositeResult,
    pub verdicts: Vec<LawVerdict>,
    /// True iff every executed law passed.
    pub is_valid: bool,
    /// Mean of the executed laws' risk quality scores, in [0, 1].
    pub quality_score: f64,
}

/// Nature of a disagreement between two laws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Continuous vs. count-model disagreement (normal vs. poisson).
    DistributionMismatch,
    /// Benford's data-quality reading disagrees with another law.
    QualityDisagreement,
    /// Concentration laws disagree (pareto vs. zipf).
    ScaleIncompatibility,
    Methodological,
}

/// Two laws whose risk levels are more than one step apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub laws: [LawKind; 2],
    pub risk_levels: [RiskLevel; 2],
    pub step_gap: u8,
    pub effect_sizes: [f64; 2],
    pub description: String,
    pub likely_cause: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Non-negative integers.
    Integer,
    /// Integers including negatives.
    Discrete,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScaleRange {
    /// max/min below 100
    Narrow,
    /// max/min below 10^4
    Medium,
    Wide,
    /// Non-positive values present.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SampleSizeCategory {
    /// < 30
    Small,
    /// 30-299
    Medium,
    /// 300-2999
    Large,
    VeryLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutlierLevel {
    None,
    Low,
    Moderate,
    High,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataCharacteristics {
    pub data_type: DataType,
    pub scale_range: ScaleRange,
    pub sample_size: SampleSizeCategory,
    pub outlier_level: OutlierLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverallAssessment {
    Excellent,
    Good,
    Mixed,
    Concerning,
    Problematic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticReport {
    /// Includes the detected conflicts.
    pub composite: CompositeResult,
    /// 1 minus the variance of the laws' risk quality scores.
    pub consistency_score: f64,
    pub characteristics: DataCharacteristics,
    pub overall_assessment: OverallAssessment,
    /// States that conflict detection is a heuristic, not a statistical test.
    pub method_note: String,
}
