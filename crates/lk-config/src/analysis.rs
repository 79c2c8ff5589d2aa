//! The analysis configuration value threaded through every analyzer call.

use std::path::Path;

use lk_common::{
    DigitTest, NormalityTest, OutlierMethod, PoissonTest, RiskLevel, SamplingMode,
    ThresholdProfile,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Environment variable names for scalar overrides.
pub const ENV_CONFIDENCE_LEVEL: &str = "LAWKIT_CONFIDENCE_LEVEL";
pub const ENV_THRESHOLD_PROFILE: &str = "LAWKIT_THRESHOLD_PROFILE";
pub const ENV_PASS_THRESHOLD: &str = "LAWKIT_PASS_THRESHOLD";
pub const ENV_SAMPLE_SIZE_CAP: &str = "LAWKIT_SAMPLE_SIZE_CAP";

/// Options shared by every analyzer plus one table per law.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Confidence level for intervals and critical values, in (0, 1).
    pub confidence_level: f64,
    pub threshold_profile: ThresholdProfile,
    /// Highest risk level at which `validate` still passes a law.
    pub pass_threshold: RiskLevel,
    /// Inclusive lower bound applied during extraction.
    pub min_value: Option<f64>,
    /// Inclusive upper bound applied during extraction.
    pub max_value: Option<f64>,
    /// Reduce larger datasets to this many values at construction.
    pub sample_size_cap: Option<usize>,
    pub sampling: SamplingMode,
    /// Seed for `sampling = "random"`.
    pub sampling_seed: u64,
    pub outlier_method: OutlierMethod,
    /// Attach a trust ranking to orchestrator results.
    pub recommend: bool,
    pub benford: BenfordOptions,
    pub pareto: ParetoOptions,
    pub zipf: ZipfOptions,
    pub normal: NormalOptions,
    pub poisson: PoissonOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            confidence_level: 0.95,
            threshold_profile: ThresholdProfile::Auto,
            pass_threshold: RiskLevel::Medium,
            min_value: None,
            max_value: None,
            sample_size_cap: None,
            sampling: SamplingMode::Stride,
            sampling_seed: 0,
            outlier_method: OutlierMethod::Zscore,
            recommend: false,
            benford: BenfordOptions::default(),
            pareto: ParetoOptions::default(),
            zipf: ZipfOptions::default(),
            normal: NormalOptions::default(),
            poisson: PoissonOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct BenfordOptions {
    pub test_method: DigitTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ParetoOptions {
    /// Value share the "vital few" must reach, in [0.5, 1).
    pub concentration_ratio: f64,
    /// Population percentiles for the breakdown, each in (0, 100].
    pub percentiles: Vec<f64>,
}

impl Default for ParetoOptions {
    fn default() -> Self {
        ParetoOptions {
            concentration_ratio: 0.8,
            percentiles: vec![70.0, 80.0, 90.0, 95.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ZipfOptions {
    /// Items with a frequency below this are dropped before fitting; 0 keeps all.
    pub min_count: f64,
    /// Fold case when tokenizing text.
    pub case_fold: bool,
}

impl Default for ZipfOptions {
    fn default() -> Self {
        ZipfOptions {
            min_count: 0.0,
            case_fold: true,
        }
    }
}

/// Lower and upper specification limits for process capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpecLimits {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct NormalOptions {
    pub test_method: NormalityTest,
    pub zscore_threshold: f64,
    pub modified_zscore_threshold: f64,
    pub iqr_multiplier: f64,
    pub lof_neighbors: usize,
    pub lof_threshold: f64,
    /// Enables time-series mode with this rolling window.
    pub timeseries_window: Option<usize>,
    /// Drift threshold in standard errors of the rolling mean.
    pub timeseries_threshold: f64,
    /// Enables quality-control mode.
    pub spec_limits: Option<SpecLimits>,
}

impl Default for NormalOptions {
    fn default() -> Self {
        NormalOptions {
            test_method: NormalityTest::Shapiro,
            zscore_threshold: 3.0,
            modified_zscore_threshold: 3.5,
            iqr_multiplier: 1.5,
            lof_neighbors: 5,
            lof_threshold: 1.5,
            timeseries_window: None,
            timeseries_threshold: 3.0,
            spec_limits: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PoissonOptions {
    pub test_method: PoissonTest,
    /// Upper end of the prediction table; defaults to max(observed max, 10).
    pub max_events: Option<u64>,
    pub rare_event_mode: bool,
    /// Monte Carlo draws for the rare-event test.
    pub simulations: usize,
    pub simulation_seed: u64,
}

impl Default for PoissonOptions {
    fn default() -> Self {
        PoissonOptions {
            test_method: PoissonTest::ChiSquare,
            max_events: None,
            rare_event_mode: false,
            simulations: 2000,
            simulation_seed: 0,
        }
    }
}

impl AnalysisConfig {
    /// Parse from a TOML document. Does not validate.
    pub fn from_toml_str(content: &str) -> ValidationResult<Self> {
        toml::from_str(content).map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {e}")))
    }

    /// Read and parse a TOML file. Does not validate.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> ValidationResult<String> {
        toml::to_string(self).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Apply `LAWKIT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> ValidationResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Present but unparseable values are errors, never ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ValidationResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CONFIDENCE_LEVEL) {
            self.confidence_level =
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::InvalidValue {
                        field: ENV_CONFIDENCE_LEVEL.to_string(),
                        message: format!("Expected a number, got '{raw}'"),
                    })?;
        }
        if let Some(raw) = lookup(ENV_THRESHOLD_PROFILE) {
            self.threshold_profile =
                raw.parse::<ThresholdProfile>()
                    .map_err(|e| ValidationError::InvalidValue {
                        field: ENV_THRESHOLD_PROFILE.to_string(),
                        message: e.to_string(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_PASS_THRESHOLD) {
            self.pass_threshold =
                raw.parse::<RiskLevel>()
                    .map_err(|e| ValidationError::InvalidValue {
                        field: ENV_PASS_THRESHOLD.to_string(),
                        message: e.to_string(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_SAMPLE_SIZE_CAP) {
            let cap = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ValidationError::InvalidValue {
                    field: ENV_SAMPLE_SIZE_CAP.to_string(),
                    message: format!("Expected a positive integer, got '{raw}'"),
                })?;
            self.sample_size_cap = Some(cap);
        }
        Ok(())
    }

    /// Semantic validation, converted to the crate-wide error type.
    pub fn validate(&self) -> lk_common::Result<()> {
        crate::validate::validate_config(self).map_err(Into::into)
    }

    /// JSON schema of the configuration document.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(AnalysisConfig)).unwrap_or_default()
    }
}
