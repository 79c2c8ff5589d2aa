//! Risk levels and the threshold profiles that map effect sizes onto them.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Ordinal severity attached to every analyzer result.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Position on the ordinal scale, 0 (low) to 3 (critical).
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        }
    }

    /// Number of steps separating two levels.
    pub fn steps_between(self, other: RiskLevel) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }

    /// Linear quality score in [0, 1]: 1 for low, 0 for critical.
    pub fn quality_score(self) -> f64 {
        1.0 - f64::from(self.ordinal()) / 3.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        RiskLevel::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| Error::Config {
                field: "risk_level".to_string(),
                message: format!(
                    "unknown risk level '{}'; expected low, medium, high or critical",
                    s.trim()
                ),
            })
    }
}

/// How aggressively deviation maps to a risk label.
///
/// `Low` tolerates more deviation before escalating, `Critical` the least.
/// `Auto` widens the cutoffs for small samples, where sampling noise alone
/// produces sizeable deviations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdProfile {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Auto,
}

impl ThresholdProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdProfile::Low => "low",
            ThresholdProfile::Medium => "medium",
            ThresholdProfile::High => "high",
            ThresholdProfile::Critical => "critical",
            ThresholdProfile::Auto => "auto",
        }
    }
}

impl fmt::Display for ThresholdProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ThresholdProfile::Low),
            "medium" => Ok(ThresholdProfile::Medium),
            "high" => Ok(ThresholdProfile::High),
            "critical" => Ok(ThresholdProfile::Critical),
            "auto" => Ok(ThresholdProfile::Auto),
            other => Err(Error::Config {
                field: "threshold_profile".to_string(),
                message: format!(
                    "unknown threshold profile '{other}'; expected low, medium, high, critical or auto"
                ),
            }),
        }
    }
}
