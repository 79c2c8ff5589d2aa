//! Configuration presets for common analysis scenarios.
//!
//! - Audit: strict thresholds for forensic review
//! - Exploratory: lenient thresholds for a first look
//! - QualityControl: ensemble outliers and Anderson-Darling for process data

use std::fmt;

use lk_common::{NormalityTest, OutlierMethod, RiskLevel, ThresholdProfile};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    /// High threshold profile, 99% confidence, only low risk passes
    Audit,
    /// Low threshold profile, 90% confidence
    Exploratory,
    /// Ensemble outlier detection and Anderson-Darling normality
    QualityControl,
}

impl PresetName {
    pub const ALL: &'static [PresetName] = &[
        PresetName::Audit,
        PresetName::Exploratory,
        PresetName::QualityControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Audit => "audit",
            PresetName::Exploratory => "exploratory",
            PresetName::QualityControl => "quality_control",
        }
    }

    /// Parse a preset name, accepting common aliases.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "audit" | "fraud" | "forensic" => Some(PresetName::Audit),
            "exploratory" | "explore" | "quick" => Some(PresetName::Exploratory),
            "quality_control" | "qc" | "quality" => Some(PresetName::QualityControl),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Audit => "Strict thresholds and 99% confidence for forensic review",
            PresetName::Exploratory => "Lenient thresholds and 90% confidence for a first look",
            PresetName::QualityControl => {
                "Ensemble outlier detection and Anderson-Darling normality for process data"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = lk_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| {
            lk_common::Error::config(
                "preset",
                format!(
                    "unknown preset '{}'. Available: {}",
                    s,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })
    }
}

/// Build the configuration for a preset, starting from defaults.
pub fn get_preset(name: PresetName) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    match name {
        PresetName::Audit => {
            config.threshold_profile = ThresholdProfile::High;
            config.confidence_level = 0.99;
            config.pass_threshold = RiskLevel::Low;
            config.recommend = true;
        }
        PresetName::Exploratory => {
            config.threshold_profile = ThresholdProfile::Low;
            config.confidence_level = 0.90;
            config.pass_threshold = RiskLevel::Medium;
        }
        PresetName::QualityControl => {
            config.threshold_profile = ThresholdProfile::Medium;
            config.outlier_method = OutlierMethod::Ensemble;
            config.normal.test_method = NormalityTest::Anderson;
        }
    }
    config
}
