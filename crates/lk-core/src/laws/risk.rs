//! Mapping effect sizes onto risk levels.
//!
//! Every law publishes three ascending effect-size cutoffs separating
//! low/medium/high/critical. The threshold profile and confidence level
//! stretch or shrink those cutoffs; p-values play no part.

use lk_common::{RiskLevel, ThresholdProfile};
use lk_math::z_for_confidence;

/// Samples at or above this size use unscaled cutoffs under `auto`.
pub const AUTO_REFERENCE_SAMPLE: usize = 300;
/// Largest widening `auto` applies to tiny samples.
pub const AUTO_MAX_SCALE: f64 = 3.0;

/// Ascending effect-size boundaries: low|medium, medium|high, high|critical.
pub type Cutoffs = [f64; 3];

/// Multiplier applied to a law's cutoffs.
///
/// Greater than 1 means more tolerant. Monotone in the confidence level.
pub fn cutoff_scale(profile: ThresholdProfile, confidence_level: f64, sample_count: usize) -> f64 {
    let profile_factor = match profile {
        ThresholdProfile::Low => 1.5,
        ThresholdProfile::Medium => 1.0,
        ThresholdProfile::High => 0.75,
        ThresholdProfile::Critical => 0.5,
        ThresholdProfile::Auto => {
            if sample_count >= AUTO_REFERENCE_SAMPLE || sample_count == 0 {
                1.0
            } else {
                (AUTO_REFERENCE_SAMPLE as f64 / sample_count as f64)
                    .sqrt()
                    .min(AUTO_MAX_SCALE)
            }
        }
    };
    let confidence_factor = z_for_confidence(confidence_level) / z_for_confidence(0.95);
    profile_factor * confidence_factor
}

/// Classify an effect size against scaled cutoffs.
pub fn classify(effect: f64, cutoffs: &Cutoffs, scale: f64) -> RiskLevel {
    if !effect.is_finite() {
        return RiskLevel::Critical;
    }
    let e = effect.abs();
    if e <= cutoffs[0] * scale {
        RiskLevel::Low
    } else if e <= cutoffs[1] * scale {
        RiskLevel::Medium
    } else if e <= cutoffs[2] * scale {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Classify with the scale derived from the configuration.
pub fn assess(
    effect: f64,
    cutoffs: &Cutoffs,
    profile: ThresholdProfile,
    confidence_level: f64,
    sample_count: usize,
) -> RiskLevel {
    classify(effect, cutoffs, cutoff_scale(profile, confidence_level, sample_count))
}
