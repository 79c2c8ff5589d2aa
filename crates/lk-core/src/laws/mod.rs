//! The five law analyzers.
//!
//! Each analyzer is a pure function of an immutable [`Dataset`] and an
//! [`AnalysisConfig`]. Dispatch by law is a closed match over [`LawKind`].

pub mod benford;
pub mod normal;
pub mod pareto;
pub mod poisson;
pub mod risk;
pub mod zipf;

use lk_common::{AnalyzerResult, Error, LawKind, Result};
use lk_config::AnalysisConfig;

use crate::dataset::Dataset;

/// Benford reliability note threshold.
pub const SMALL_SAMPLE_WARNING: usize = 30;

/// Run one law against a dataset.
///
/// The configuration is validated first; an invalid one is a config error
/// whatever the data.
pub fn analyze_law(law: LawKind, dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    config.validate()?;
    dispatch(law, dataset, config)
}

/// [`analyze_law`] for a configuration the caller already validated.
pub(crate) fn dispatch(law: LawKind, dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalyzerResult> {
    if dataset.is_empty() {
        return Err(Error::empty(Some(law)));
    }
    match law {
        LawKind::Benford => benford::analyze(dataset, config),
        LawKind::Pareto => pareto::analyze(dataset, config),
        LawKind::Zipf => zipf::analyze(dataset, config),
        LawKind::Normal => normal::analyze(dataset, config),
        LawKind::Poisson => poisson::analyze(dataset, config),
    }
}

/// Minimum sample a law needs under this configuration.
pub fn minimum_sample(law: LawKind, config: &AnalysisConfig) -> usize {
    match law {
        LawKind::Poisson if config.poisson.rare_event_mode => poisson::RARE_EVENT_MINIMUM,
        _ => law.default_minimum_sample(),
    }
}

pub(crate) fn require_sample(law: LawKind, actual: usize, minimum: usize) -> Result<()> {
    if actual < minimum {
        return Err(Error::insufficient_sample(law, actual, minimum));
    }
    Ok(())
}

/// Reject NaN and infinities before they reach a result field.
pub(crate) fn ensure_finite(law: LawKind, what: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::computation(law, format!("{what} is not finite ({value})")))
    }
}

/// A p-value clamped to [0, 1]; an undefined one is a computation error.
pub(crate) fn probability(law: LawKind, p: f64) -> Result<f64> {
    ensure_finite(law, "p-value", p).map(|p| p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_is_a_data_error() {
        let ds = Dataset::from_values(Vec::<f64>::new());
        for law in LawKind::ALL {
            let err = analyze_law(law, &ds, &AnalysisConfig::default()).unwrap_err();
            assert_eq!(err.code(), 10);
            assert_eq!(err.law(), Some(law));
        }
    }

    #[test]
    fn oversized_prediction_table_is_rejected_up_front() {
        let mut config = AnalysisConfig::default();
        config.poisson.max_events = Some(u64::MAX);
        let ds = Dataset::from_values([1.0, 2.0, 0.0, 1.0, 3.0]);
        let err = analyze_law(LawKind::Poisson, &ds, &config).unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("poisson.max_events"));
    }

    #[test]
    fn rare_event_mode_lowers_poisson_minimum() {
        let mut config = AnalysisConfig::default();
        assert_eq!(minimum_sample(LawKind::Poisson, &config), 5);
        config.poisson.rare_event_mode = true;
        assert_eq!(minimum_sample(LawKind::Poisson, &config), 2);
        assert_eq!(minimum_sample(LawKind::Benford, &config), 5);
    }

    #[test]
    fn undefined_p_value_is_an_error_not_a_pass() {
        let err = probability(LawKind::Normal, f64::NAN).unwrap_err();
        assert_eq!(err.code(), 30);
        assert_eq!(probability(LawKind::Zipf, 1.0 + 1e-12).unwrap(), 1.0);
        assert_eq!(probability(LawKind::Zipf, -0.0).unwrap(), 0.0);
    }

    #[test]
    fn non_finite_statistics_become_computation_errors() {
        let err = ensure_finite(LawKind::Normal, "skewness", f64::NAN).unwrap_err();
        assert_eq!(err.code(), 30);
        assert!(err.to_string().contains("skewness"));
    }
}
