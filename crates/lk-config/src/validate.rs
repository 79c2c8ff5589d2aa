//! Configuration validation errors and semantic validation.

use lk_common::Error;
use thiserror::Error;

use crate::analysis::AnalysisConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Bounds on the Monte Carlo budget of the rare-event Poisson test.
pub const MIN_SIMULATIONS: usize = 100;
pub const MAX_SIMULATIONS: usize = 1_000_000;

/// Largest event count a Poisson analysis accepts, in data or in the
/// prediction table.
pub const MAX_EVENTS: u64 = 10_000_000;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => Error::config("config_file", msg),
            ValidationError::ParseError(msg) => Error::Toml(msg),
            ValidationError::SemanticError(msg) => Error::config("config", msg),
            ValidationError::InvalidValue { field, message } => Error::config(field, message),
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("Must be a positive finite number, got {value}")));
    }
    Ok(())
}

/// Validate an analysis configuration semantically.
pub fn validate_config(config: &AnalysisConfig) -> ValidationResult<()> {
    let c = config.confidence_level;
    if !c.is_finite() || c <= 0.0 || c >= 1.0 {
        return Err(invalid(
            "confidence_level",
            format!("Must be in the open interval (0, 1), got {c}"),
        ));
    }

    for (field, bound) in [("min_value", config.min_value), ("max_value", config.max_value)] {
        if let Some(v) = bound {
            if !v.is_finite() {
                return Err(invalid(field, format!("Must be finite, got {v}")));
            }
        }
    }
    if let (Some(lo), Some(hi)) = (config.min_value, config.max_value) {
        if lo > hi {
            return Err(ValidationError::SemanticError(format!(
                "min_value ({lo}) must not exceed max_value ({hi})"
            )));
        }
    }

    if config.sample_size_cap == Some(0) {
        return Err(invalid("sample_size_cap", "Must be at least 1".to_string()));
    }

    validate_pareto(config)?;
    validate_zipf(config)?;
    validate_normal(config)?;
    validate_poisson(config)?;
    Ok(())
}

fn validate_pareto(config: &AnalysisConfig) -> ValidationResult<()> {
    let ratio = config.pareto.concentration_ratio;
    if !ratio.is_finite() || !(0.5..1.0).contains(&ratio) {
        return Err(invalid(
            "pareto.concentration_ratio",
            format!("Must be in [0.5, 1), got {ratio}"),
        ));
    }
    for p in &config.pareto.percentiles {
        if !p.is_finite() || *p <= 0.0 || *p > 100.0 {
            return Err(invalid(
                "pareto.percentiles",
                format!("Each percentile must be in (0, 100], got {p}"),
            ));
        }
    }
    Ok(())
}

fn validate_zipf(config: &AnalysisConfig) -> ValidationResult<()> {
    let min = config.zipf.min_count;
    if !min.is_finite() || min < 0.0 {
        return Err(invalid(
            "zipf.min_count",
            format!("Must be a non-negative number, got {min}"),
        ));
    }
    Ok(())
}

fn validate_normal(config: &AnalysisConfig) -> ValidationResult<()> {
    let normal = &config.normal;
    require_positive("normal.zscore_threshold", normal.zscore_threshold)?;
    require_positive(
        "normal.modified_zscore_threshold",
        normal.modified_zscore_threshold,
    )?;
    require_positive("normal.iqr_multiplier", normal.iqr_multiplier)?;
    require_positive("normal.lof_threshold", normal.lof_threshold)?;
    require_positive("normal.timeseries_threshold", normal.timeseries_threshold)?;
    if normal.lof_neighbors == 0 {
        return Err(invalid("normal.lof_neighbors", "Must be at least 1".to_string()));
    }
    if let Some(window) = normal.timeseries_window {
        if window < 2 {
            return Err(invalid(
                "normal.timeseries_window",
                format!("Must be at least 2, got {window}"),
            ));
        }
    }
    if let Some(limits) = normal.spec_limits {
        if !limits.lower.is_finite() || !limits.upper.is_finite() {
            return Err(invalid(
                "normal.spec_limits",
                format!("Limits must be finite, got ({}, {})", limits.lower, limits.upper),
            ));
        }
        if limits.lower >= limits.upper {
            return Err(invalid(
                "normal.spec_limits",
                format!(
                    "Lower limit must be below upper limit, got ({}, {})",
                    limits.lower, limits.upper
                ),
            ));
        }
    }
    Ok(())
}

fn validate_poisson(config: &AnalysisConfig) -> ValidationResult<()> {
    let sims = config.poisson.simulations;
    if !(MIN_SIMULATIONS..=MAX_SIMULATIONS).contains(&sims) {
        return Err(invalid(
            "poisson.simulations",
            format!("Must be in [{MIN_SIMULATIONS}, {MAX_SIMULATIONS}], got {sims}"),
        ));
    }
    if let Some(max_events) = config.poisson.max_events {
        if max_events > MAX_EVENTS {
            return Err(invalid(
                "poisson.max_events",
                format!("Must be at most {MAX_EVENTS}, got {max_events}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SpecLimits;

    #[test]
    fn defaults_are_valid() {
        validate_config(&AnalysisConfig::default()).unwrap();
    }

    #[test]
    fn confidence_level_must_be_open_unit_interval() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let config = AnalysisConfig {
                confidence_level: bad,
                ..AnalysisConfig::default()
            };
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "confidence_level"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn filters_must_be_ordered() {
        let config = AnalysisConfig {
            min_value: Some(10.0),
            max_value: Some(1.0),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn concentration_ratio_range() {
        let mut config = AnalysisConfig::default();
        config.pareto.concentration_ratio = 0.5;
        validate_config(&config).unwrap();
        config.pareto.concentration_ratio = 1.0;
        assert!(validate_config(&config).is_err());
        config.pareto.concentration_ratio = 0.3;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn malformed_spec_limits() {
        let mut config = AnalysisConfig::default();
        config.normal.spec_limits = Some(SpecLimits { lower: 5.0, upper: 5.0 });
        assert!(validate_config(&config).is_err());
        config.normal.spec_limits = Some(SpecLimits { lower: f64::NEG_INFINITY, upper: 5.0 });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn window_and_simulation_bounds() {
        let mut config = AnalysisConfig::default();
        config.normal.timeseries_window = Some(1);
        assert!(validate_config(&config).is_err());

        let mut config = AnalysisConfig::default();
        config.poisson.simulations = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn prediction_table_is_bounded() {
        let mut config = AnalysisConfig::default();
        config.poisson.max_events = Some(MAX_EVENTS);
        validate_config(&config).unwrap();

        config.poisson.max_events = Some(u64::MAX);
        let err: Error = validate_config(&config).unwrap_err().into();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("poisson.max_events"));
    }

    #[test]
    fn converts_to_config_error() {
        let err: Error = invalid("zipf.min_count", "bad".to_string()).into();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("zipf.min_count"));

        let err: Error = ValidationError::ParseError("line 3".to_string()).into();
        assert_eq!(err.code(), 21);
    }
}
