//! Error types for lawkit.
//!
//! Every error carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - The offending law, where one applies
//! - A remediation hint for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Insufficient Sample
//!   Reason: sample size 3 < minimum 5 for law 'poisson'
//!   Fix: Provide more values, or enable rare_event_mode for sparse Poisson counts.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 11,
//!   "category": "data",
//!   "law": "poisson",
//!   "message": "sample size 3 < minimum 5 for law 'poisson'",
//!   "skippable": true,
//!   "context": { "actual": 3, "minimum": 5 }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::law::LawKind;

/// Result type alias for lawkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input data cannot support the analysis.
    Data,
    /// Invalid options, unknown names, malformed config files.
    Config,
    /// Numerical failure inside an analyzer.
    Computation,
    /// Whole-call outcomes: cancellation, nothing executed.
    Orchestration,
    /// File I/O and serialization.
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Computation => write!(f, "computation"),
            ErrorCategory::Orchestration => write!(f, "orchestration"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// What is wrong with the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataErrorKind {
    /// Nothing left to analyze.
    Empty,
    /// Fewer usable values than the law needs.
    InsufficientSample { actual: usize, minimum: usize },
    /// A value outside the law's domain (e.g. a negative count).
    InvalidValue,
}

/// Unified error type for lawkit.
#[derive(Error, Debug)]
pub enum Error {
    // Data errors (10-19)
    #[error("{message}")]
    Data {
        law: Option<LawKind>,
        kind: DataErrorKind,
        message: String,
    },

    // Configuration errors (20-29)
    #[error("invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },

    #[error("config parse error: {0}")]
    Toml(String),

    // Computation errors (30-39)
    #[error("computation failed for law '{law}': {message}")]
    Computation { law: LawKind, message: String },

    // Orchestration (40-49)
    #[error("analysis cancelled")]
    Cancelled,

    #[error("no law could be executed ({skipped} skipped, {failed} failed)")]
    NoLawExecuted { skipped: usize, failed: usize },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// An empty dataset, optionally attributed to one law.
    pub fn empty(law: Option<LawKind>) -> Self {
        let message = match law {
            Some(law) => format!("dataset is empty for law '{law}'"),
            None => "dataset is empty".to_string(),
        };
        Error::Data {
            law,
            kind: DataErrorKind::Empty,
            message,
        }
    }

    /// Sample smaller than the law's minimum.
    pub fn insufficient_sample(law: LawKind, actual: usize, minimum: usize) -> Self {
        Error::Data {
            law: Some(law),
            kind: DataErrorKind::InsufficientSample { actual, minimum },
            message: format!("sample size {actual} < minimum {minimum} for law '{law}'"),
        }
    }

    /// Same as [`Error::insufficient_sample`] but names what is being counted
    /// (distinct values, ranks, ...).
    pub fn insufficient_counted(law: LawKind, what: &str, actual: usize, minimum: usize) -> Self {
        Error::Data {
            law: Some(law),
            kind: DataErrorKind::InsufficientSample { actual, minimum },
            message: format!("{what} {actual} < minimum {minimum} for law '{law}'"),
        }
    }

    /// A value outside the law's domain.
    pub fn invalid_value(law: LawKind, message: impl Into<String>) -> Self {
        Error::Data {
            law: Some(law),
            kind: DataErrorKind::InvalidValue,
            message: format!("{} for law '{law}'", message.into()),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn computation(law: LawKind, message: impl Into<String>) -> Self {
        Error::Computation {
            law,
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Data errors
    /// - 20-29: Configuration errors
    /// - 30-39: Computation errors
    /// - 40-49: Orchestration outcomes
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Data { kind, .. } => match kind {
                DataErrorKind::Empty => 10,
                DataErrorKind::InsufficientSample { .. } => 11,
                DataErrorKind::InvalidValue => 12,
            },
            Error::Config { .. } => 20,
            Error::Toml(_) => 21,
            Error::Computation { .. } => 30,
            Error::Cancelled => 40,
            Error::NoLawExecuted { .. } => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Data { .. } => ErrorCategory::Data,
            Error::Config { .. } | Error::Toml(_) => ErrorCategory::Config,
            Error::Computation { .. } => ErrorCategory::Computation,
            Error::Cancelled | Error::NoLawExecuted { .. } => ErrorCategory::Orchestration,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// The law the error is attributed to, if any.
    pub fn law(&self) -> Option<LawKind> {
        match self {
            Error::Data { law, .. } => *law,
            Error::Computation { law, .. } => Some(*law),
            _ => None,
        }
    }

    /// Whether a multi-law call may record this error as a skipped law and
    /// carry on. Only data errors qualify.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::Data { .. })
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Data { kind, law, .. } => match (kind, law) {
                (DataErrorKind::Empty, _) => {
                    "No usable values remain. Check the input and the min_value/max_value filters."
                }
                (DataErrorKind::InsufficientSample { .. }, Some(LawKind::Poisson)) => {
                    "Provide more values, or enable rare_event_mode for sparse Poisson counts."
                }
                (DataErrorKind::InsufficientSample { .. }, _) => {
                    "Provide more values, or choose a law whose minimum sample the data meets."
                }
                (DataErrorKind::InvalidValue, _) => {
                    "Remove values outside the law's domain or pick a law that accepts them."
                }
            },
            Error::Config { .. } => {
                "Fix the named option. Enumerated options reject unknown values rather than defaulting."
            }
            Error::Toml(_) => "Check the config file syntax; unknown keys are rejected.",
            Error::Computation { .. } => {
                "The data is degenerate for this test (e.g. zero variance). Inspect the input or try another test method."
            }
            Error::Cancelled => "The caller cancelled the call; no partial result was produced.",
            Error::NoLawExecuted { .. } => {
                "Every requested law was skipped or failed. See the per-law reasons and supply more data."
            }
            Error::Io(_) => "Check that the path exists and is readable.",
            Error::Json(_) => "Internal serialization failure; please report it.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Data { kind, .. } => match kind {
                DataErrorKind::Empty => "Empty Dataset",
                DataErrorKind::InsufficientSample { .. } => "Insufficient Sample",
                DataErrorKind::InvalidValue => "Invalid Value",
            },
            Error::Config { .. } => "Configuration Error",
            Error::Toml(_) => "Config Parse Error",
            Error::Computation { .. } => "Computation Error",
            Error::Cancelled => "Cancelled",
            Error::NoLawExecuted { .. } => "No Law Executed",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Structured record for JSON output.
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from(self)
    }

    pub fn to_json(&self) -> String {
        self.to_structured().to_json()
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Law the error is attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law: Option<LawKind>,

    /// Human-readable error message.
    pub message: String,

    /// Whether a multi-law call skips past this error.
    pub skippable: bool,

    /// Additional structured context (field name, sample sizes).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = BTreeMap::new();
        match err {
            Error::Data {
                kind: DataErrorKind::InsufficientSample { actual, minimum },
                ..
            } => {
                context.insert("actual".to_string(), serde_json::json!(actual));
                context.insert("minimum".to_string(), serde_json::json!(minimum));
            }
            Error::Config { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::NoLawExecuted { skipped, failed } => {
                context.insert("skipped".to_string(), serde_json::json!(skipped));
                context.insert("failed".to_string(), serde_json::json!(failed));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            law: err.law(),
            message: err.to_string(),
            skippable: err.is_skippable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {err}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        remediation = err.remediation()
    )
}
