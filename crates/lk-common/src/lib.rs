//! lawkit common types and errors.
//!
//! This crate provides the vocabulary shared by every lawkit crate:
//! - The closed set of statistical laws and their name aliases
//! - Risk levels and threshold profiles
//! - Method enumerations for the law-specific tests
//! - The unified error type with stable codes
//! - The result records produced by analyzers and the orchestrator

pub mod detail;
pub mod error;
pub mod law;
pub mod options;
pub mod result;
pub mod risk;

pub use detail::DistributionDetail;
pub use error::{DataErrorKind, Error, ErrorCategory, Result, StructuredError};
pub use law::LawKind;
pub use options::{DigitTest, NormalityTest, OutlierMethod, PoissonTest, SamplingMode};
pub use result::{
    AnalyzerResult, CompositeResult, ConfidenceInterval, Conflict, ConflictKind,
    DataCharacteristics, DatasetSummary, DiagnosticReport, LawIssue, LawVerdict,
    OverallAssessment, Recommendation, ValidationReport,
};
pub use risk::{RiskLevel, ThresholdProfile};
