//! lawkit core library.
//!
//! This library provides the analysis engine:
//! - Numeral normalization for mixed-script, mixed-locale text
//! - The immutable `Dataset` every analyzer consumes
//! - Benford, Pareto, Zipf, Normal and Poisson analyzers
//! - Multi-law orchestration: analyze, validate, diagnose
//! - Seeded sample generation
//! - Structured logging setup for callers that want it

pub mod dataset;
pub mod diagnose;
pub mod generate;
pub mod laws;
pub mod logging;
pub mod numerals;
pub mod orchestrator;

pub use dataset::{Dataset, Provenance, TextOptions};
pub use generate::{generate, GenerateOptions, GenerateParams, GeneratedDataset};
pub use laws::analyze_law;
pub use numerals::{ExtractOptions, Extraction, LocaleHint, NumberFilter};
pub use orchestrator::{
    analyze, analyze_with_cancel, diagnose, diagnose_with_cancel, validate, validate_with_cancel,
    CancellationToken, LawSelection,
};
