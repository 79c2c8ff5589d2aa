//! lawkit configuration loading and validation.
//!
//! This crate provides:
//! - `AnalysisConfig`, the immutable per-call option set, with per-law tables
//! - TOML loading and environment overrides
//! - Config resolution (explicit path → env → XDG → defaults)
//! - Semantic validation
//! - Presets for common analysis scenarios
//! - Fingerprints tying results to the configuration that produced them

pub mod analysis;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use analysis::{
    AnalysisConfig, BenfordOptions, NormalOptions, ParetoOptions, PoissonOptions, SpecLimits,
    ZipfOptions,
};
pub use preset::{get_preset, PresetName};
pub use resolve::{load_config, resolve_config, ConfigSource, ResolvedConfig};
pub use snapshot::{fingerprint, ConfigSnapshot};
pub use validate::{ValidationError, ValidationResult, MAX_EVENTS};
