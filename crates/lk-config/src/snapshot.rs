//! Configuration fingerprints for reproducibility.
//!
//! Every composite result carries the fingerprint of the configuration that
//! produced it, so two runs can be compared without diffing files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::AnalysisConfig;
use crate::resolve::{ConfigSource, ResolvedConfig};

/// SHA-256 of the canonical JSON rendering of a configuration, hex encoded.
///
/// Struct fields serialize in declaration order, so equal configurations
/// always hash equal.
pub fn fingerprint(config: &AnalysisConfig) -> String {
    let canonical = serde_json::to_vec(config).unwrap_or_default();
    hash_content(&canonical)
}

fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// A frozen record of which configuration a run used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub fingerprint: String,
    pub source: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl ConfigSnapshot {
    pub fn new(config: &AnalysisConfig, source: ConfigSource) -> Self {
        ConfigSnapshot {
            fingerprint: fingerprint(config),
            source: source.as_str().to_string(),
            path: None,
        }
    }

    pub fn from_resolved(resolved: &ResolvedConfig) -> Self {
        ConfigSnapshot {
            fingerprint: fingerprint(&resolved.config),
            source: resolved.source.as_str().to_string(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// First 12 hex characters, for log lines.
    pub fn short_id(&self) -> &str {
        &self.fingerprint[..12.min(self.fingerprint.len())]
    }

    /// Check whether a configuration matches this snapshot.
    pub fn matches(&self, config: &AnalysisConfig) -> bool {
        self.fingerprint == fingerprint(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);

        b.pareto.concentration_ratio = 0.7;
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn snapshot_matches_its_config() {
        let config = AnalysisConfig::default();
        let snap = ConfigSnapshot::new(&config, ConfigSource::BuiltinDefault);
        assert!(snap.matches(&config));
        assert_eq!(snap.short_id().len(), 12);
        assert_eq!(snap.source, "default");

        let mut other = config.clone();
        other.recommend = true;
        assert!(!snap.matches(&other));
    }
}
