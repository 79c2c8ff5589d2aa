//! Fuzz target for analysis configuration parsing.
//!
//! Arbitrary TOML must either fail to parse or yield a configuration whose
//! validation returns instead of panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_config::AnalysisConfig;

fuzz_target!(|data: &str| {
    if let Ok(config) = AnalysisConfig::from_toml_str(data) {
        let _ = config.validate();
        let _ = lk_config::fingerprint(&config);
    }
});
