//! Fuzz target for the full analysis pipeline.
//!
//! Arbitrary finite values run through every law; the call may fail with a
//! typed error but never panics or reports a non-finite field.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_config::AnalysisConfig;
use lk_core::{analyze, Dataset, LawSelection};

fuzz_target!(|values: Vec<f64>| {
    let dataset = Dataset::from_values(values.into_iter().take(2048));
    if let Ok(composite) = analyze(&dataset, &LawSelection::all(), &AnalysisConfig::default()) {
        for result in &composite.results {
            assert!(result.effect_size.is_finite());
            assert!((0.0..=1.0).contains(&result.p_value));
        }
    }
});
