//! Fuzz target for numeral normalization.
//!
//! Every token must decode to a finite value or a rejection reason, under
//! every locale hint, without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_core::numerals::{normalize_token, LocaleHint};

fuzz_target!(|data: &str| {
    for locale in [LocaleHint::Auto, LocaleHint::DotDecimal, LocaleHint::CommaDecimal] {
        if let Ok(value) = normalize_token(data, locale) {
            assert!(value.is_finite());
        }
    }
});
