//! Fuzz target for range-filter expressions such as `>=100` or `50-500`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_core::numerals::NumberFilter;

fuzz_target!(|data: &str| {
    // Whatever parses must print back to something that parses the same way
    if let Ok(filter) = NumberFilter::parse(data) {
        let reparsed = NumberFilter::parse(&filter.to_string());
        assert_eq!(reparsed.ok(), Some(filter));
    }
});
