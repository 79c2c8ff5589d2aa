//! The immutable dataset every analyzer consumes.
//!
//! A dataset is either a sequence of numeric values or a frequency table
//! (token, count) ordered by descending count. Provenance counts travel
//! with it so results can report how much of the source was used.

use std::borrow::Cow;
use std::collections::HashMap;

use lk_common::result::DatasetSummary;
use lk_common::SamplingMode;
use lk_config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generate::rng::LawRng;
use crate::numerals::{self, ExtractOptions, Extraction, NumberFilter};

/// Where the values came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Tokens or values examined.
    pub source_size: usize,
    pub total_extracted: usize,
    pub total_rejected: usize,
    /// Length before `sample_size_cap` reduced the dataset.
    pub truncated_from: Option<usize>,
}

/// Text tokenization options for frequency datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub case_fold: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions { case_fold: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    values: Vec<f64>,
    /// Present for frequency tables built from text; parallel to `values`.
    labels: Option<Vec<String>>,
    frequency_table: bool,
    provenance: Provenance,
}

impl Dataset {
    /// Numeric dataset; non-finite inputs are counted as rejected.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut kept = Vec::new();
        let mut rejected = 0;
        for v in values {
            if v.is_finite() {
                kept.push(v);
            } else {
                rejected += 1;
            }
        }
        let provenance = Provenance {
            source_size: kept.len() + rejected,
            total_extracted: kept.len(),
            total_rejected: rejected,
            truncated_from: None,
        };
        Dataset {
            values: kept,
            labels: None,
            frequency_table: false,
            provenance,
        }
    }

    pub fn from_extraction(extraction: Extraction) -> Self {
        let provenance = Provenance {
            source_size: extraction.source_size(),
            total_extracted: extraction.total_extracted,
            total_rejected: extraction.total_rejected,
            truncated_from: None,
        };
        Dataset {
            values: extraction.values,
            labels: None,
            frequency_table: false,
            provenance,
        }
    }

    /// Normalize raw text into a numeric dataset.
    pub fn extract(text: &str, options: &ExtractOptions) -> Self {
        Self::from_extraction(numerals::extract(text, options))
    }

    /// Word-frequency table for rank-frequency analysis.
    pub fn from_text(text: &str, options: TextOptions) -> Self {
        let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
        let mut occurrences = 0usize;
        for (order, word) in words(text, options.case_fold).enumerate() {
            occurrences += 1;
            counts.entry(word).or_insert((0, order)).0 += 1;
        }
        let mut table: Vec<(String, u64, usize)> =
            counts.into_iter().map(|(w, (c, first))| (w, c, first)).collect();
        table.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let provenance = Provenance {
            source_size: occurrences,
            total_extracted: occurrences,
            total_rejected: 0,
            truncated_from: None,
        };
        let (labels, values) = table
            .into_iter()
            .map(|(w, c, _)| (w, c as f64))
            .unzip();
        Dataset {
            values,
            labels: Some(labels),
            frequency_table: true,
            provenance,
        }
    }

    /// Frequency table from explicit pairs; sorted by count, stable.
    pub fn from_frequencies<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut table: Vec<(String, u64)> = pairs.into_iter().map(|(s, c)| (s.into(), c)).collect();
        table.sort_by(|a, b| b.1.cmp(&a.1));
        let occurrences: u64 = table.iter().map(|(_, c)| *c).sum();
        let provenance = Provenance {
            source_size: occurrences as usize,
            total_extracted: occurrences as usize,
            total_rejected: 0,
            truncated_from: None,
        };
        let (labels, values) = table.into_iter().map(|(s, c)| (s, c as f64)).unzip();
        Dataset {
            values,
            labels: Some(labels),
            frequency_table: true,
            provenance,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values are already-ranked frequencies rather than observations.
    pub fn is_frequency_table(&self) -> bool {
        self.frequency_table
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            sample_count: self.len(),
            source_size: self.provenance.source_size,
            total_extracted: self.provenance.total_extracted,
            total_rejected: self.provenance.total_rejected,
            truncated_from: self.provenance.truncated_from,
        }
    }

    /// Drop values outside `filter`, counting them as rejected.
    pub fn filtered(self, filter: &NumberFilter) -> Self {
        if filter.is_unbounded() || self.frequency_table {
            return self;
        }
        let before = self.values.len();
        let values: Vec<f64> = self.values.into_iter().filter(|v| filter.accepts(*v)).collect();
        let dropped = before - values.len();
        Dataset {
            provenance: Provenance {
                total_extracted: self.provenance.total_extracted - dropped.min(self.provenance.total_extracted),
                total_rejected: self.provenance.total_rejected + dropped,
                ..self.provenance
            },
            values,
            ..self
        }
    }

    /// Reduce to at most `cap` values. Order is preserved in every mode.
    pub fn capped(self, cap: usize, mode: SamplingMode, seed: u64) -> Self {
        let len = self.values.len();
        if cap == 0 || len <= cap {
            return self;
        }
        let indices: Vec<usize> = match mode {
            SamplingMode::Head => (0..cap).collect(),
            SamplingMode::Stride => (0..cap)
                .map(|i| ((i as u128 * len as u128) / cap as u128) as usize)
                .collect(),
            SamplingMode::Random => {
                let mut rng = LawRng::from_seed_u64(seed);
                let mut picked = rand::seq::index::sample(&mut rng, len, cap).into_vec();
                picked.sort_unstable();
                picked
            }
        };
        debug!(from = len, to = cap, mode = mode.as_str(), "dataset capped");
        let values = indices.iter().map(|&i| self.values[i]).collect();
        let labels = self
            .labels
            .as_ref()
            .map(|l| indices.iter().map(|&i| l[i].clone()).collect());
        Dataset {
            values,
            labels,
            frequency_table: self.frequency_table,
            provenance: Provenance {
                truncated_from: Some(self.provenance.truncated_from.unwrap_or(len)),
                ..self.provenance
            },
        }
    }

    /// Apply the configured range filter and sample cap.
    ///
    /// Both steps are idempotent, so an already prepared dataset is
    /// returned borrowed.
    pub fn conform(&self, config: &AnalysisConfig) -> Cow<'_, Dataset> {
        let filter = NumberFilter::between(config.min_value, config.max_value);
        let needs_filter = !self.frequency_table
            && !filter.is_unbounded()
            && self.values.iter().any(|v| !filter.accepts(*v));
        let needs_cap = config
            .sample_size_cap
            .is_some_and(|cap| cap > 0 && self.values.len() > cap);
        if !needs_filter && !needs_cap {
            return Cow::Borrowed(self);
        }
        let mut prepared = self.clone().filtered(&filter);
        if let Some(cap) = config.sample_size_cap {
            prepared = prepared.capped(cap, config.sampling, config.sampling_seed);
        }
        Cow::Owned(prepared)
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Split text into words: one token per CJK ideograph or kana, otherwise
/// maximal runs of alphanumeric characters (apostrophes kept inside words).
pub fn words(text: &str, case_fold: bool) -> impl Iterator<Item = String> {
    fn flush(current: &mut String, out: &mut Vec<String>, case_fold: bool) {
        let trimmed = current.trim_matches('\'');
        if !trimmed.is_empty() {
            out.push(if case_fold {
                trimmed.to_lowercase()
            } else {
                trimmed.to_string()
            });
        }
        current.clear();
    }

    let mut out = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            flush(&mut current, &mut out, case_fold);
            out.push(c.to_string());
        } else if c.is_alphanumeric() || (c == '\'' && !current.is_empty()) {
            current.push(c);
        } else {
            flush(&mut current, &mut out, case_fold);
        }
    }
    flush(&mut current, &mut out, case_fold);
    out.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_are_rejected() {
        let ds = Dataset::from_values([1.0, f64::NAN, 2.0, f64::INFINITY]);
        assert_eq!(ds.values(), &[1.0, 2.0]);
        let p = ds.provenance();
        assert_eq!((p.source_size, p.total_extracted, p.total_rejected), (4, 2, 2));
    }

    #[test]
    fn text_frequencies_rank_with_stable_ties() {
        let ds = Dataset::from_text("b a b c a d The the", TextOptions::default());
        let labels = ds.labels().unwrap();
        assert_eq!(labels, &["b", "a", "the", "c", "d"]);
        assert_eq!(ds.values(), &[2.0, 2.0, 2.0, 1.0, 1.0]);
        assert!(ds.is_frequency_table());
        assert_eq!(ds.provenance().total_extracted, 8);
    }

    #[test]
    fn cjk_characters_are_single_tokens() {
        let w: Vec<String> = words("東京タワー is tall", false).collect();
        assert_eq!(w, vec!["東", "京", "タ", "ワ", "ー", "is", "tall"]);
    }

    #[test]
    fn case_folding_is_optional() {
        let ds = Dataset::from_text("Word word", TextOptions { case_fold: false });
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn caps_preserve_order() {
        let ds = Dataset::from_values((0..100).map(f64::from));
        let head = ds.clone().capped(10, SamplingMode::Head, 0);
        assert_eq!(head.values()[9], 9.0);
        assert_eq!(head.provenance().truncated_from, Some(100));

        let stride = ds.clone().capped(10, SamplingMode::Stride, 0);
        assert_eq!(stride.values(), &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0]);

        let random = ds.clone().capped(10, SamplingMode::Random, 9);
        assert_eq!(random.len(), 10);
        assert!(random.values().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(random, ds.capped(10, SamplingMode::Random, 9));
    }

    #[test]
    fn conform_applies_filter_and_cap_once() {
        let ds = Dataset::from_values((1..=50).map(f64::from));
        let config = AnalysisConfig {
            min_value: Some(11.0),
            sample_size_cap: Some(20),
            ..AnalysisConfig::default()
        };
        let prepared = ds.conform(&config).into_owned();
        assert_eq!(prepared.len(), 20);
        assert_eq!(prepared.provenance().total_rejected, 10);
        assert_eq!(prepared.provenance().truncated_from, Some(40));
        assert!(matches!(prepared.conform(&config), Cow::Borrowed(_)));
    }
}
