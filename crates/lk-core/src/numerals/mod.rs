//! Numeral normalization.
//!
//! Turns raw text tokens in many scripts and locale conventions into finite
//! `f64` values. Decoding is a fixed pipeline of independent decoders; the
//! first one that claims a token decides it. Rejected tokens are counted by
//! reason and never raise.

pub mod cjk;
pub mod digits;
pub mod filter;
pub mod grouping;

pub use filter::{Bound, NumberFilter};

use lk_common::LawKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which character marks the decimal point when a token is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocaleHint {
    /// Infer from the token shape.
    #[default]
    Auto,
    /// `1,234.5`
    DotDecimal,
    /// `1.234,5`
    CommaDecimal,
}

const COMMA_DECIMAL_LANGUAGES: &[&str] = &[
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "it", "lt",
    "lv", "nb", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk", "vi",
];

const DOT_DECIMAL_LANGUAGES: &[&str] = &[
    "ar", "en", "fa", "he", "hi", "ja", "ko", "ms", "th", "zh",
];

impl LocaleHint {
    /// Map a BCP-47-like tag (`de-DE`, `fr`, `en_US`, `ja-JP`) to a convention.
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.trim().to_ascii_lowercase().replace('_', "-");
        // Swiss German and Italian group with apostrophes and use a dot.
        if lower == "de-ch" || lower == "it-ch" {
            return LocaleHint::DotDecimal;
        }
        let language = lower.split('-').next().unwrap_or("");
        if COMMA_DECIMAL_LANGUAGES.contains(&language) {
            LocaleHint::CommaDecimal
        } else if DOT_DECIMAL_LANGUAGES.contains(&language) {
            LocaleHint::DotDecimal
        } else {
            LocaleHint::Auto
        }
    }
}

/// Sign requirements of the law a value is extracted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnitudePolicy {
    #[default]
    Any,
    /// Reject zero, negatives and zero-padded tokens.
    StrictlyPositive,
}

impl MagnitudePolicy {
    pub fn for_law(law: LawKind) -> Self {
        if law.requires_positive() {
            MagnitudePolicy::StrictlyPositive
        } else {
            MagnitudePolicy::Any
        }
    }
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NonNumeric,
    NonFinite,
    OutOfRange,
    NonPositive,
    LeadingZero,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NonNumeric => "non_numeric",
            RejectReason::NonFinite => "non_finite",
            RejectReason::OutOfRange => "out_of_range",
            RejectReason::NonPositive => "non_positive",
            RejectReason::LeadingZero => "leading_zero",
        }
    }
}

/// Rejection counts by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub non_numeric: usize,
    pub non_finite: usize,
    pub out_of_range: usize,
    pub non_positive: usize,
    pub leading_zero: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        let slot = match reason {
            RejectReason::NonNumeric => &mut self.non_numeric,
            RejectReason::NonFinite => &mut self.non_finite,
            RejectReason::OutOfRange => &mut self.out_of_range,
            RejectReason::NonPositive => &mut self.non_positive,
            RejectReason::LeadingZero => &mut self.leading_zero,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.non_numeric + self.non_finite + self.out_of_range + self.non_positive + self.leading_zero
    }
}

/// A successfully decoded token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub value: f64,
    /// The positional integer part had a redundant leading zero (`007`).
    pub leading_zero: bool,
}

/// One pass of the decoding pipeline.
pub trait NumeralDecoder: Sync {
    fn name(&self) -> &'static str;

    /// Decode a sign-free token, or `None` if this decoder does not apply.
    fn decode(&self, token: &str, locale: LocaleHint) -> Option<Decoded>;
}

/// CJK numeral words, including positional digits before a multiplier.
pub struct CjkWords;

impl NumeralDecoder for CjkWords {
    fn name(&self) -> &'static str {
        "cjk_words"
    }

    fn decode(&self, token: &str, locale: LocaleHint) -> Option<Decoded> {
        if !cjk::applies(token) {
            return None;
        }
        cjk::decode(token, locale).map(|value| Decoded {
            value,
            leading_zero: false,
        })
    }
}

/// Positional digits in any supported script with grouping and decimals.
pub struct PositionalDigits;

impl NumeralDecoder for PositionalDigits {
    fn name(&self) -> &'static str {
        "positional_digits"
    }

    fn decode(&self, token: &str, locale: LocaleHint) -> Option<Decoded> {
        let (mantissa, exponent) = digits::split_exponent(token)?;
        let syms = digits::fold(mantissa)?;
        let leading_zero = matches!(
            syms.as_slice(),
            [digits::Sym::Digit(0), digits::Sym::Digit(_), ..]
        );
        let mut canonical = grouping::resolve(&syms, locale)?;
        if let Some(exp) = exponent {
            canonical.push('e');
            canonical.push_str(&exp.to_string());
        }
        let value = canonical.parse::<f64>().ok()?;
        Some(Decoded {
            value,
            leading_zero,
        })
    }
}

/// Decoders in priority order.
pub const DECODERS: &[&dyn NumeralDecoder] = &[&CjkWords, &PositionalDigits];

const LEADING_NOISE: &[char] = &[
    '$', '€', '£', '¥', '₹', '￥', '(', '[', '"', '\'', '「', '『', '（',
];
const TRAILING_NOISE: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '"', '\'', '%', '％', '」', '』', '）', '。', '、',
    '，', '．', '！', '？', '円', '元',
];

/// Strip surrounding currency marks, brackets and sentence punctuation.
pub fn trim_token(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches(LEADING_NOISE)
        .trim_end_matches(TRAILING_NOISE)
}

/// Decode one token without any law policy or range filter.
pub fn normalize_token(raw: &str, locale: LocaleHint) -> Result<f64, RejectReason> {
    decode_signed(raw, locale).and_then(|d| {
        if d.value.is_finite() {
            Ok(d.value)
        } else {
            Err(RejectReason::NonFinite)
        }
    })
}

fn decode_signed(raw: &str, locale: LocaleHint) -> Result<Decoded, RejectReason> {
    let token = trim_token(raw);
    let (negative, body) = digits::split_sign(token);
    if body.is_empty() {
        return Err(RejectReason::NonNumeric);
    }
    for decoder in DECODERS {
        if let Some(decoded) = decoder.decode(body, locale) {
            trace!(decoder = decoder.name(), token = raw, value = decoded.value, "decoded");
            let value = if negative { -decoded.value } else { decoded.value };
            return Ok(Decoded { value, ..decoded });
        }
    }
    Err(RejectReason::NonNumeric)
}

/// Options for extracting values from tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractOptions {
    pub locale: LocaleHint,
    pub policy: MagnitudePolicy,
    pub filter: NumberFilter,
}

impl ExtractOptions {
    pub fn for_law(law: LawKind) -> Self {
        ExtractOptions {
            policy: MagnitudePolicy::for_law(law),
            ..ExtractOptions::default()
        }
    }

    pub fn with_locale(mut self, locale: LocaleHint) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_filter(mut self, filter: NumberFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Decode one token and apply the magnitude policy and range filter.
pub fn classify_token(raw: &str, options: &ExtractOptions) -> Result<f64, RejectReason> {
    let decoded = decode_signed(raw, options.locale)?;
    if !decoded.value.is_finite() {
        return Err(RejectReason::NonFinite);
    }
    if options.policy == MagnitudePolicy::StrictlyPositive {
        if decoded.value <= 0.0 {
            return Err(RejectReason::NonPositive);
        }
        if decoded.leading_zero {
            return Err(RejectReason::LeadingZero);
        }
    }
    if !options.filter.accepts(decoded.value) {
        return Err(RejectReason::OutOfRange);
    }
    Ok(decoded.value)
}

/// Extracted values plus bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub values: Vec<f64>,
    pub total_extracted: usize,
    pub total_rejected: usize,
    pub rejections: RejectionCounts,
}

impl Extraction {
    /// Number of tokens examined.
    pub fn source_size(&self) -> usize {
        self.total_extracted + self.total_rejected
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | '|' | '、' | '；' | '\u{3000}')
}

/// Split raw text into candidate tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_delimiter).filter(|t| !t.is_empty())
}

/// Extract values from free text.
pub fn extract(text: &str, options: &ExtractOptions) -> Extraction {
    extract_tokens(tokens(text), options)
}

/// Extract values from pre-split tokens such as CSV cells.
pub fn extract_tokens<'a, I>(tokens: I, options: &ExtractOptions) -> Extraction
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Extraction::default();
    for token in tokens {
        match classify_token(token, options) {
            Ok(value) => out.values.push(value),
            Err(reason) => out.rejections.record(reason),
        }
    }
    out.total_extracted = out.values.len();
    out.total_rejected = out.rejections.total();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(s: &str) -> Result<f64, RejectReason> {
        normalize_token(s, LocaleHint::Auto)
    }

    #[test]
    fn scripts_agree() {
        for token in ["1234", "\u{FF11}\u{FF12}\u{FF13}\u{FF14}", "\u{0661}\u{0662}\u{0663}\u{0664}", "\u{06F1}\u{06F2}\u{06F3}\u{06F4}", "\u{0967}\u{0968}\u{0969}\u{096A}", "一千二百三十四", "壹仟贰佰叁拾肆"] {
            assert_eq!(auto(token), Ok(1234.0), "{token}");
        }
    }

    #[test]
    fn arabic_separators() {
        assert_eq!(auto("\u{0661}\u{066C}\u{0662}\u{0663}\u{0664}\u{066B}\u{0665}"), Ok(1234.5));
    }

    #[test]
    fn signs_exponents_and_punctuation() {
        assert_eq!(auto("-1,234.5"), Ok(-1234.5));
        assert_eq!(auto("\u{2212}7"), Ok(-7.0));
        assert_eq!(auto("1.5e3"), Ok(1500.0));
        assert_eq!(auto("42."), Ok(42.0));
        assert_eq!(auto("$1,234"), Ok(1234.0));
        assert_eq!(auto("(15%)"), Ok(15.0));
        assert_eq!(auto("1e400"), Err(RejectReason::NonFinite));
        assert_eq!(auto("abc"), Err(RejectReason::NonNumeric));
        assert_eq!(auto("-"), Err(RejectReason::NonNumeric));
    }

    #[test]
    fn locale_tags() {
        assert_eq!(LocaleHint::from_tag("de-DE"), LocaleHint::CommaDecimal);
        assert_eq!(LocaleHint::from_tag("fr"), LocaleHint::CommaDecimal);
        assert_eq!(LocaleHint::from_tag("en_US"), LocaleHint::DotDecimal);
        assert_eq!(LocaleHint::from_tag("de-CH"), LocaleHint::DotDecimal);
        assert_eq!(LocaleHint::from_tag("ja"), LocaleHint::DotDecimal);
        assert_eq!(LocaleHint::from_tag("xx"), LocaleHint::Auto);
    }

    #[test]
    fn strictly_positive_policy() {
        let opts = ExtractOptions::for_law(LawKind::Benford);
        assert_eq!(classify_token("0", &opts), Err(RejectReason::NonPositive));
        assert_eq!(classify_token("-5", &opts), Err(RejectReason::NonPositive));
        assert_eq!(classify_token("007", &opts), Err(RejectReason::LeadingZero));
        assert_eq!(classify_token("0.5", &opts), Ok(0.5));

        let any = ExtractOptions::for_law(LawKind::Normal);
        assert_eq!(classify_token("-5", &any), Ok(-5.0));
        assert_eq!(classify_token("007", &any), Ok(7.0));
    }

    #[test]
    fn extraction_counts_every_token() {
        let opts = ExtractOptions::for_law(LawKind::Benford)
            .with_filter(NumberFilter::parse("<1000").unwrap());
        let ext = extract("売上 123 abc 0 456、 7890 inf 12.5", &opts);
        assert_eq!(ext.values, vec![123.0, 456.0, 12.5]);
        assert_eq!(ext.total_extracted, 3);
        assert_eq!(ext.rejections.non_numeric, 3);
        assert_eq!(ext.rejections.non_positive, 1);
        assert_eq!(ext.rejections.out_of_range, 1);
        assert_eq!(ext.total_rejected, 5);
        assert_eq!(ext.source_size(), 8);
    }

    #[test]
    fn comma_locale_extraction() {
        let opts = ExtractOptions::default().with_locale(LocaleHint::CommaDecimal);
        let ext = extract("1.234,5 2,75 3.000", &opts);
        assert_eq!(ext.values, vec![1234.5, 2.75, 3000.0]);
    }
}
