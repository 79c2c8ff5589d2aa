//! Digit-form folding.
//!
//! Maps every supported digit script and separator glyph onto a small symbol
//! alphabet so the separator rules only ever see one shape of input.

/// A folded character of a positional numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sym {
    Digit(u8),
    /// `.` or fullwidth `．`; role decided by the grouping rules.
    Dot,
    /// `,` or fullwidth `，`; role decided by the grouping rules.
    Comma,
    /// Always a grouping separator: `'`, `_`, thin/no-break spaces, U+066C.
    Group,
    /// Always the decimal separator: U+066B.
    Decimal,
}

/// Value of a digit in any supported script.
pub fn digit_value(c: char) -> Option<u8> {
    let base = match c {
        '0'..='9' => '0',
        '\u{FF10}'..='\u{FF19}' => '\u{FF10}',
        '\u{0660}'..='\u{0669}' => '\u{0660}',
        '\u{06F0}'..='\u{06F9}' => '\u{06F0}',
        '\u{0966}'..='\u{096F}' => '\u{0966}',
        _ => return None,
    };
    Some((c as u32 - base as u32) as u8)
}

pub fn is_digit(c: char) -> bool {
    digit_value(c).is_some()
}

fn separator(c: char) -> Option<Sym> {
    match c {
        '.' | '\u{FF0E}' => Some(Sym::Dot),
        ',' | '\u{FF0C}' => Some(Sym::Comma),
        '\'' | '_' | '\u{2019}' | '\u{202F}' | '\u{00A0}' | '\u{2009}' | '\u{066C}' => {
            Some(Sym::Group)
        }
        '\u{066B}' => Some(Sym::Decimal),
        _ => None,
    }
}

pub fn is_separator(c: char) -> bool {
    separator(c).is_some()
}

/// Leading sign of a token: returns (negative, rest).
pub fn split_sign(token: &str) -> (bool, &str) {
    let mut chars = token.chars();
    match chars.next() {
        Some('-' | '\u{2212}' | '\u{FF0D}') => (true, chars.as_str()),
        Some('+' | '\u{FF0B}') => (false, chars.as_str()),
        _ => (false, token),
    }
}

/// Fold a sign-free mantissa into symbols, or `None` on any foreign character.
pub fn fold(mantissa: &str) -> Option<Vec<Sym>> {
    mantissa
        .chars()
        .map(|c| digit_value(c).map(Sym::Digit).or_else(|| separator(c)))
        .collect()
}

/// Split an ASCII scientific exponent off a token.
///
/// Returns the mantissa and the exponent, or `None` when the suffix after
/// `e`/`E` is not an optionally signed run of ASCII digits.
pub fn split_exponent(token: &str) -> Option<(&str, Option<i32>)> {
    match token.find(['e', 'E']) {
        None => Some((token, None)),
        Some(pos) => {
            let (mantissa, rest) = token.split_at(pos);
            let exp = &rest[1..];
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            exp.parse::<i32>().ok().map(|e| (mantissa, Some(e)))
        }
    }
}
