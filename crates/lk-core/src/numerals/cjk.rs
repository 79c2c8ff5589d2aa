//! CJK numeral words.
//!
//! Handles common and financial digit characters, the small multipliers
//! 十/百/千, the large multipliers 万/億/兆, the decimal mark 点, bare digit
//! sequences such as 二〇二四, and positional digits in any script placed
//! before a multiplier (`123万`, `1.5億`).

use super::{digits, grouping, LocaleHint};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Glyph {
    Digit(u8),
    Small(f64),
    Large(f64),
    Point,
}

fn glyph(c: char) -> Option<Glyph> {
    let g = match c {
        '〇' | '零' => Glyph::Digit(0),
        '一' | '壹' | '弌' => Glyph::Digit(1),
        '二' | '贰' | '貳' | '弐' | '两' | '兩' => Glyph::Digit(2),
        '三' | '叁' | '參' | '参' | '弎' => Glyph::Digit(3),
        '四' | '肆' => Glyph::Digit(4),
        '五' | '伍' => Glyph::Digit(5),
        '六' | '陆' | '陸' => Glyph::Digit(6),
        '七' | '柒' => Glyph::Digit(7),
        '八' | '捌' => Glyph::Digit(8),
        '九' | '玖' => Glyph::Digit(9),
        '十' | '拾' => Glyph::Small(10.0),
        '百' | '佰' => Glyph::Small(100.0),
        '千' | '仟' | '阡' => Glyph::Small(1_000.0),
        '万' | '萬' => Glyph::Large(1e4),
        '亿' | '億' => Glyph::Large(1e8),
        '兆' => Glyph::Large(1e12),
        '点' | '點' => Glyph::Point,
        _ => return None,
    };
    Some(g)
}

/// Whether a token contains any CJK numeral glyph.
pub fn applies(token: &str) -> bool {
    token.chars().any(|c| glyph(c).is_some())
}

/// Decode a token containing CJK numeral glyphs.
pub fn decode(token: &str, locale: LocaleHint) -> Option<f64> {
    let mut glyphs = Vec::new();
    let mut run = String::new();
    for c in token.chars() {
        if let Some(g) = glyph(c) {
            if !run.is_empty() {
                glyphs.push(Piece::Positional(positional(&run, locale)?));
                run.clear();
            }
            glyphs.push(Piece::Glyph(g));
        } else if digits::is_digit(c) || digits::is_separator(c) {
            run.push(c);
        } else {
            return None;
        }
    }
    if !run.is_empty() {
        glyphs.push(Piece::Positional(positional(&run, locale)?));
    }

    let (int_pieces, frac_pieces) = match glyphs
        .iter()
        .position(|p| *p == Piece::Glyph(Glyph::Point))
    {
        Some(pos) => (&glyphs[..pos], Some(&glyphs[pos + 1..])),
        None => (&glyphs[..], None),
    };

    let int_value = if int_pieces.is_empty() {
        0.0
    } else if int_pieces
        .iter()
        .all(|p| matches!(p, Piece::Glyph(Glyph::Digit(_))))
    {
        digit_sequence(int_pieces)?
    } else {
        multiplied(int_pieces)?
    };

    let frac_value = match frac_pieces {
        None => 0.0,
        Some(pieces) => fraction(pieces)?,
    };
    Some(int_value + frac_value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece {
    Glyph(Glyph),
    Positional(f64),
}

fn positional(run: &str, locale: LocaleHint) -> Option<f64> {
    let syms = digits::fold(run)?;
    grouping::resolve(&syms, locale)?.parse::<f64>().ok()
}

/// 二〇二四 → 2024.
fn digit_sequence(pieces: &[Piece]) -> Option<f64> {
    pieces.iter().try_fold(0.0, |acc, p| match p {
        Piece::Glyph(Glyph::Digit(d)) => Some(acc * 10.0 + f64::from(*d)),
        _ => None,
    })
}

/// 三百 → 300, 一千二百三十四 → 1234, 五万六千 → 56000, 1.5億 → 1.5e8.
fn multiplied(pieces: &[Piece]) -> Option<f64> {
    let mut total = 0.0;
    let mut section = 0.0;
    let mut current: Option<f64> = None;
    let mut last_large = f64::INFINITY;

    for piece in pieces {
        match *piece {
            Piece::Glyph(Glyph::Digit(0)) => {}
            Piece::Glyph(Glyph::Digit(d)) => {
                if current.is_some() {
                    return None;
                }
                current = Some(f64::from(d));
            }
            Piece::Positional(v) => {
                if current.is_some() {
                    return None;
                }
                current = Some(v);
            }
            Piece::Glyph(Glyph::Small(unit)) => {
                section += current.take().unwrap_or(1.0) * unit;
            }
            Piece::Glyph(Glyph::Large(unit)) => {
                let block = section + current.take().unwrap_or(0.0);
                if unit < last_large {
                    total += if block == 0.0 { unit } else { block * unit };
                    last_large = unit;
                } else {
                    // 千万億 style stacking multiplies everything so far.
                    total = (total + block) * unit;
                }
                section = 0.0;
            }
            Piece::Glyph(Glyph::Point) => return None,
        }
    }
    Some(total + section + current.unwrap_or(0.0))
}

/// Digits after 点, read positionally.
fn fraction(pieces: &[Piece]) -> Option<f64> {
    let mut value = 0.0;
    let mut scale = 0.1;
    for p in pieces {
        match p {
            Piece::Glyph(Glyph::Digit(d)) => {
                value += f64::from(*d) * scale;
                scale /= 10.0;
            }
            _ => return None,
        }
    }
    if pieces.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Option<f64> {
        decode(s, LocaleHint::Auto)
    }

    #[test]
    fn small_multipliers() {
        assert_eq!(d("十"), Some(10.0));
        assert_eq!(d("三百"), Some(300.0));
        assert_eq!(d("一千二百三十四"), Some(1234.0));
        assert_eq!(d("二十五"), Some(25.0));
        assert_eq!(d("一百零五"), Some(105.0));
    }

    #[test]
    fn large_multipliers() {
        assert_eq!(d("五万六千七百八十九"), Some(56789.0));
        assert_eq!(d("一億二千万"), Some(120_000_000.0));
        assert_eq!(d("三兆"), Some(3e12));
        assert_eq!(d("萬"), Some(1e4));
    }

    #[test]
    fn financial_forms_match_common_forms() {
        assert_eq!(d("壹仟贰佰叁拾肆"), d("一千二百三十四"));
        assert_eq!(d("貳萬"), Some(20_000.0));
        assert_eq!(d("两千"), Some(2000.0));
    }

    #[test]
    fn bare_digit_sequences() {
        assert_eq!(d("二〇二四"), Some(2024.0));
        assert_eq!(d("一二三"), Some(123.0));
    }

    #[test]
    fn positional_prefix_with_multiplier() {
        assert_eq!(d("123万"), Some(1_230_000.0));
        assert_eq!(d("1.5億"), Some(150_000_000.0));
        assert_eq!(d("\u{FF13}万5千"), Some(35_000.0));
    }

    #[test]
    fn decimal_point_word() {
        let v = d("三点一四").unwrap();
        assert!((v - 3.14).abs() < 1e-12);
        assert_eq!(d("三点"), None);
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(d("三百円"), None);
        assert_eq!(d("三三百"), None);
    }
}
