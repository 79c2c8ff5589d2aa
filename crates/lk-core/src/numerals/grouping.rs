//! Grouping and decimal separator resolution.

use super::digits::Sym;
use super::LocaleHint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Decimal,
    Group,
}

/// Resolve a folded mantissa into an unsigned decimal string such as `1234.5`.
///
/// Rules, in order:
/// - an explicit decimal glyph wins and every other separator groups;
/// - when both `.` and `,` occur, the last one is the decimal;
/// - a separator that repeats is grouping;
/// - a single separator is decided by the locale hint, and under `Auto` a
///   single `,` followed by exactly three digits groups while anything
///   else is a decimal.
pub fn resolve(syms: &[Sym], locale: LocaleHint) -> Option<String> {
    if !syms.iter().any(|s| matches!(s, Sym::Digit(_))) {
        return None;
    }

    let dots = syms.iter().filter(|s| **s == Sym::Dot).count();
    let commas = syms.iter().filter(|s| **s == Sym::Comma).count();
    let explicit = syms.iter().filter(|s| **s == Sym::Decimal).count();
    if explicit > 1 {
        return None;
    }

    let (dot_role, comma_role) = if explicit == 1 {
        (Role::Group, Role::Group)
    } else if dots > 0 && commas > 0 {
        let last_dot = syms.iter().rposition(|s| *s == Sym::Dot);
        let last_comma = syms.iter().rposition(|s| *s == Sym::Comma);
        if last_dot > last_comma {
            (Role::Decimal, Role::Group)
        } else {
            (Role::Group, Role::Decimal)
        }
    } else if dots > 1 {
        (Role::Group, Role::Group)
    } else if commas > 1 {
        (Role::Group, Role::Group)
    } else if dots == 1 {
        (single_role(syms, Sym::Dot, locale), Role::Group)
    } else if commas == 1 {
        (Role::Group, single_role(syms, Sym::Comma, locale))
    } else {
        (Role::Group, Role::Group)
    };

    let role_of = |s: &Sym| match s {
        Sym::Dot => Some(dot_role),
        Sym::Comma => Some(comma_role),
        Sym::Group => Some(Role::Group),
        Sym::Decimal => Some(Role::Decimal),
        Sym::Digit(_) => None,
    };

    let decimals: Vec<usize> = syms
        .iter()
        .enumerate()
        .filter(|(_, s)| role_of(s) == Some(Role::Decimal))
        .map(|(i, _)| i)
        .collect();
    if decimals.len() > 1 {
        return None;
    }
    let (int_part, frac_part) = match decimals.first() {
        Some(&pos) => (&syms[..pos], &syms[pos + 1..]),
        None => (syms, &[][..]),
    };

    if frac_part.iter().any(|s| !matches!(s, Sym::Digit(_))) {
        return None;
    }

    let int_digits = validate_groups(int_part)?;
    let mut out = if int_digits.is_empty() {
        "0".to_string()
    } else {
        int_digits
    };
    if !frac_part.is_empty() {
        out.push('.');
        out.extend(frac_part.iter().filter_map(digit_char));
    }
    Some(out)
}

fn digit_char(s: &Sym) -> Option<char> {
    match s {
        Sym::Digit(d) => char::from_digit(u32::from(*d), 10),
        _ => None,
    }
}

fn single_role(syms: &[Sym], sep: Sym, locale: LocaleHint) -> Role {
    let pos = syms.iter().position(|s| *s == sep).unwrap_or(0);
    let trailing = syms.len() - pos - 1;
    let hinted = match (locale, sep) {
        (LocaleHint::DotDecimal, Sym::Dot) | (LocaleHint::CommaDecimal, Sym::Comma) => {
            Some(Role::Decimal)
        }
        (LocaleHint::DotDecimal, Sym::Comma) | (LocaleHint::CommaDecimal, Sym::Dot) => {
            Some(Role::Group)
        }
        _ => None,
    };
    match hinted {
        // A hinted grouping separator that cannot form a valid group is
        // read as a decimal instead of rejecting the token.
        Some(Role::Group) if trailing != 3 || pos == 0 => Role::Decimal,
        Some(role) => role,
        None if sep == Sym::Comma && trailing == 3 && pos > 0 => Role::Group,
        None => Role::Decimal,
    }
}

/// Check grouping in an integer part and return its bare digits.
///
/// Accepted layouts: a leading group of 1 to 3 digits followed by groups
/// of 3 (western), or a leading group of 1 to 2 digits followed by groups
/// of 2 and a final group of 3 (Indian lakh/crore).
fn validate_groups(int_part: &[Sym]) -> Option<String> {
    let groups: Vec<&[Sym]> = int_part
        .split(|s| !matches!(s, Sym::Digit(_)))
        .collect();
    if groups.len() > 1 {
        if groups.iter().any(|g| g.is_empty()) {
            return None;
        }
        let lens: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        let (first, rest) = lens.split_first()?;
        let western = (1..=3).contains(first) && rest.iter().all(|&l| l == 3);
        let indian = (1..=2).contains(first)
            && rest.last() == Some(&3)
            && rest[..rest.len() - 1].iter().all(|&l| l == 2);
        if !western && !indian {
            return None;
        }
    }
    Some(int_part.iter().filter_map(digit_char).collect())
}
