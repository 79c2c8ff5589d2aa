//! Range filters such as `>=100`, `<200`, `100-500` or `=42`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use lk_common::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inclusive or exclusive bounds on accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberFilter {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Bound {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Bound {
            value,
            inclusive: false,
        }
    }
}

fn filter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:(?P<op>>=|<=|>|<|=)\s*(?P<v>[-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)|(?P<lo>[-+]?\d+(?:\.\d+)?)\s*(?:-|\.\.|~)\s*(?P<hi>[-+]?\d+(?:\.\d+)?))\s*$",
        )
        .expect("number filter pattern is valid")
    })
}

impl NumberFilter {
    /// Accept everything.
    pub fn any() -> Self {
        NumberFilter::default()
    }

    /// Inclusive `[min, max]` from optional config bounds.
    pub fn between(min: Option<f64>, max: Option<f64>) -> Self {
        NumberFilter {
            lower: min.map(Bound::inclusive),
            upper: max.map(Bound::inclusive),
        }
    }

    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = || {
            Error::config(
                "filter",
                format!("cannot parse '{expr}'; expected forms like '>=100', '<200', '100-500' or '=42'"),
            )
        };
        let caps = filter_regex().captures(expr).ok_or_else(invalid)?;
        let num = |name: &str| -> Result<f64> {
            caps.name(name)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };

        let filter = match caps.name("op").map(|m| m.as_str()) {
            Some(">=") => NumberFilter {
                lower: Some(Bound::inclusive(num("v")?)),
                upper: None,
            },
            Some(">") => NumberFilter {
                lower: Some(Bound::exclusive(num("v")?)),
                upper: None,
            },
            Some("<=") => NumberFilter {
                lower: None,
                upper: Some(Bound::inclusive(num("v")?)),
            },
            Some("<") => NumberFilter {
                lower: None,
                upper: Some(Bound::exclusive(num("v")?)),
            },
            Some("=") => {
                let v = num("v")?;
                NumberFilter {
                    lower: Some(Bound::inclusive(v)),
                    upper: Some(Bound::inclusive(v)),
                }
            }
            _ => {
                let lo = num("lo")?;
                let hi = num("hi")?;
                if lo > hi {
                    return Err(Error::config(
                        "filter",
                        format!("range '{expr}' has lower bound {lo} above upper bound {hi}"),
                    ));
                }
                NumberFilter {
                    lower: Some(Bound::inclusive(lo)),
                    upper: Some(Bound::inclusive(hi)),
                }
            }
        };
        Ok(filter)
    }

    /// Intersect with another filter, keeping the tighter bound on each side.
    pub fn and(self, other: NumberFilter) -> Self {
        NumberFilter {
            lower: tighter(self.lower, other.lower, |a, b| a > b),
            upper: tighter(self.upper, other.upper, |a, b| a < b),
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        let above = self.lower.is_none_or(|b| {
            if b.inclusive {
                value >= b.value
            } else {
                value > b.value
            }
        });
        let below = self.upper.is_none_or(|b| {
            if b.inclusive {
                value <= b.value
            } else {
                value < b.value
            }
        });
        above && below
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

fn tighter(a: Option<Bound>, b: Option<Bound>, stricter: impl Fn(f64, f64) -> bool) -> Option<Bound> {
    match (a, b) {
        (Some(x), Some(y)) => {
            if stricter(x.value, y.value) || (x.value == y.value && !x.inclusive) {
                Some(x)
            } else {
                Some(y)
            }
        }
        (x, None) => x,
        (None, y) => y,
    }
}

impl FromStr for NumberFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NumberFilter::parse(s)
    }
}

impl fmt::Display for NumberFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (None, None) => write!(f, "*"),
            (Some(lo), Some(hi)) if lo.inclusive && hi.inclusive && lo.value == hi.value => {
                write!(f, "={}", lo.value)
            }
            (Some(lo), Some(hi)) if lo.inclusive && hi.inclusive => {
                write!(f, "{}-{}", lo.value, hi.value)
            }
            (lo, hi) => {
                let mut parts = Vec::new();
                if let Some(b) = lo {
                    parts.push(format!("{}{}", if b.inclusive { ">=" } else { ">" }, b.value));
                }
                if let Some(b) = hi {
                    parts.push(format!("{}{}", if b.inclusive { "<=" } else { "<" }, b.value));
                }
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_forms() {
        let f = NumberFilter::parse(">=100").unwrap();
        assert!(f.accepts(100.0));
        assert!(!f.accepts(99.9));

        let f = NumberFilter::parse("<200").unwrap();
        assert!(f.accepts(199.0));
        assert!(!f.accepts(200.0));

        let f: NumberFilter = "=42".parse().unwrap();
        assert!(f.accepts(42.0));
        assert!(!f.accepts(42.5));
    }

    #[test]
    fn ranges_are_inclusive() {
        let f = NumberFilter::parse("100-500").unwrap();
        assert!(f.accepts(100.0));
        assert!(f.accepts(500.0));
        assert!(!f.accepts(500.1));
        assert_eq!(f.to_string(), "100-500");
    }

    #[test]
    fn malformed_filters_name_the_field() {
        for bad in ["", ">>5", "abc", "500-100", "1-"] {
            let err = NumberFilter::parse(bad).unwrap_err();
            assert_eq!(err.code(), 20, "{bad}");
        }
    }

    #[test]
    fn intersection_keeps_tighter_bounds() {
        let f = NumberFilter::parse(">=10")
            .unwrap()
            .and(NumberFilter::between(Some(5.0), Some(50.0)));
        assert!(!f.accepts(7.0));
        assert!(f.accepts(50.0));
        assert!(!f.accepts(51.0));
    }
}
