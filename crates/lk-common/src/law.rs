//! The closed set of statistical laws lawkit can test.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A statistical law with a known analyzer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LawKind {
    /// Benford's law of leading digits
    #[serde(alias = "benf")]
    #[value(alias = "benf")]
    Benford,
    /// Pareto 80/20 concentration
    Pareto,
    /// Zipf rank-frequency power law
    Zipf,
    /// Normal distribution
    #[serde(alias = "norm")]
    #[value(alias = "norm")]
    Normal,
    /// Poisson distribution of event counts
    #[serde(alias = "pois")]
    #[value(alias = "pois")]
    Poisson,
}

impl LawKind {
    /// Every law, in canonical order.
    pub const ALL: [LawKind; 5] = [
        LawKind::Benford,
        LawKind::Pareto,
        LawKind::Zipf,
        LawKind::Normal,
        LawKind::Poisson,
    ];

    /// Full lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            LawKind::Benford => "benford",
            LawKind::Pareto => "pareto",
            LawKind::Zipf => "zipf",
            LawKind::Normal => "normal",
            LawKind::Poisson => "poisson",
        }
    }

    /// Short code accepted as an alias.
    pub fn short_code(self) -> &'static str {
        match self {
            LawKind::Benford => "benf",
            LawKind::Pareto => "pareto",
            LawKind::Zipf => "zipf",
            LawKind::Normal => "norm",
            LawKind::Poisson => "pois",
        }
    }

    /// Whether the law is only defined for strictly positive magnitudes.
    pub fn requires_positive(self) -> bool {
        matches!(self, LawKind::Benford | LawKind::Pareto | LawKind::Zipf)
    }

    /// Minimum sample size under default options.
    ///
    /// Pareto counts distinct values and Zipf counts distinct ranks; the
    /// Poisson minimum drops to 2 in rare-event mode.
    pub fn default_minimum_sample(self) -> usize {
        match self {
            LawKind::Benford => 5,
            LawKind::Pareto => 2,
            LawKind::Zipf => 3,
            LawKind::Normal => 3,
            LawKind::Poisson => 5,
        }
    }
}

impl fmt::Display for LawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LawKind {
    type Err = Error;

    /// Case-insensitive match against full names and short codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        LawKind::ALL
            .into_iter()
            .find(|law| needle == law.name() || needle == law.short_code())
            .ok_or_else(|| Error::Config {
                field: "laws".to_string(),
                message: format!(
                    "unknown law '{}'; expected one of benford (benf), pareto, zipf, normal (norm), poisson (pois)",
                    s.trim()
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases_case_insensitively() {
        assert_eq!("benf".parse::<LawKind>().unwrap(), LawKind::Benford);
        assert_eq!("Benford".parse::<LawKind>().unwrap(), LawKind::Benford);
        assert_eq!(" ZIPF ".parse::<LawKind>().unwrap(), LawKind::Zipf);
        assert_eq!("pois".parse::<LawKind>().unwrap(), LawKind::Poisson);
    }

    #[test]
    fn unknown_law_names_the_token() {
        let err = "weibull".parse::<LawKind>().unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("weibull"));
    }

    #[test]
    fn positivity_requirements() {
        assert!(LawKind::Benford.requires_positive());
        assert!(LawKind::Zipf.requires_positive());
        assert!(!LawKind::Normal.requires_positive());
        assert!(!LawKind::Poisson.requires_positive());
    }

    #[test]
    fn serde_accepts_short_codes() {
        let law: LawKind = serde_json::from_str("\"benf\"").unwrap();
        assert_eq!(law, LawKind::Benford);
        assert_eq!(serde_json::to_string(&LawKind::Normal).unwrap(), "\"normal\"");
    }
}
