//! Method enumerations for the law-specific tests.
//!
//! Every enum parses case-insensitively from its snake_case name and rejects
//! unknown values with a configuration error naming the offending field.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal,
        { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
            JsonSchema,
        )]
        #[serde(rename_all = "snake_case")]
        #[value(rename_all = "snake_case")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase().replace('-', "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| Error::Config {
                        field: $field.to_string(),
                        message: format!(
                            "unknown value '{}'; expected one of {}",
                            s.trim(),
                            $name::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                        ),
                    })
            }
        }
    };
}

choice_enum! {
    /// Which digit position the Benford analyzer tests.
    DigitTest, field = "benford.test_method",
    {
        /// Leading significant digit, 9 buckets
        #[default]
        First => "first",
        /// Second significant digit, 10 buckets
        Second => "second",
        /// Last two integer digits against uniform, 100 buckets
        LastTwo => "last_two",
    }
}

choice_enum! {
    /// Normality test used by the Normal analyzer.
    NormalityTest, field = "normal.test_method",
    {
        #[default]
        Shapiro => "shapiro",
        Anderson => "anderson",
        Ks => "ks",
    }
}

choice_enum! {
    /// Outlier detection method used by the Normal analyzer.
    OutlierMethod, field = "outlier_method",
    {
        #[default]
        Zscore => "zscore",
        ModifiedZscore => "modified_zscore",
        Iqr => "iqr",
        /// Local outlier factor over 1-D neighbourhoods
        Lof => "lof",
        /// Majority vote of zscore, modified_zscore and iqr
        Ensemble => "ensemble",
    }
}

choice_enum! {
    /// Goodness-of-fit test used by the Poisson analyzer.
    PoissonTest, field = "poisson.test_method",
    {
        #[default]
        ChiSquare => "chi_square",
        Ks => "ks",
        /// Index-of-dispersion test
        Variance => "variance",
    }
}

choice_enum! {
    /// How `sample_size_cap` reduces an oversized dataset.
    SamplingMode, field = "sampling",
    {
        /// Keep the first N values
        Head => "head",
        /// Keep N evenly spaced values
        #[default]
        Stride => "stride",
        /// Keep a seeded random subset in original order
        Random => "random",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_and_kebab_case() {
        assert_eq!("last_two".parse::<DigitTest>().unwrap(), DigitTest::LastTwo);
        assert_eq!("Modified-ZScore".parse::<OutlierMethod>().unwrap(), OutlierMethod::ModifiedZscore);
        assert_eq!("chi_square".parse::<PoissonTest>().unwrap(), PoissonTest::ChiSquare);
    }

    #[test]
    fn unknown_method_is_config_error_with_field() {
        let err = "kolmogorov".parse::<NormalityTest>().unwrap_err();
        assert_eq!(err.code(), 20);
        let msg = err.to_string();
        assert!(msg.contains("normal.test_method"), "{msg}");
        assert!(msg.contains("kolmogorov"), "{msg}");
    }

    #[test]
    fn defaults() {
        assert_eq!(DigitTest::default(), DigitTest::First);
        assert_eq!(SamplingMode::default(), SamplingMode::Stride);
        assert_eq!(OutlierMethod::default(), OutlierMethod::Zscore);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&OutlierMethod::ModifiedZscore).unwrap();
        assert_eq!(json, "\"modified_zscore\"");
    }
}
