//! Logging configuration.
//!
//! Resolved from `LAWKIT_LOG`, `RUST_LOG` and `LAWKIT_LOG_FORMAT`, with
//! explicit caller overrides taking precedence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "LAWKIT_LOG";
pub const ENV_LOG_FORMAT: &str = "LAWKIT_LOG_FORMAT";

/// Where events go and how they look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl LogFormat {
    const NAMES: [(LogFormat, &'static [&'static str]); 2] = [
        (LogFormat::Human, &["human", "console", "pretty"]),
        (LogFormat::Jsonl, &["jsonl", "json", "structured"]),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

/// Verbosity, from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static [&'static str]); 6] = [
        (LogLevel::Trace, &["trace"]),
        (LogLevel::Debug, &["debug"]),
        (LogLevel::Info, &["info"]),
        (LogLevel::Warn, &["warn", "warning"]),
        (LogLevel::Error, &["error"]),
        (LogLevel::Off, &["off", "none", "quiet"]),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize].1[0]
    }

    /// Most verbose level named anywhere in a `RUST_LOG` directive string.
    fn scan_directives(directives: &str) -> Option<LogLevel> {
        let lowered = directives.to_ascii_lowercase();
        Self::NAMES[..Self::NAMES.len() - 1]
            .iter()
            .find(|(_, names)| lowered.contains(names[0]))
            .map(|(level, _)| *level)
    }
}

fn lookup_alias<T: Copy>(table: &[(T, &[&str])], kind: &str, raw: &str) -> Result<T, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(_, names)| names.contains(&wanted.as_str()))
        .map(|(value, _)| *value)
        .ok_or_else(|| format!("unknown log {kind}: {raw}"))
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_alias(&Self::NAMES, "format", s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_alias(&Self::NAMES, "level", s)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create config from the process environment and caller overrides.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), level, format)
    }

    /// Same as [`LogConfig::from_env`] over an arbitrary key lookup.
    ///
    /// Unparseable environment values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F, level: Option<LogLevel>, format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();

        let from_env = lookup(ENV_LOG_LEVEL).and_then(|v| v.parse().ok());
        let from_rust_log = || lookup("RUST_LOG").and_then(|v| LogLevel::scan_directives(&v));
        if let Some(parsed) = from_env.or_else(from_rust_log) {
            config.level = parsed;
        }

        if let Some(parsed) = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok()) {
            config.format = parsed;
        }
        config.level = level.unwrap_or(config.level);
        config.format = format.unwrap_or(config.format);
        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn lawkit_log_beats_rust_log() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG_LEVEL, "warn"), ("RUST_LOG", "trace")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn rust_log_is_scanned() {
        let config = LogConfig::from_lookup(lookup(&[("RUST_LOG", "lk_core=debug")]), None, None);
        assert_eq!(config.level, LogLevel::Debug);
    }

    #[test]
    fn explicit_overrides_win() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG_FORMAT, "json")]),
            Some(LogLevel::Error),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn unparseable_level_falls_back_to_rust_log() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG_LEVEL, "loud"), ("RUST_LOG", "warn,lk_core=trace")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Trace);
    }

    #[test]
    fn format_aliases() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
