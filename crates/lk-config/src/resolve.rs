//! Configuration file resolution and loading.
//!
//! Resolution order: explicit path → `LAWKIT_CONFIG` → XDG config dir → defaults.

use std::path::{Path, PathBuf};

use crate::analysis::AnalysisConfig;
use crate::validate::{ValidationError, ValidationResult};

/// Where the configuration was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    CliArgument,

    /// Named by the `LAWKIT_CONFIG` environment variable.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::CliArgument => "cli",
            ConfigSource::Environment => "env",
            ConfigSource::XdgConfig => "xdg",
            ConfigSource::BuiltinDefault => "default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "LAWKIT_CONFIG";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "lawkit";

/// A loaded, validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AnalysisConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Find the configuration file to use.
///
/// An explicit path must exist. A path named by `LAWKIT_CONFIG` that does
/// not exist is skipped like a missing XDG file.
pub fn resolve_config(cli_path: Option<&Path>) -> ValidationResult<(Option<PathBuf>, ConfigSource)> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok((Some(path.to_path_buf()), ConfigSource::CliArgument));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Some(xdg_config) = dirs::config_dir() {
        let path = xdg_config.join(APP_NAME).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

/// Resolve, parse, apply `LAWKIT_*` overrides, and validate.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    let (path, source) = resolve_config(cli_path)?;
    let mut config = match &path {
        Some(p) => AnalysisConfig::from_file(p)?,
        None => AnalysisConfig::default(),
    };
    config.apply_env_overrides()?;
    crate::validate::validate_config(&config)?;
    Ok(ResolvedConfig {
        config,
        path,
        source,
    })
}
