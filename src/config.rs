//! Configuration management for jtop.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats. The merged
//! [`Config`] is validated once into typed [`Settings`]; nothing downstream
//! reads the raw strings.

use crate::cli::{Args, ConfigFormat, LogLevel};
use crate::monitor::ViewSettings;
use crate::process::{lookup_user_by_name, Owner, SortColumn, UnknownColumn, Whitelist};
use crate::scheduler::MAX_DELAY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing::level_filters::LevelFilter;

// Default configuration constants
pub const DEFAULT_DELAY: &str = "1.5s";
pub const DEFAULT_LOG_LEVEL: &str = "off";

/// Locations searched when no `--config` is given, first match wins.
pub const DEFAULT_CONFIG_PATHS: [&str; 4] = [
    "/etc/jtop/jtop.yaml",
    "/etc/jtop/jtop.toml",
    "./jtop.yaml",
    "./jtop.toml",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid delay '{0}'")]
    InvalidDelay(String),

    #[error("delay must be greater than zero")]
    ZeroDelay,

    #[error("invalid pid '{0}'")]
    InvalidPid(String),

    #[error(transparent)]
    UnknownSortColumn(#[from] UnknownColumn),

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

/// Mergeable configuration; every field is optional so files can be partial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Refresh delay, e.g. "1500ms", "1.5s", "2m" or "2" (seconds)
    pub delay: Option<String>,

    // Initial view
    #[serde(alias = "sort-by")]
    pub sort: Option<String>,
    pub tree: Option<bool>,
    #[serde(alias = "show-kernel")]
    pub show_kernel: Option<bool>,
    pub verbose: Option<bool>,

    // Allow-lists
    pub pids: Option<Vec<u32>>,
    pub users: Option<Vec<String>>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
    #[serde(alias = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: Some(DEFAULT_DELAY.to_string()),
            sort: Some(SortColumn::default().title().to_string()),
            tree: Some(false),
            show_kernel: Some(false),
            verbose: Some(false),
            pids: None,
            users: None,
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            log_file: None,
        }
    }
}

/// Validated settings the binary runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub delay: Duration,
    pub view: ViewSettings,
    pub whitelist: Whitelist,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Validates `config`, resolving usernames against the account database.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::from_config_with(config, lookup_user_by_name)
    }

    /// Like [`Settings::from_config`] with a custom username resolver.
    pub fn from_config_with<F>(config: &Config, resolve_user: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<Owner>,
    {
        let delay = parse_delay(config.delay.as_deref().unwrap_or(DEFAULT_DELAY))?;

        let sort = match config.sort.as_deref() {
            Some(title) => title.parse::<SortColumn>()?,
            None => SortColumn::default(),
        };

        let pids = config.pids.clone().unwrap_or_default();
        if let Some(bad) = pids.iter().find(|&&pid| pid == 0) {
            return Err(ConfigError::InvalidPid(bad.to_string()));
        }

        let mut owners = Vec::new();
        for name in config.users.iter().flatten() {
            let owner = resolve_user(name).ok_or_else(|| ConfigError::UnknownUser(name.clone()))?;
            owners.push(owner);
        }

        let level = config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        let log_level = level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLogLevel(level.to_string()))?;

        Ok(Self {
            delay,
            view: ViewSettings {
                sort,
                tree: config.tree.unwrap_or(false),
                show_kernel: config.show_kernel.unwrap_or(false),
                verbose: config.verbose.unwrap_or(false),
            },
            whitelist: Whitelist::new(pids, owners),
            log_level,
            log_file: config.log_file.clone(),
        })
    }
}

/// Parses a delay such as `1500ms`, `1.5s`, `2m` or a bare number of seconds.
pub fn parse_delay(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let (number, per_unit, divisor) = if let Some(n) = trimmed.strip_suffix("ms") {
        (n, 1.0, 1000.0)
    } else if let Some(n) = trimmed.strip_suffix('s') {
        (n, 1.0, 1.0)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 60.0, 1.0)
    } else {
        (trimmed, 1.0, 1.0)
    };

    let amount: f64 = number
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDelay(value.to_string()))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConfigError::InvalidDelay(value.to_string()));
    }

    let delay = Duration::try_from_secs_f64(amount * per_unit / divisor)
        .ok()
        .filter(|d| *d <= MAX_DELAY)
        .ok_or_else(|| ConfigError::InvalidDelay(value.to_string()))?;
    if delay.is_zero() {
        return Err(ConfigError::ZeroDelay);
    }
    Ok(delay)
}

/// Parses a comma-separated PID list. An empty value means no PID filter.
pub fn parse_pid_list(value: &str) -> Result<Vec<u32>, ConfigError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(str::trim)
        .map(|s| {
            s.parse::<u32>()
                .ok()
                .filter(|&pid| pid > 0)
                .ok_or_else(|| ConfigError::InvalidPid(s.to_string()))
        })
        .collect()
}

/// Splits a comma-separated user list. An empty value means no user filter.
fn parse_user_list(value: &str) -> Result<Vec<String>, ConfigError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(str::trim)
        .map(|s| {
            if s.is_empty() {
                Err(ConfigError::UnknownUser(String::new()))
            } else {
                Ok(s.to_string())
            }
        })
        .collect()
}

fn log_level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Off => "off",
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
    let file_config = if args.no_config {
        None
    } else {
        load_config(args.config.as_deref())?
    };
    let mut config = merge_over_defaults(file_config);

    if let Some(delay) = &args.delay {
        config.delay = Some(delay.clone());
    }
    if let Some(sort) = &args.sort {
        config.sort = Some(sort.clone());
    }

    // Switches only ever turn a feature on
    if args.tree {
        config.tree = Some(true);
    }
    if args.kernel {
        config.show_kernel = Some(true);
    }
    if args.verbose {
        config.verbose = Some(true);
    }

    if let Some(pids) = &args.pids {
        config.pids = Some(parse_pid_list(pids)?);
    }
    if let Some(users) = &args.users {
        config.users = Some(parse_user_list(users)?);
    }

    if let Some(level) = args.log_level {
        config.log_level = Some(log_level_name(level).to_string());
    }
    if let Some(path) = &args.log_file {
        config.log_file = Some(path.clone());
    }

    Ok(config)
}

/// Fills the fields a config file left out with the defaults.
fn merge_over_defaults(file: Option<Config>) -> Config {
    let defaults = Config::default();
    let Some(file) = file else {
        return defaults;
    };

    Config {
        delay: file.delay.or(defaults.delay),
        sort: file.sort.or(defaults.sort),
        tree: file.tree.or(defaults.tree),
        show_kernel: file.show_kernel.or(defaults.show_kernel),
        verbose: file.verbose.or(defaults.verbose),
        pids: file.pids.or(defaults.pids),
        users: file.users.or(defaults.users),
        log_level: file.log_level.or(defaults.log_level),
        log_file: file.log_file.or(defaults.log_file),
    }
}

/// Loads a config file.
///
/// An explicit path must exist. Without one the default locations are
/// searched and `None` is returned when none exists.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            Some(p) => p.to_path_buf(),
            None => return Ok(None),
        },
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_config(&path, &content).map(Some)
}

/// Parses config text, choosing the format from the file extension.
pub fn parse_config(path: &Path, content: &str) -> Result<Config, ConfigError> {
    let parse_err = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        Some("toml") => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        // Default to YAML
        _ => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(config: &Config, format: ConfigFormat) -> anyhow::Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
