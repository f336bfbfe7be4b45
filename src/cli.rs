//! CLI arguments and subcommands for jtop.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug, Default)]
#[command(
    name = "jtop",
    about = "Interactive terminal process monitor",
    long_about = "Interactive terminal process monitor.\n\n\
                  Periodically samples the process table and shows it as a sortable, \
                  filterable list or tree, refreshing on a timer while staying responsive \
                  to the keyboard.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Delay between updates (e.g. 1500ms, 1.5s, 2m; bare numbers are seconds)
    #[arg(short = 'd', long)]
    pub delay: Option<String>,

    /// Show kernel threads
    #[arg(short = 'k', long)]
    pub kernel: bool,

    /// Filter by PID (comma-separated list)
    #[arg(short = 'p', long)]
    pub pids: Option<String>,

    /// Sort by the specified column
    #[arg(short = 's', long)]
    pub sort: Option<String>,

    /// Display process list as tree
    #[arg(short = 't', long)]
    pub tree: bool,

    /// Filter by user (comma-separated list)
    #[arg(short = 'u', long)]
    pub users: Option<String>,

    /// Show full command line with arguments
    #[arg(long)]
    pub verbose: bool,

    /// Log level (logs go to --log-file only)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Append log output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: Option<ConfigFormat>,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the process table is readable
    Check,

    /// Print the process list once instead of starting the dashboard
    Snapshot {
        /// Number of refreshes (CPU% needs at least 2)
        #[arg(short = 'n', long, default_value_t = 2)]
        iterations: usize,
    },
}
