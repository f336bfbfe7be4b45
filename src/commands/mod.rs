//! CLI command implementations for jtop.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Process table and configuration validation
//! - `snapshot`: Non-interactive listing of the process table

pub mod check;
pub mod snapshot;

// Re-export command functions
pub use check::command_check;
pub use snapshot::command_snapshot;
