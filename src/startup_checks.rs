//! Startup requirement validation for jtop.
//!
//! This module validates that the process table and an interactive terminal
//! are available before the dashboard takes over the screen.

use jtop::process::collect_proc_entries;
use nix::unistd::geteuid;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("cannot read process table at {path}: {source}")]
    ProcUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no process entries visible under {0}")]
    ProcEmpty(PathBuf),

    #[error("standard input and output must be a terminal")]
    NotATerminal,
}

/// Validate all runtime requirements for the interactive dashboard
pub fn validate_requirements(proc_root: &Path) -> Result<usize, StartupError> {
    check_user_privileges();
    let visible = check_proc_access(proc_root)?;
    check_terminal()?;
    info!("All runtime requirements validated");
    Ok(visible)
}

/// Non-root users still see every process, but some command lines may be hidden.
fn check_user_privileges() {
    if geteuid().is_root() {
        info!("Running as root (uid=0)");
    } else {
        debug!("Not running as root - some process details may be unreadable");
    }
}

/// Lists the process table once and returns how many PIDs are visible.
pub fn check_proc_access(proc_root: &Path) -> Result<usize, StartupError> {
    let entries = collect_proc_entries(proc_root).map_err(|source| {
        StartupError::ProcUnavailable {
            path: proc_root.to_path_buf(),
            source,
        }
    })?;
    if entries.is_empty() {
        return Err(StartupError::ProcEmpty(proc_root.to_path_buf()));
    }
    info!("{} access: {} processes visible", proc_root.display(), entries.len());
    Ok(entries.len())
}

fn check_terminal() -> Result<(), StartupError> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        Ok(())
    } else {
        Err(StartupError::NotATerminal)
    }
}
