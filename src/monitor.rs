//! The monitor owns the current process snapshot.
//!
//! Each refresh runs enumerate, filter, tree build and sort from scratch and
//! then swaps the finished snapshot in, so readers never see a partial one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::process::{
    enumerate_processes, filter_processes, flat_rows, flatten_tree, CpuTracker, Row, ScanStats,
    SortColumn, UserTable, Whitelist,
};

/// Default procfs mount point.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Display settings that change at runtime through intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSettings {
    pub sort: SortColumn,
    pub tree: bool,
    pub show_kernel: bool,
    /// Rendering only; the monitor ignores it.
    pub verbose: bool,
}

/// An immutable, ordered view of the process table at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// 0 for the placeholder before the first refresh.
    pub generation: u64,
    pub taken_at: Instant,
    /// Settings that produced `rows`.
    pub view: ViewSettings,
    pub rows: Vec<Row>,
    pub stats: ScanStats,
}

impl Snapshot {
    pub fn empty(view: ViewSettings) -> Self {
        Self {
            generation: 0,
            taken_at: Instant::now(),
            view,
            rows: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.record.pid).collect()
    }

    pub fn position_of(&self, pid: u32) -> Option<usize> {
        self.rows.iter().position(|r| r.record.pid == pid)
    }
}

/// Failure that prevents a refresh from completing at all.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("cannot list processes under {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct Monitor {
    proc_root: PathBuf,
    whitelist: Whitelist,
    users: UserTable,
    cpu: CpuTracker,
    current: Arc<Snapshot>,
}

impl Monitor {
    /// Monitor of the live `/proc` with system account lookups.
    pub fn new(whitelist: Whitelist) -> Self {
        Self::with_source(DEFAULT_PROC_ROOT, whitelist, UserTable::system())
    }

    /// Monitor reading from an arbitrary procfs-style directory.
    pub fn with_source(
        proc_root: impl AsRef<Path>,
        whitelist: Whitelist,
        users: UserTable,
    ) -> Self {
        Self {
            proc_root: proc_root.as_ref().to_path_buf(),
            whitelist,
            users,
            cpu: CpuTracker::new(),
            current: Arc::new(Snapshot::empty(ViewSettings::default())),
        }
    }

    /// Rebuilds the snapshot for `view` and commits it.
    ///
    /// On error the previous snapshot stays current.
    #[instrument(skip(self))]
    pub fn refresh(&mut self, view: &ViewSettings) -> Result<(), MonitorError> {
        let start = Instant::now();

        let (mut records, stats) =
            enumerate_processes(&self.proc_root, &self.users).map_err(|source| {
                MonitorError::Scan {
                    path: self.proc_root.clone(),
                    source,
                }
            })?;

        // every live process feeds the CPU tracker, not just the visible ones
        self.cpu.update(&mut records, start);

        let scanned = records.len();
        let filtered = filter_processes(records, &self.whitelist, view.show_kernel);
        debug!("Filtered {} of {} processes", filtered.len(), scanned);

        let rows = if view.tree {
            flatten_tree(filtered, view.sort)
        } else {
            flat_rows(filtered, view.sort)
        };

        let snapshot = Snapshot {
            generation: self.current.generation + 1,
            taken_at: start,
            view: *view,
            rows,
            stats,
        };

        info!(
            "Refresh {} completed: {} shown, {} scanned, {} vanished, {} unreadable, {:.2}ms",
            snapshot.generation,
            snapshot.rows.len(),
            scanned,
            stats.vanished,
            stats.unreadable,
            start.elapsed().as_secs_f64() * 1000.0
        );

        self.current = Arc::new(snapshot);
        Ok(())
    }

    /// The latest completed snapshot.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }
}
