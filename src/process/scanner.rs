//! Process discovery under a procfs-style root.
//!
//! This module scans the root directory for numeric PID entries and reads
//! each one, dropping processes that vanish or cannot be read.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::process::reader::{read_process, ProcessError};
use crate::process::record::ProcessRecord;
use crate::process::users::UserTable;

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Parses a directory name as a PID. Zero and non-numeric names are rejected.
pub fn parse_pid(name: &str) -> Option<u32> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|&pid| pid > 0)
}

/// Scans `root` for entries with numeric PIDs, in ascending PID order.
///
/// Failing to list `root` itself is an error; unreadable entries are skipped.
pub fn collect_proc_entries(root: &Path) -> io::Result<Vec<ProcEntry>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root)?.flatten() {
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        let pid = match parse_pid(name) {
            Some(v) => v,
            None => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
    }
    out.sort_unstable_by_key(|e| e.pid);
    Ok(out)
}

/// Counters from one enumeration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub candidates: usize,
    pub vanished: usize,
    pub unreadable: usize,
}

/// Reads every process below `root`.
///
/// The returned records are sorted by ascending PID. Per-process failures
/// never fail the scan; they are only counted.
pub fn enumerate_processes(
    root: &Path,
    users: &UserTable,
) -> io::Result<(Vec<ProcessRecord>, ScanStats)> {
    let entries = collect_proc_entries(root)?;
    debug!("Collected {} process entries from {}", entries.len(), root.display());

    // collect() on an indexed parallel iterator keeps entry order
    let results: Vec<Result<ProcessRecord, ProcessError>> = entries
        .par_iter()
        .map(|entry| read_process(&entry.proc_path, entry.pid, users))
        .collect();

    let mut stats = ScanStats {
        candidates: entries.len(),
        ..ScanStats::default()
    };
    let mut records = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(e @ ProcessError::Vanished { .. }) => {
                debug!("Skipping: {}", e);
                stats.vanished += 1;
            }
            Err(e @ ProcessError::Unreadable { .. }) => {
                debug!("Skipping: {}", e);
                stats.unreadable += 1;
            }
        }
    }

    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_proc(root: &Path, pid: u32, cmdline: &[u8]) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).expect("create pid dir");
        fs::write(dir.join("cmdline"), cmdline).expect("write cmdline");
        fs::write(dir.join("status"), "PPid:\t1\nUid:\t0\t0\t0\t0\n").expect("write status");
        fs::write(
            dir.join("stat"),
            format!("{} (x) S 1 1 1 0 -1 0 0 0 0 0 1 1 0 0 20 0 1 0 1 1 1", pid),
        )
        .expect("write stat");
    }

    // -------------------------------------------------------------------------
    // Tests for parse_pid
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("1"), Some(1));
        assert_eq!(parse_pid("4194304"), Some(4194304));
        assert_eq!(parse_pid("0"), None);
        assert_eq!(parse_pid("self"), None);
        assert_eq!(parse_pid("-5"), None);
        assert_eq!(parse_pid("+5"), None);
        assert_eq!(parse_pid(""), None);
        assert_eq!(parse_pid("99999999999"), None);
    }

    // -------------------------------------------------------------------------
    // Tests for collect_proc_entries / enumerate_processes
    // -------------------------------------------------------------------------

    #[test]
    fn test_collect_proc_entries_ignores_non_pid_names() {
        let root = tempdir().expect("Failed to create temp dir");
        for name in ["300", "50", "self", "sys", "1", "thread-self"] {
            fs::create_dir_all(root.path().join(name)).expect("mkdir");
        }
        fs::write(root.path().join("uptime"), "1.0 1.0").expect("write");

        let pids: Vec<u32> = collect_proc_entries(root.path())
            .expect("readable root")
            .iter()
            .map(|e| e.pid)
            .collect();
        assert_eq!(pids, vec![1, 50, 300]);
    }

    #[test]
    fn test_collect_proc_entries_missing_root() {
        let root = tempdir().expect("Failed to create temp dir");
        assert!(collect_proc_entries(&root.path().join("nope")).is_err());
    }

    #[test]
    fn test_enumerate_processes_sorted_and_skips_failures() {
        let root = tempdir().expect("Failed to create temp dir");
        for pid in [900, 7, 120, 33] {
            write_proc(root.path(), pid, b"/bin/true\x00");
        }
        // vanished mid-scan: directory exists but files are gone
        fs::create_dir_all(root.path().join("64")).expect("mkdir");
        // malformed status
        let bad = root.path().join("65");
        fs::create_dir_all(&bad).expect("mkdir");
        fs::write(bad.join("cmdline"), b"x").expect("write");
        fs::write(bad.join("status"), "Name:\tx\n").expect("write");
        fs::write(bad.join("stat"), "65 (x) S").expect("write");

        let (records, stats) =
            enumerate_processes(root.path(), &UserTable::empty()).expect("scan succeeds");
        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![7, 33, 120, 900]);
        assert_eq!(stats.candidates, 6);
        assert_eq!(stats.vanished, 1);
        assert_eq!(stats.unreadable, 1);
    }

    #[test]
    fn test_enumerate_processes_keeps_non_utf8_names() {
        let root = tempdir().expect("Failed to create temp dir");
        let dir = root.path().join("77");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("cmdline"), b"").expect("write");
        fs::write(dir.join("status"), b"Name:\t\xffbad\nUid:\t0\t0\t0\t0\n".as_slice())
            .expect("write");
        fs::write(
            dir.join("stat"),
            b"77 (\xffbad) S 1 77 77 0 -1 0 0 0 0 0 1 1 0 0 20 0 1 0 1 1 1".as_slice(),
        )
        .expect("write");

        let (records, stats) =
            enumerate_processes(root.path(), &UserTable::empty()).expect("scan succeeds");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, 77);
        assert_eq!(stats.unreadable, 0);
    }
}
