//! Reads one process from a procfs-style directory.
//!
//! Three records are consulted per PID: `cmdline` for the invocation,
//! `status` for ownership and parentage, and `stat` for CPU time.

use std::fs;
use std::io;
use std::path::Path;

use crate::process::cpu::parse_cpu_time_seconds;
use crate::process::record::ProcessRecord;
use crate::process::users::UserTable;

/// Per-process read failure. Neither variant aborts a scan.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("process {pid} exited before it could be read")]
    Vanished { pid: u32 },

    #[error("process {pid} is unreadable: {reason}")]
    Unreadable { pid: u32, reason: String },
}

impl ProcessError {
    fn from_io(pid: u32, err: io::Error) -> Self {
        // ESRCH shows up when the task is reaped while its files are open
        if err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(libc::ESRCH) {
            ProcessError::Vanished { pid }
        } else {
            ProcessError::Unreadable {
                pid,
                reason: err.to_string(),
            }
        }
    }

    fn malformed(pid: u32, what: &str) -> Self {
        ProcessError::Unreadable {
            pid,
            reason: format!("malformed {}", what),
        }
    }
}

/// Fields taken from `/proc/<pid>/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFields {
    pub effective_uid: u32,
    pub parent_pid: Option<u32>,
    pub rss_bytes: u64,
}

/// Joins NUL-separated arguments with single spaces.
///
/// Runs of separators collapse and trailing separators disappear, so the
/// result reads like something typed into a shell.
pub fn normalize_cmdline(raw: &[u8]) -> String {
    let joined = raw
        .split(|&b| b == 0u8)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ");
    joined.trim().to_string()
}

/// Parses the effective UID, parent PID and resident size from status text.
///
/// Returns `None` when there is no usable `Uid:` line.
pub fn parse_status(content: &str) -> Option<StatusFields> {
    let mut effective_uid = None;
    let mut parent_pid = None;
    let mut rss_kb = 0u64;

    for line in content.lines() {
        if line.starts_with("Uid:") {
            //       R     E     SS    FS
            // Uid:\t1000\t1000\t1000\t1000
            effective_uid = line.split('\t').nth(2).and_then(|v| v.trim().parse().ok());
        } else if let Some(v) = line.strip_prefix("PPid:") {
            parent_pid = v.trim().parse::<u32>().ok().filter(|&p| p > 0);
        } else if let Some(v) = line.strip_prefix("VmRSS:") {
            rss_kb = v
                .split_whitespace()
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
        }
    }

    Some(StatusFields {
        effective_uid: effective_uid?,
        parent_pid,
        rss_bytes: rss_kb * 1024,
    })
}

/// Reads bytes from `path`, replacing invalid UTF-8.
///
/// The kernel copies process names into `status` and `stat` verbatim.
fn read_lossy(path: &Path, pid: u32) -> Result<String, ProcessError> {
    let raw = fs::read(path).map_err(|e| ProcessError::from_io(pid, e))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Reads process `pid` from its directory `proc_path` into a fresh record.
pub fn read_process(
    proc_path: &Path,
    pid: u32,
    users: &UserTable,
) -> Result<ProcessRecord, ProcessError> {
    let raw_cmdline =
        fs::read(proc_path.join("cmdline")).map_err(|e| ProcessError::from_io(pid, e))?;
    let command = normalize_cmdline(&raw_cmdline);

    let status_text = read_lossy(&proc_path.join("status"), pid)?;
    let status =
        parse_status(&status_text).ok_or_else(|| ProcessError::malformed(pid, "status"))?;

    let stat_text = read_lossy(&proc_path.join("stat"), pid)?;
    let cpu_time_seconds =
        parse_cpu_time_seconds(&stat_text).map_err(|_| ProcessError::malformed(pid, "stat"))?;

    Ok(ProcessRecord {
        pid,
        parent_pid: status.parent_pid,
        uid: status.effective_uid,
        owner: users.resolve(status.effective_uid),
        command,
        rss_bytes: status.rss_bytes,
        cpu_time_seconds,
        cpu_percent: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::record::ProcessKind;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const STATUS: &str = "Name:\tbash\nUmask:\t0022\nState:\tS (sleeping)\nTgid:\t200\nPid:\t200\nPPid:\t1\nUid:\t1000\t1001\t1000\t1000\nGid:\t1000\t1000\t1000\t1000\nVmRSS:\t    5120 kB\n";
    const STAT: &str = "200 (bash) S 1 200 200 0 -1 4194304 100 0 0 0 250 150 0 0 20 0 1 0 12345 12345678 1234";

    fn write_proc(root: &Path, pid: u32, cmdline: &[u8], status: &str, stat: &str) -> PathBuf {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).expect("create pid dir");
        fs::write(dir.join("cmdline"), cmdline).expect("write cmdline");
        fs::write(dir.join("status"), status).expect("write status");
        fs::write(dir.join("stat"), stat).expect("write stat");
        dir
    }

    // -------------------------------------------------------------------------
    // Tests for normalize_cmdline
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalize_cmdline_joins_arguments() {
        assert_eq!(normalize_cmdline(b"/bin/sleep\x0010\x00"), "/bin/sleep 10");
    }

    #[test]
    fn test_normalize_cmdline_collapses_and_trims() {
        assert_eq!(normalize_cmdline(b"nginx: worker\x00\x00\x00\x00"), "nginx: worker");
        assert_eq!(normalize_cmdline(b"a\x00\x00b"), "a b");
        assert_eq!(normalize_cmdline(b""), "");
        assert_eq!(normalize_cmdline(b"\x00\x00"), "");
    }

    // -------------------------------------------------------------------------
    // Tests for parse_status
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_status_takes_effective_uid() {
        let fields = parse_status(STATUS).expect("status parses");
        assert_eq!(fields.effective_uid, 1001);
        assert_eq!(fields.parent_pid, Some(1));
        assert_eq!(fields.rss_bytes, 5120 * 1024);
    }

    #[test]
    fn test_parse_status_kernel_thread() {
        let status = "Name:\tkthreadd\nPPid:\t0\nUid:\t0\t0\t0\t0\n";
        let fields = parse_status(status).expect("status parses");
        assert_eq!(fields.effective_uid, 0);
        assert_eq!(fields.parent_pid, None);
        assert_eq!(fields.rss_bytes, 0);
    }

    #[test]
    fn test_parse_status_without_uid_line() {
        assert_eq!(parse_status("Name:\tx\nPPid:\t1\n"), None);
        assert_eq!(parse_status("Uid:\tbogus\n"), None);
    }

    // -------------------------------------------------------------------------
    // Tests for read_process
    // -------------------------------------------------------------------------

    #[test]
    fn test_read_process_user() {
        let root = tempdir().expect("Failed to create temp dir");
        let dir = write_proc(root.path(), 200, b"/bin/bash\x00-l\x00", STATUS, STAT);
        let users = UserTable::fixed([(1001, "alice")]);

        let record = read_process(&dir, 200, &users).expect("readable");
        assert_eq!(record.pid, 200);
        assert_eq!(record.command, "/bin/bash -l");
        assert_eq!(record.kind(), ProcessKind::User);
        assert_eq!(record.uid, 1001);
        assert_eq!(record.owner_name(), Some("alice"));
        assert_eq!(record.parent_pid, Some(1));
        assert!(record.cpu_time_seconds > 0.0);
    }

    #[test]
    fn test_read_process_kernel_with_unresolved_owner() {
        let root = tempdir().expect("Failed to create temp dir");
        let dir = write_proc(root.path(), 2, b"", "PPid:\t0\nUid:\t0\t0\t0\t0\n", STAT);
        let users = UserTable::empty();

        let record = read_process(&dir, 2, &users).expect("readable");
        assert!(record.is_kernel());
        assert_eq!(record.owner, None);
    }

    #[test]
    fn test_read_process_vanished() {
        let root = tempdir().expect("Failed to create temp dir");
        let users = UserTable::empty();
        let err = read_process(&root.path().join("999"), 999, &users).unwrap_err();
        assert!(matches!(err, ProcessError::Vanished { pid: 999 }));
    }

    #[test]
    fn test_read_process_malformed_status() {
        let root = tempdir().expect("Failed to create temp dir");
        let dir = write_proc(root.path(), 300, b"x\x00", "Name:\tx\n", STAT);
        let users = UserTable::empty();
        let err = read_process(&dir, 300, &users).unwrap_err();
        assert!(matches!(err, ProcessError::Unreadable { pid: 300, .. }));
    }

    #[test]
    fn test_read_process_name_not_utf8() {
        let root = tempdir().expect("Failed to create temp dir");
        let dir = root.path().join("77");
        fs::create_dir_all(&dir).expect("create pid dir");
        fs::write(dir.join("cmdline"), b"").expect("write cmdline");
        fs::write(
            dir.join("status"),
            b"Name:\t\xffbad\nPPid:\t1\nUid:\t0\t0\t0\t0\n".as_slice(),
        )
        .expect("write status");
        fs::write(
            dir.join("stat"),
            b"77 (\xffbad) S 1 77 77 0 -1 0 0 0 0 0 4 1 0 0 20 0 1 0 1 1 1".as_slice(),
        )
        .expect("write stat");

        let record = read_process(&dir, 77, &UserTable::empty()).expect("readable");
        assert_eq!(record.pid, 77);
        assert_eq!(record.parent_pid, Some(1));
        assert!((record.cpu_time_seconds - 5.0 / *crate::process::cpu::CLK_TCK).abs() < 0.001);
    }
}
