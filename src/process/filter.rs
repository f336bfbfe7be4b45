//! Classification and allow-list filtering of process records.
//!
//! A record survives when every active predicate accepts it: kernel threads
//! only when kernel visibility is on, and membership in each non-empty
//! allow-list.

use ahash::AHashSet as HashSet;

use crate::process::record::{Owner, ProcessRecord};

/// Allow-lists fixed at startup and consulted read-only on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    pids: HashSet<u32>,
    /// UIDs of the resolved allowed accounts.
    uids: HashSet<u32>,
}

impl Whitelist {
    pub fn new<P, U>(pids: P, users: U) -> Self
    where
        P: IntoIterator<Item = u32>,
        U: IntoIterator<Item = Owner>,
    {
        Self {
            pids: pids.into_iter().collect(),
            uids: users.into_iter().map(|o| o.uid).collect(),
        }
    }

    pub fn allows_pid(&self, pid: u32) -> bool {
        self.pids.is_empty() || self.pids.contains(&pid)
    }

    /// An unresolved owner never matches a non-empty user list.
    pub fn allows_owner(&self, owner: Option<&Owner>) -> bool {
        if self.uids.is_empty() {
            return true;
        }
        owner.is_some_and(|o| self.uids.contains(&o.uid))
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty() && self.uids.is_empty()
    }
}

/// Determines if a process should be included based on visibility and allow-lists.
pub fn should_include_process(
    record: &ProcessRecord,
    whitelist: &Whitelist,
    show_kernel: bool,
) -> bool {
    if record.is_kernel() && !show_kernel {
        return false;
    }
    whitelist.allows_pid(record.pid) && whitelist.allows_owner(record.owner.as_ref())
}

/// Keeps the records accepted by [`should_include_process`], preserving order.
pub fn filter_processes(
    records: Vec<ProcessRecord>,
    whitelist: &Whitelist,
    show_kernel: bool,
) -> Vec<ProcessRecord> {
    records
        .into_iter()
        .filter(|r| should_include_process(r, whitelist, show_kernel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, command: &str, owner: Option<Owner>) -> ProcessRecord {
        ProcessRecord {
            pid,
            parent_pid: None,
            uid: owner.as_ref().map(|o| o.uid).unwrap_or(65534),
            owner,
            command: command.to_string(),
            rss_bytes: 0,
            cpu_time_seconds: 0.0,
            cpu_percent: 0.0,
        }
    }

    fn alice() -> Owner {
        Owner::new(1000, "alice")
    }

    fn bob() -> Owner {
        Owner::new(1001, "bob")
    }

    fn sample() -> Vec<ProcessRecord> {
        vec![
            record(1, "/sbin/init", Some(Owner::new(0, "root"))),
            record(50, "", Some(Owner::new(0, "root"))),
            record(200, "vim notes.txt", Some(alice())),
            record(300, "htop", Some(bob())),
        ]
    }

    fn pids(records: &[ProcessRecord]) -> Vec<u32> {
        records.iter().map(|r| r.pid).collect()
    }

    // -------------------------------------------------------------------------
    // Tests for should_include_process / filter_processes
    // -------------------------------------------------------------------------

    #[test]
    fn test_no_filters_hides_kernel_only() {
        let out = filter_processes(sample(), &Whitelist::default(), false);
        assert_eq!(pids(&out), vec![1, 200, 300]);
    }

    #[test]
    fn test_kernel_visibility() {
        let out = filter_processes(sample(), &Whitelist::default(), true);
        assert_eq!(pids(&out), vec![1, 50, 200, 300]);
    }

    #[test]
    fn test_user_whitelist_without_kernel() {
        let whitelist = Whitelist::new([], [alice()]);
        let out = filter_processes(sample(), &whitelist, false);
        assert_eq!(pids(&out), vec![200]);
    }

    #[test]
    fn test_pid_whitelist() {
        let whitelist = Whitelist::new([300, 50, 7], []);
        assert_eq!(pids(&filter_processes(sample(), &whitelist, false)), vec![300]);
        assert_eq!(pids(&filter_processes(sample(), &whitelist, true)), vec![50, 300]);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let whitelist = Whitelist::new([200, 300], [bob()]);
        let out = filter_processes(sample(), &whitelist, true);
        assert_eq!(pids(&out), vec![300]);
        for r in &out {
            assert!(whitelist.allows_pid(r.pid));
            assert!(whitelist.allows_owner(r.owner.as_ref()));
        }
    }

    #[test]
    fn test_unresolved_owner_never_matches_user_list() {
        let whitelist = Whitelist::new([], [alice()]);
        let orphan = record(400, "daemon", None);
        assert!(!should_include_process(&orphan, &whitelist, true));
        assert!(should_include_process(&orphan, &Whitelist::default(), true));
    }
}
