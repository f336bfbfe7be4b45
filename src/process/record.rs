//! Process record types produced by every refresh.
//!
//! Records are built fresh on each scan and never patched afterwards; the
//! only field written after construction is `cpu_percent`, which needs the
//! previous scan to be computed.

use std::sync::Arc;

/// Whether a process runs user-space code or is a kernel thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    User,
    Kernel,
}

/// Resolved account owning a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    pub uid: u32,
    pub name: Arc<str>,
}

impl Owner {
    pub fn new(uid: u32, name: &str) -> Self {
        Self {
            uid,
            name: Arc::from(name),
        }
    }
}

/// One operating system process at sample time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Parent PID, used only as a lookup key when building the tree.
    pub parent_pid: Option<u32>,
    /// Effective UID as read from the status record.
    pub uid: u32,
    /// `None` when the UID does not map to an account.
    pub owner: Option<Owner>,
    /// Invocation with arguments joined by single spaces. Empty for kernel threads.
    pub command: String,
    pub rss_bytes: u64,
    pub cpu_time_seconds: f64,
    pub cpu_percent: f64,
}

impl ProcessRecord {
    /// Kind is derived from the command line and cannot disagree with it.
    pub fn kind(&self) -> ProcessKind {
        if self.command.is_empty() {
            ProcessKind::Kernel
        } else {
            ProcessKind::User
        }
    }

    pub fn is_kernel(&self) -> bool {
        self.kind() == ProcessKind::Kernel
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.name.as_ref())
    }
}
