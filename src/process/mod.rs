//! Process-related modules for reading, filtering and ordering processes.
//!
//! This module provides:
//! - `record`: The per-process record type
//! - `reader`: Reading one PID's cmdline, status and stat records
//! - `scanner`: Process discovery under a procfs root
//! - `users`: UID to account resolution
//! - `cpu`: CPU time parsing and CPU share tracking
//! - `filter`: Kernel visibility and allow-list filtering
//! - `sort`: Column registry and ordering
//! - `tree`: Parent/child forest flattening

pub mod cpu;
pub mod filter;
pub mod reader;
pub mod record;
pub mod scanner;
pub mod sort;
pub mod tree;
pub mod users;

// Re-export commonly used types
pub use cpu::{parse_cpu_time_seconds, CpuTracker, CLK_TCK};
pub use filter::{filter_processes, should_include_process, Whitelist};
pub use reader::{normalize_cmdline, parse_status, read_process, ProcessError};
pub use record::{Owner, ProcessKind, ProcessRecord};
pub use scanner::{collect_proc_entries, enumerate_processes, parse_pid, ScanStats};
pub use sort::{sort_processes, SortColumn, UnknownColumn};
pub use tree::{flat_rows, flatten_tree, Row};
pub use users::{lookup_user_by_name, UserTable};
