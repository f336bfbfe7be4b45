//! Column registry and record ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::process::record::ProcessRecord;

/// A sortable column. [`SortColumn::ALL`] is the complete registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    Pid,
    User,
    #[default]
    Cpu,
    Rss,
    Time,
    Command,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::Pid,
        SortColumn::User,
        SortColumn::Cpu,
        SortColumn::Rss,
        SortColumn::Time,
        SortColumn::Command,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::User => "USER",
            SortColumn::Cpu => "CPU%",
            SortColumn::Rss => "RSS",
            SortColumn::Time => "TIME",
            SortColumn::Command => "COMMAND",
        }
    }

    pub fn from_title(title: &str) -> Option<SortColumn> {
        Self::ALL.into_iter().find(|c| c.title() == title)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }

    pub fn next(self) -> SortColumn {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> SortColumn {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Compares by this column's key only.
    ///
    /// PID ascends; CPU%, RSS and TIME descend; text columns are lexical with
    /// unresolved owners last.
    pub fn compare_key(self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        match self {
            SortColumn::Pid => a.pid.cmp(&b.pid),
            SortColumn::User => match (a.owner_name(), b.owner_name()) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortColumn::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
            SortColumn::Rss => b.rss_bytes.cmp(&a.rss_bytes),
            SortColumn::Time => b.cpu_time_seconds.total_cmp(&a.cpu_time_seconds),
            SortColumn::Command => a.command.cmp(&b.command),
        }
    }

    /// Total order: the column key, then ascending PID.
    pub fn compare(self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        self.compare_key(a, b).then_with(|| a.pid.cmp(&b.pid))
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Error returned for a column name not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid sort column")]
pub struct UnknownColumn(pub String);

impl FromStr for SortColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::from_title(s).ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// Sorts records in place by `column`, ties broken by ascending PID.
pub fn sort_processes(records: &mut [ProcessRecord], column: SortColumn) {
    records.sort_by(|a, b| column.compare(a, b));
}
