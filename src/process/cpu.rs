//! CPU time parsing and CPU share tracking.
//!
//! This module parses cumulative CPU time from `/proc/<pid>/stat` and turns
//! consecutive samples into a CPU share per process.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use std::time::Instant;

use crate::process::record::ProcessRecord;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    100.0
}

/// System clock ticks per second (for CPU time calculation).
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// Parses total CPU time (user+system) in seconds from the contents of a stat record.
///
/// The command name in field 2 may contain spaces and parentheses, so fields
/// are counted from the last closing parenthesis.
pub fn parse_cpu_time_seconds(content: &str) -> Result<f64, std::io::Error> {
    let rest = content
        .rfind(')')
        .map(|idx| &content[idx + 1..])
        .ok_or_else(|| std::io::Error::other("Invalid stat format"))?;

    // rest starts at field 3 (state); utime is field 14, stime field 15
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() <= 12 {
        return Err(std::io::Error::other("Invalid stat format"));
    }

    let utime: f64 = parts[11]
        .parse()
        .map_err(|_| std::io::Error::other("Failed to parse utime field"))?;
    let stime: f64 = parts[12]
        .parse()
        .map_err(|_| std::io::Error::other("Failed to parse stime field"))?;

    Ok((utime + stime) / *CLK_TCK)
}

/// Cumulative CPU time of one process at one instant.
#[derive(Debug, Clone, Copy)]
struct CpuSample {
    cpu_time_seconds: f64,
    taken_at: Instant,
}

/// Remembers the previous sample per PID to compute CPU share deltas.
#[derive(Default)]
pub struct CpuTracker {
    samples: HashMap<u32, CpuSample>,
}

impl CpuTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `cpu_percent` for every record and replaces the stored samples.
    ///
    /// PIDs without a previous sample get 0. Samples of PIDs missing from
    /// `records` are dropped.
    pub fn update(&mut self, records: &mut [ProcessRecord], now: Instant) {
        let mut next = HashMap::with_capacity(records.len());

        for record in records.iter_mut() {
            record.cpu_percent = match self.samples.get(&record.pid) {
                Some(prev) => cpu_percent(prev, record.cpu_time_seconds, now),
                None => 0.0,
            };
            next.insert(
                record.pid,
                CpuSample {
                    cpu_time_seconds: record.cpu_time_seconds,
                    taken_at: now,
                },
            );
        }

        self.samples = next;
    }

    pub fn tracked(&self) -> usize {
        self.samples.len()
    }
}

fn cpu_percent(prev: &CpuSample, cpu_time_seconds: f64, now: Instant) -> f64 {
    let dt = now.duration_since(prev.taken_at).as_secs_f64();
    if dt <= 0.0 {
        return 0.0;
    }
    let delta_cpu = cpu_time_seconds - prev.cpu_time_seconds;
    if delta_cpu > 0.0 {
        (delta_cpu / dt) * 100.0
    } else {
        0.0
    }
}
