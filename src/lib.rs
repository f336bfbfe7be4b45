//! jtop process monitor library
//!
//! This library provides the engine behind the `jtop` dashboard: sampling the
//! process table into immutable snapshots and driving refresh and rendering
//! from a single event loop. It is terminal-agnostic at its core; the
//! [`scheduler::Renderer`] trait is the seam where a terminal plugs in.
//!
//! # Features
//!
//! - **Process Sampling**: Reads `/proc/<pid>/{cmdline,status,stat}` in parallel
//! - **Filtering**: Kernel thread visibility plus PID and user allow-lists
//! - **Ordering**: Column sort with PID tie-breaking, optional parent/child tree
//! - **CPU Share**: Per-process CPU% from cumulative time between refreshes
//! - **Event Loop**: Timer, keyboard and resize events merged into one consumer
//!
//! # Usage
//!
//! ```rust,no_run
//! use jtop::monitor::{Monitor, ViewSettings};
//! use jtop::process::Whitelist;
//!
//! let mut monitor = Monitor::new(Whitelist::default());
//! monitor.refresh(&ViewSettings::default())?;
//!
//! for row in &monitor.current_snapshot().rows {
//!     println!("{:>7} {}", row.record.pid, row.record.command);
//! }
//! # Ok::<(), jtop::monitor::MonitorError>(())
//! ```

pub mod cli;
pub mod config;
pub mod input;
pub mod intent;
pub mod monitor;
pub mod process;
pub mod scheduler;
pub mod ui;
pub mod viewport;

// Re-export main types for convenience
pub use config::{ConfigError, Settings};
pub use intent::{Intent, LoopEvent, Navigation};
pub use monitor::{Monitor, MonitorError, Snapshot, ViewSettings};
pub use scheduler::{Renderer, Scheduler, SchedulerError};
pub use viewport::Viewport;
