//! Snapshot command implementation.
//!
//! Runs the monitor without a terminal and prints the final snapshot.

use std::time::Duration;

use jtop::monitor::{Monitor, ViewSettings};
use jtop::ui::render_plain;
use tracing::info;

/// Refreshes `iterations` times, `delay` apart, and returns the last snapshot
/// as a plain table. At least one refresh always happens.
pub async fn command_snapshot(
    monitor: &mut Monitor,
    view: &ViewSettings,
    delay: Duration,
    iterations: usize,
) -> anyhow::Result<String> {
    let iterations = iterations.max(1);
    for i in 0..iterations {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        monitor.refresh(view)?;
    }

    let snapshot = monitor.current_snapshot();
    info!(
        "Snapshot command finished after {} refreshes: {} rows",
        iterations,
        snapshot.len()
    );
    Ok(render_plain(&snapshot, view))
}
