//! Selection and scroll state for the process list.
//!
//! The selection follows a PID across snapshots. When that PID disappears
//! the row index is clamped instead.

use crate::intent::Navigation;
use crate::monitor::Snapshot;

/// Horizontal scroll step for left/right.
pub const HORIZONTAL_STEP: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    selected: usize,
    selected_pid: Option<u32>,
    /// First visible row.
    top: usize,
    /// Columns of the command text scrolled off to the left.
    offset_x: usize,
    /// Rows available for the list.
    height: usize,
    pids: Vec<u32>,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_pid
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn offset_x(&self) -> usize {
        self.offset_x
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Visible row range for the current rows.
    pub fn visible(&self) -> std::ops::Range<usize> {
        let end = (self.top + self.height).min(self.pids.len());
        self.top.min(end)..end
    }

    /// Adopts a new snapshot, re-locating the selection by PID.
    pub fn sync(&mut self, snapshot: &Snapshot) {
        self.pids = snapshot.pids();

        if let Some(idx) = self.selected_pid.and_then(|pid| snapshot.position_of(pid)) {
            self.selected = idx;
        }
        self.clamp();
    }

    /// Changes the list height, e.g. after a terminal resize.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    pub fn apply(&mut self, nav: Navigation) {
        let half_page = (self.height / 2).max(1);
        match nav {
            Navigation::Up => self.selected = self.selected.saturating_sub(1),
            Navigation::Down => self.selected = self.selected.saturating_add(1),
            Navigation::First => self.selected = 0,
            Navigation::Last => self.selected = self.pids.len().saturating_sub(1),
            Navigation::PageUp => self.selected = self.selected.saturating_sub(half_page),
            Navigation::PageDown => self.selected = self.selected.saturating_add(half_page),
            Navigation::Left => self.offset_x = self.offset_x.saturating_sub(HORIZONTAL_STEP),
            Navigation::Right => self.offset_x = self.offset_x.saturating_add(HORIZONTAL_STEP),
            Navigation::ResetOffset => self.offset_x = 0,
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.pids.is_empty() {
            self.selected = 0;
            self.top = 0;
            self.selected_pid = None;
            return;
        }

        self.selected = self.selected.min(self.pids.len() - 1);
        self.selected_pid = Some(self.pids[self.selected]);

        if self.height == 0 {
            self.top = self.selected;
            return;
        }
        if self.selected < self.top {
            self.top = self.selected;
        } else if self.selected >= self.top + self.height {
            self.top = self.selected + 1 - self.height;
        }
        // no blank space below the last row
        let max_top = self.pids.len().saturating_sub(self.height);
        self.top = self.top.min(max_top);
    }
}
