//! Terminal dashboard built on ratatui and crossterm.
//!
//! Drawing is split into pure formatting helpers (tested below) and the
//! [`TerminalUi`] that owns the terminal and the [`Viewport`].

use std::io::{self, Stdout};

use chrono::{DateTime, Local};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Cell, Paragraph, Row as TableRow, Table},
    Frame, Terminal,
};
use tracing::debug;

use crate::intent::Navigation;
use crate::monitor::{Snapshot, ViewSettings};
use crate::process::{ProcessRecord, Row, SortColumn};
use crate::scheduler::Renderer;
use crate::viewport::Viewport;

/// Lines above the list: the status header and the column titles.
const CHROME_LINES: u16 = 2;

const KERNEL_PLACEHOLDER: &str = "[kernel]";

/// Rows available for the process list on a terminal `height` lines tall.
pub fn list_height(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_LINES))
}

/// Formats a byte count with binary units, e.g. `12.3M`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}

/// Formats CPU seconds as `M:SS.hh`.
pub fn format_cpu_time(seconds: f64) -> String {
    let hundredths = (seconds.max(0.0) * 100.0).round() as u64;
    let minutes = hundredths / 6000;
    let secs = (hundredths / 100) % 60;
    format!("{}:{:02}.{:02}", minutes, secs, hundredths % 100)
}

/// Column titles with the active sort column marked.
pub fn column_titles(sort: SortColumn) -> Vec<String> {
    SortColumn::ALL
        .iter()
        .map(|&col| {
            if col == sort {
                format!("{}*", col.title())
            } else {
                col.title().to_string()
            }
        })
        .collect()
}

/// Command text for one row: tree indentation, then the full command line
/// (verbose) or the executable's basename, scrolled by `offset_x` characters.
pub fn display_command(row: &Row, verbose: bool, offset_x: usize) -> String {
    let record = &row.record;
    let text = if record.is_kernel() {
        KERNEL_PLACEHOLDER
    } else if verbose {
        record.command.as_str()
    } else {
        executable_name(&record.command)
    };

    let indent = if row.depth == 0 {
        String::new()
    } else {
        format!("{}└─ ", "  ".repeat(row.depth - 1))
    };

    format!("{}{}", indent, text)
        .chars()
        .skip(offset_x)
        .collect()
}

fn executable_name(command: &str) -> &str {
    let first = command.split(' ').next().unwrap_or(command);
    first.rsplit('/').next().unwrap_or(first)
}

/// The status line above the table.
pub fn format_header(snapshot: &Snapshot, view: &ViewSettings, now: DateTime<Local>) -> String {
    let mut modes = Vec::new();
    if view.tree {
        modes.push("tree");
    }
    if view.show_kernel {
        modes.push("kernel");
    }
    if view.verbose {
        modes.push("verbose");
    }

    let mut header = format!(
        "jtop - {} | {} processes | sort: {}",
        now.format("%H:%M:%S"),
        snapshot.len(),
        view.sort
    );
    if !modes.is_empty() {
        header.push_str(" | ");
        header.push_str(&modes.join(" "));
    }
    header
}

fn owner_cell(record: &ProcessRecord) -> String {
    match record.owner_name() {
        Some(name) => name.to_string(),
        None => record.uid.to_string(),
    }
}

fn table_row(row: &Row, view: &ViewSettings, offset_x: usize) -> Vec<String> {
    let record = &row.record;
    vec![
        record.pid.to_string(),
        owner_cell(record),
        format!("{:.1}", record.cpu_percent),
        format_bytes(record.rss_bytes),
        format_cpu_time(record.cpu_time_seconds),
        display_command(row, view.verbose, offset_x),
    ]
}

/// Renders the snapshot as plain text, one line per row.
pub fn render_plain(snapshot: &Snapshot, view: &ViewSettings) -> String {
    let mut out = format!(
        "{:>7} {:<10} {:>6} {:>8} {:>10} {}\n",
        "PID", "USER", "CPU%", "RSS", "TIME", "COMMAND"
    );
    for row in &snapshot.rows {
        let cells = table_row(row, view, 0);
        out.push_str(&format!(
            "{:>7} {:<10} {:>6} {:>8} {:>10} {}\n",
            cells[0], cells[1], cells[2], cells[3], cells[4], cells[5]
        ));
    }
    out
}

fn draw(frame: &mut Frame, snapshot: &Snapshot, view: &ViewSettings, viewport: &Viewport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.size());

    let header = Paragraph::new(format_header(snapshot, view, Local::now()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    let titles = TableRow::new(column_titles(view.sort).into_iter().map(Cell::from))
        .style(Style::default().fg(Color::Black).bg(Color::Green));

    let selected = viewport.selected();
    let visible = viewport.visible();
    let rows = snapshot.rows[visible.clone()]
        .iter()
        .zip(visible)
        .map(|(row, idx)| {
            let style = if idx == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            TableRow::new(table_row(row, view, viewport.offset_x())).style(style)
        });

    let widths = [
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths).header(titles).column_spacing(1);
    frame.render_widget(table, chunks[1]);
}

/// Full-screen renderer that owns the terminal while active.
pub struct TerminalUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    viewport: Viewport,
    active: bool,
}

impl TerminalUi {
    /// Takes over the terminal: raw mode plus the alternate screen.
    pub fn new() -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let height = list_height(terminal.size()?.height);
        let mut ui = Self {
            terminal,
            viewport: Viewport::new(height),
            active: false,
        };
        ui.acquire()?;
        Ok(ui)
    }
}

impl Renderer for TerminalUi {
    fn render(&mut self, snapshot: &Snapshot, view: &ViewSettings) -> io::Result<()> {
        self.viewport.sync(snapshot);
        let viewport = &self.viewport;
        self.terminal
            .draw(|frame| draw(frame, snapshot, view, viewport))?;
        Ok(())
    }

    fn navigate(&mut self, nav: Navigation) {
        self.viewport.apply(nav);
    }

    fn resize(&mut self, _width: u16, height: u16) {
        self.viewport.set_height(list_height(height));
    }

    fn release(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        self.active = false;
        debug!("Terminal released");
        Ok(())
    }

    fn acquire(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        // the screen content is unknown after a resume
        self.terminal.clear()?;
        self.active = true;
        debug!("Terminal acquired");
        Ok(())
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(pid: u32, depth: usize, command: &str) -> Row {
        Row {
            record: ProcessRecord {
                pid,
                parent_pid: None,
                uid: 1000,
                owner: None,
                command: command.to_string(),
                rss_bytes: 0,
                cpu_time_seconds: 0.0,
                cpu_percent: 0.0,
            },
            depth,
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1023), "1023B");
        assert_eq!(format_bytes(1024), "1.0K");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5M");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0G");
    }

    #[test]
    fn test_format_cpu_time() {
        assert_eq!(format_cpu_time(0.0), "0:00.00");
        assert_eq!(format_cpu_time(125.5), "2:05.50");
        assert_eq!(format_cpu_time(3600.0), "60:00.00");
    }

    #[test]
    fn test_column_titles_mark_sort_column() {
        let titles = column_titles(SortColumn::Rss);
        assert_eq!(titles, vec!["PID", "USER", "CPU%", "RSS*", "TIME", "COMMAND"]);
    }

    #[test]
    fn test_display_command_verbose_and_basename() {
        let r = row(1, 0, "/usr/bin/vim notes.txt");
        assert_eq!(display_command(&r, false, 0), "vim");
        assert_eq!(display_command(&r, true, 0), "/usr/bin/vim notes.txt");
        assert_eq!(display_command(&r, true, 9), "vim notes.txt");
        assert_eq!(display_command(&r, false, 50), "");
    }

    #[test]
    fn test_display_command_tree_indent() {
        assert_eq!(display_command(&row(2, 1, "bash"), false, 0), "└─ bash");
        assert_eq!(display_command(&row(3, 2, "vim"), false, 0), "  └─ vim");
        assert_eq!(display_command(&row(4, 0, ""), false, 0), KERNEL_PLACEHOLDER);
    }

    #[test]
    fn test_format_header() {
        let mut snap = Snapshot::empty(ViewSettings::default());
        snap.rows = vec![row(1, 0, "init"), row(2, 0, "sh")];
        let view = ViewSettings {
            tree: true,
            verbose: true,
            ..ViewSettings::default()
        };
        let now = Local
            .with_ymd_and_hms(2024, 1, 2, 9, 5, 7)
            .single()
            .expect("valid local time");
        assert_eq!(
            format_header(&snap, &view, now),
            "jtop - 09:05:07 | 2 processes | sort: CPU% | tree verbose"
        );
    }

    #[test]
    fn test_render_plain_lists_rows_in_order() {
        let mut snap = Snapshot::empty(ViewSettings::default());
        snap.rows = vec![row(10, 0, "init"), row(20, 1, "sh")];
        let text = render_plain(&snap, &ViewSettings::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("COMMAND"));
        assert!(lines[1].trim_start().starts_with("10"));
        assert!(lines[2].ends_with("└─ sh"));
        assert!(lines[2].contains("1000"));
    }
}
