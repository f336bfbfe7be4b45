//! User intents and the terminal events that carry them.
//!
//! The key map lives here so the input thread sends already-decoded events;
//! the scheduler never sees raw key codes.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Viewport movements handled entirely by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Left,
    Right,
    Up,
    Down,
    First,
    Last,
    ResetOffset,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Navigate(Navigation),
    SortNext,
    SortPrev,
    ToggleTree,
    ToggleKernel,
    ToggleVerbose,
    Quit,
    Suspend,
}

impl Intent {
    /// Intents that change what the monitor produces and so need a refresh.
    pub fn forces_refresh(self) -> bool {
        matches!(
            self,
            Intent::SortNext | Intent::SortPrev | Intent::ToggleTree | Intent::ToggleKernel
        )
    }
}

/// One event delivered to the scheduler by the input thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Input(Intent),
    Resize { width: u16, height: u16 },
}

/// Maps a key press to an intent. Unbound keys map to `None`.
pub fn decode_key(key: KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let intent = match key.code {
        KeyCode::Char('c') if ctrl => Intent::Quit,
        KeyCode::Char('d') if ctrl => Intent::Navigate(Navigation::PageDown),
        KeyCode::Char('u') if ctrl => Intent::Navigate(Navigation::PageUp),
        KeyCode::Char('z') if ctrl => Intent::Suspend,
        _ if ctrl => return None,
        KeyCode::Char('q') => Intent::Quit,
        KeyCode::Char('h') | KeyCode::Left => Intent::Navigate(Navigation::Left),
        KeyCode::Char('j') | KeyCode::Down => Intent::Navigate(Navigation::Down),
        KeyCode::Char('k') | KeyCode::Up => Intent::Navigate(Navigation::Up),
        KeyCode::Char('l') | KeyCode::Right => Intent::Navigate(Navigation::Right),
        KeyCode::Char('0') | KeyCode::Char('^') => Intent::Navigate(Navigation::ResetOffset),
        KeyCode::Char('g') | KeyCode::Home => Intent::Navigate(Navigation::First),
        KeyCode::Char('G') | KeyCode::End => Intent::Navigate(Navigation::Last),
        KeyCode::PageDown => Intent::Navigate(Navigation::PageDown),
        KeyCode::PageUp => Intent::Navigate(Navigation::PageUp),
        KeyCode::Char('t') => Intent::ToggleTree,
        KeyCode::Char('K') => Intent::ToggleKernel,
        KeyCode::Char('v') => Intent::ToggleVerbose,
        KeyCode::Char('>') => Intent::SortNext,
        KeyCode::Char('<') => Intent::SortPrev,
        _ => return None,
    };
    Some(intent)
}

/// Maps a terminal event to a loop event, dropping everything else.
pub fn decode_event(event: Event) -> Option<LoopEvent> {
    match event {
        Event::Key(key) => decode_key(key).map(LoopEvent::Input),
        Event::Resize(width, height) => Some(LoopEvent::Resize { width, height }),
        _ => None,
    }
}
