//! Keyboard bindings for the live preview.
//!
//! - `i` / `I`: ISO down / up
//! - `e` / `E`: exposure time down / up
//! - `b` / `B`: brightness down / up
//! - `c` or space: capture a snapshot
//! - `s`: toggle the status line
//! - `q`, Esc or Ctrl+C: quit

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::exposure::ControlKind;

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Move a control by `delta` positions
    Adjust { kind: ControlKind, delta: i64 },
    Capture,
    ToggleStatus,
    Quit,
    None,
}

/// Map a key event to an action. `step` is the positions moved per press.
pub fn handle_key_event(event: KeyEvent, step: u32) -> KeyAction {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return KeyAction::None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    let step = step as i64;
    let adjust = |kind, delta| KeyAction::Adjust { kind, delta };
    match code {
        KeyCode::Char('i') => adjust(ControlKind::Iso, -step),
        KeyCode::Char('I') => adjust(ControlKind::Iso, step),
        KeyCode::Char('e') => adjust(ControlKind::Exposure, -step),
        KeyCode::Char('E') => adjust(ControlKind::Exposure, step),
        KeyCode::Char('b') => adjust(ControlKind::Brightness, -step),
        KeyCode::Char('B') => adjust(ControlKind::Brightness, step),
        KeyCode::Char('c') | KeyCode::Char(' ') => KeyAction::Capture,
        KeyCode::Char('s') => KeyAction::ToggleStatus,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}
