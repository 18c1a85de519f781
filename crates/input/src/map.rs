//! Key mapping from terminal events to input events.

use crate::types::{Command, InputEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map a key press to an input event.
///
/// Release events are ignored so terminals that report both edges do not
/// double every move.
pub fn handle_key_event(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if should_quit(key) {
        return Some(InputEvent::Quit);
    }
    let command = match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => Command::Left,
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => Command::Right,
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => Command::Down,

        // Rotation
        KeyCode::Up | KeyCode::Char('k' | 'K' | 'w' | 'W') => Command::Rotate,

        KeyCode::Char(' ') | KeyCode::Enter => Command::HardDrop,

        KeyCode::Char('p' | 'P') | KeyCode::Esc => return Some(InputEvent::Pause),
        KeyCode::F(2) => return Some(InputEvent::SaveDemo),

        _ => return None,
    };
    Some(InputEvent::Command(command))
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
