use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

/// Result of handling a key press.
pub enum KeyAction {
    Quit,
    AddChild,
    AddRoot,
    ToggleDone,
    Adjust(i32),
    ConfirmDelete,
    Refresh,
    Continue,
}

/// Handle a key press. Returns an action indicating what the event loop
/// should do; state-only changes are applied here directly.
pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if matches!(app.mode, Mode::Help) {
        app.mode = Mode::Normal;
        return KeyAction::Continue;
    }

    if matches!(app.mode, Mode::ConfirmDelete(_)) {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => KeyAction::ConfirmDelete,
            _ => {
                app.mode = Mode::Normal;
                KeyAction::Continue
            }
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            KeyAction::Continue
        }
        KeyCode::Char(' ') => {
            app.toggle_collapse();
            KeyAction::Continue
        }
        KeyCode::Char('a') => KeyAction::AddChild,
        KeyCode::Char('A') => KeyAction::AddRoot,
        KeyCode::Char('d') | KeyCode::Char('x') => KeyAction::ToggleDone,
        KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::Adjust(5),
        KeyCode::Char('-') => KeyAction::Adjust(-5),
        KeyCode::Char('D') => {
            app.request_delete();
            KeyAction::Continue
        }
        KeyCode::Char('r') => KeyAction::Refresh,
        KeyCode::Char('?') => {
            app.toggle_help();
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}
