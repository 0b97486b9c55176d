// Keyboard input handling.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator. The dashboard has no local interaction state.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;

/// Map a key press to the command it triggers, if any.
pub fn handle_key(key_event: KeyEvent) -> Option<UserCommand> {
    // On Windows crossterm emits both Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Some(UserCommand::Quit),
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserCommand::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UserCommand::Refresh),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn q_quits() {
        assert_eq!(
            handle_key(press(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn r_refreshes() {
        assert_eq!(
            handle_key(press(KeyCode::Char('r'), KeyModifiers::NONE)),
            Some(UserCommand::Refresh)
        );
    }

    #[test]
    fn plain_c_and_ctrl_r_do_nothing() {
        assert_eq!(handle_key(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(handle_key(press(KeyCode::Char('r'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut event = press(KeyCode::Char('q'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(handle_key(event), None);
    }
}
