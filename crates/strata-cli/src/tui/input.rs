//! Keyboard events to intents.
//!
//! The input layer knows nothing about application state; it emits a small
//! [`Intent`] that the app consumes under its own rules, which keeps the
//! key table and the state machine decoupled.

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    /// Cycle the mode behind a hotkey forward.
    Cycle(char),
    /// Cycle it backwards (shifted hotkey).
    CycleBack(char),
    /// Viewport movement: dx > 0 moves toward the present, dy > 0 scrolls
    /// down the row list.
    Scroll { dx: i32, dy: i32 },
    ResetScroll,
}

pub fn intent_for(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Intent::Quit),
        KeyCode::Char('0') => Some(Intent::ResetScroll),
        KeyCode::Up => Some(Intent::Scroll { dx: 0, dy: -1 }),
        KeyCode::Down => Some(Intent::Scroll { dx: 0, dy: 1 }),
        KeyCode::Left => Some(Intent::Scroll { dx: -1, dy: 0 }),
        KeyCode::Right => Some(Intent::Scroll { dx: 1, dy: 0 }),
        KeyCode::Char(c) if c.is_ascii_lowercase() => Some(Intent::Cycle(c)),
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            Some(Intent::CycleBack(c.to_ascii_lowercase()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn quit_keys() {
        assert_eq!(intent_for(key(KeyCode::Char('q'))), Some(Intent::Quit));
        assert_eq!(intent_for(key(KeyCode::Char('Q'))), Some(Intent::Quit));
        assert_eq!(intent_for(key(KeyCode::Esc)), Some(Intent::Quit));
    }

    #[test]
    fn hotkeys_cycle_and_shift_cycles_back() {
        assert_eq!(intent_for(key(KeyCode::Char('c'))), Some(Intent::Cycle('c')));
        assert_eq!(
            intent_for(key(KeyCode::Char('C'))),
            Some(Intent::CycleBack('c'))
        );
    }

    #[test]
    fn arrows_scroll() {
        assert_eq!(
            intent_for(key(KeyCode::Left)),
            Some(Intent::Scroll { dx: -1, dy: 0 })
        );
        assert_eq!(
            intent_for(key(KeyCode::Down)),
            Some(Intent::Scroll { dx: 0, dy: 1 })
        );
    }

    #[test]
    fn zero_resets_and_noise_is_ignored() {
        assert_eq!(intent_for(key(KeyCode::Char('0'))), Some(Intent::ResetScroll));
        assert_eq!(intent_for(key(KeyCode::Tab)), None);
        assert_eq!(intent_for(key(KeyCode::Char('1'))), None);
    }
}
