use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Engine units covered by one terminal column
pub const UNITS_PER_COLUMN: f64 = 8.0;
/// Engine units covered by one terminal row (cells are about twice as tall as wide)
pub const UNITS_PER_ROW: f64 = 16.0;

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the current screen (quit from the month list)
    Quit,
    /// Keep the current photo
    Keep,
    /// Drop the current photo
    Drop,
    /// Undo the last decision
    Undo,
    /// Toggle help overlay
    Help,
    /// Move the selection up
    Up,
    /// Move the selection down
    Down,
    /// Flip keep/drop of the selected photo
    Toggle,
    /// Open the selected month or confirm the review
    Confirm,
    /// Show or hide months whose photos are all kept
    Filter,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Keep: Right arrow or k
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Keep,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Keep,

        // Drop: Left arrow or d
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Drop,
        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Drop,

        // Selection
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Down,
        (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Down,
        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::Toggle,
        (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::Toggle,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Confirm,
        (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Filter,

        // Undo: u or Ctrl+Z
        (KeyCode::Char('u'), KeyModifiers::NONE) => KeyAction::Undo,
        (KeyCode::Char('z'), KeyModifiers::CONTROL) => KeyAction::Undo,

        // Help: ? (some terminals report the shift)
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,
        (KeyCode::Char('?'), KeyModifiers::SHIFT) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Gesture step derived from a mouse event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Start { touches: usize },
    /// Offset from where the drag started, in engine units
    Move { dx: f64, dy: f64 },
    Release,
    Cancel,
    None,
}

/// Secondary buttons stand in for multi-finger touches
fn touches_for(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 2,
        MouseButton::Middle => 3,
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

/// Turns press/drag/release mouse events on a target area into drag gestures
#[derive(Debug, Default)]
pub struct PointerTracker {
    origin: Option<(u16, u16)>,
}

impl PointerTracker {
    pub fn handle(&mut self, event: MouseEvent, target: Rect) -> PointerAction {
        match event.kind {
            MouseEventKind::Down(button) => {
                if self.origin.is_some() || !contains(target, event.column, event.row) {
                    return PointerAction::None;
                }
                self.origin = Some((event.column, event.row));
                PointerAction::Start {
                    touches: touches_for(button),
                }
            }
            MouseEventKind::Drag(_) => match self.origin {
                Some((column, row)) => PointerAction::Move {
                    dx: (event.column as f64 - column as f64) * UNITS_PER_COLUMN,
                    dy: (event.row as f64 - row as f64) * UNITS_PER_ROW,
                },
                None => PointerAction::None,
            },
            MouseEventKind::Up(_) => match self.origin.take() {
                Some(_) => PointerAction::Release,
                None => PointerAction::None,
            },
            _ => PointerAction::None,
        }
    }

    /// Abandons the drag in progress, e.g. when the window loses focus
    pub fn cancel(&mut self) -> PointerAction {
        match self.origin.take() {
            Some(_) => PointerAction::Cancel,
            None => PointerAction::None,
        }
    }

    /// Forgets the drag without producing a gesture (it was not granted)
    pub fn reset(&mut self) {
        self.origin = None;
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_quit() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Quit);

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(key), KeyAction::Quit);

        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Quit);
    }

    #[test]
    fn test_key_keep_and_drop() {
        let key = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Keep);

        let key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Keep);

        let key = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Drop);

        let key = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Drop);
    }

    #[test]
    fn test_key_selection() {
        let key = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Down);

        let key = KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Up);

        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Toggle);

        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Confirm);

        let key = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Filter);
    }

    #[test]
    fn test_key_undo() {
        let key = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Undo);

        let key = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(key), KeyAction::Undo);
    }

    #[test]
    fn test_key_help() {
        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::Help);

        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(handle_key_event(key), KeyAction::Help);
    }

    #[test]
    fn test_key_none() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key), KeyAction::None);
    }

    #[test]
    fn test_pointer_drag_sequence() {
        let target = Rect::new(10, 5, 20, 10);
        let mut tracker = PointerTracker::default();

        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 15, 8), target),
            PointerAction::Start { touches: 1 }
        );
        assert!(tracker.is_active());
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Drag(MouseButton::Left), 18, 7), target),
            PointerAction::Move {
                dx: 3.0 * UNITS_PER_COLUMN,
                dy: -UNITS_PER_ROW,
            }
        );
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 18, 7), target),
            PointerAction::Release
        );
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_pointer_ignores_presses_outside_target() {
        let target = Rect::new(10, 5, 20, 10);
        let mut tracker = PointerTracker::default();

        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 2, 2), target),
            PointerAction::None
        );
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Drag(MouseButton::Left), 12, 6), target),
            PointerAction::None
        );
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 12, 6), target),
            PointerAction::None
        );
    }

    #[test]
    fn test_pointer_secondary_button_counts_as_multi_touch() {
        let target = Rect::new(0, 0, 10, 10);
        let mut tracker = PointerTracker::default();
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Down(MouseButton::Right), 1, 1), target),
            PointerAction::Start { touches: 2 }
        );
    }

    #[test]
    fn test_pointer_cancel_and_reset() {
        let target = Rect::new(0, 0, 10, 10);
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.cancel(), PointerAction::None);

        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), target);
        assert_eq!(tracker.cancel(), PointerAction::Cancel);

        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), target);
        tracker.reset();
        assert!(!tracker.is_active());
    }
}
