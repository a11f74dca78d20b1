use std::collections::HashMap;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::constants::KEY_HOLD_MS;

/// Directional keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Space: pause toggle or restart.
    Action,
    Move { direction: Direction, pressed: bool },
    Resize(u16, u16),
    FocusLost,
}

pub fn translate(event: &Event) -> Option<Command> {
    match event {
        Event::Key(KeyEvent { code, modifiers, kind, .. }) => {
            let pressed = matches!(kind, KeyEventKind::Press | KeyEventKind::Repeat);
            match code {
                KeyCode::Esc if *kind != KeyEventKind::Release => Some(Command::Quit),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
                KeyCode::Char(' ') if *kind == KeyEventKind::Press => Some(Command::Action),
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                    Some(Command::Move { direction: Direction::Left, pressed })
                }
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                    Some(Command::Move { direction: Direction::Right, pressed })
                }
                _ => None,
            }
        }
        Event::Resize(cols, rows) => Some(Command::Resize(*cols, *rows)),
        Event::FocusLost => Some(Command::FocusLost),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Latch {
    down: bool,
    remaining_ms: u64,
}

/// Held-key state built from key events. Terminals that report releases give
/// exact state; otherwise each press or auto-repeat holds the key briefly.
pub struct KeyTracker {
    reports_release: bool,
    left: Latch,
    right: Latch,
}

impl KeyTracker {
    pub fn new(reports_release: bool) -> Self {
        KeyTracker { reports_release, left: Latch::default(), right: Latch::default() }
    }

    pub fn set(&mut self, direction: Direction, pressed: bool) {
        let latch = match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        latch.down = pressed;
        latch.remaining_ms = if pressed { KEY_HOLD_MS } else { 0 };
    }

    /// Lets unrefreshed presses expire when releases are never reported.
    pub fn advance(&mut self, dt_ms: u64) {
        if self.reports_release {
            return;
        }
        for latch in [&mut self.left, &mut self.right] {
            latch.remaining_ms = latch.remaining_ms.saturating_sub(dt_ms);
            if latch.remaining_ms == 0 {
                latch.down = false;
            }
        }
    }

    pub fn release_all(&mut self) {
        self.left = Latch::default();
        self.right = Latch::default();
    }

    pub fn state(&self) -> InputState {
        InputState { left: self.left.down, right: self.right.down }
    }
}

// --- SimulatedInput for headless runs ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// Scripted events for `frame`, each delivered once.
    pub fn drain(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
    }

    #[test]
    fn maps_both_bindings_per_direction() {
        for code in [KeyCode::Left, KeyCode::Char('a')] {
            assert_eq!(
                translate(&key(code, KeyEventKind::Press)),
                Some(Command::Move { direction: Direction::Left, pressed: true })
            );
        }
        for code in [KeyCode::Right, KeyCode::Char('d')] {
            assert_eq!(
                translate(&key(code, KeyEventKind::Release)),
                Some(Command::Move { direction: Direction::Right, pressed: false })
            );
        }
    }

    #[test]
    fn quit_and_action_keys() {
        assert_eq!(translate(&key(KeyCode::Esc, KeyEventKind::Press)), Some(Command::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(&ctrl_c), Some(Command::Quit));
        assert_eq!(translate(&key(KeyCode::Char('c'), KeyEventKind::Press)), None);

        assert_eq!(translate(&key(KeyCode::Char(' '), KeyEventKind::Press)), Some(Command::Action));
        assert_eq!(translate(&key(KeyCode::Char(' '), KeyEventKind::Repeat)), None);
        assert_eq!(translate(&key(KeyCode::Char(' '), KeyEventKind::Release)), None);
        assert_eq!(translate(&Event::Resize(100, 40)), Some(Command::Resize(100, 40)));
        assert_eq!(translate(&Event::FocusLost), Some(Command::FocusLost));
        assert_eq!(translate(&Event::FocusGained), None);
    }

    #[test]
    fn tracker_with_releases_holds_until_release() {
        let mut tracker = KeyTracker::new(true);
        tracker.set(Direction::Left, true);
        tracker.advance(10_000);
        assert_eq!(tracker.state(), InputState { left: true, right: false });
        tracker.set(Direction::Left, false);
        assert_eq!(tracker.state(), InputState::default());
    }

    #[test]
    fn tracker_without_releases_expires_presses() {
        let mut tracker = KeyTracker::new(false);
        tracker.set(Direction::Right, true);
        tracker.advance(KEY_HOLD_MS - 1);
        assert!(tracker.state().right);
        tracker.set(Direction::Right, true);
        tracker.advance(KEY_HOLD_MS - 1);
        assert!(tracker.state().right);
        tracker.advance(1);
        assert!(!tracker.state().right);
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut tracker = KeyTracker::new(true);
        tracker.set(Direction::Left, true);
        tracker.set(Direction::Right, true);
        tracker.release_all();
        assert_eq!(tracker.state(), InputState::default());
    }

    #[test]
    fn simulated_input_delivers_once() {
        let mut script = HashMap::new();
        script.insert(3, vec![key(KeyCode::Char(' '), KeyEventKind::Press), key(KeyCode::Left, KeyEventKind::Press)]);
        let mut input = SimulatedInput::new(script);
        assert!(input.drain(2).is_empty());
        assert_eq!(input.drain(3).len(), 2);
        assert!(input.drain(3).is_empty());
    }
}
