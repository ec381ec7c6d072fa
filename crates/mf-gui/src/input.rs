//! Input abstraction for keyboard and mouse events.
//!
//! Each frame the window is polled once into a [`FrameInput`]: discrete
//! events for screens to react to, plus the movement keys currently held.

use macroquad::prelude::*;
use mf_simulation::MoveInput;

use crate::theme::mouse_canvas_position;

/// Named keys the screens care about. Printable characters arrive as
/// [`InputEvent::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Enter or keypad enter.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
}

/// One discrete input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A named key went down.
    Key(Key),
    /// A printable character was typed.
    Char(char),
    /// Left click at a virtual canvas position.
    Click {
        /// Canvas x.
        x: f32,
        /// Canvas y.
        y: f32,
    },
    /// The window asked to close.
    Quit,
}

impl InputEvent {
    /// Whether this counts as "press any key".
    pub fn is_keypress(&self) -> bool {
        matches!(self, Self::Key(_) | Self::Char(_))
    }

    /// The character, case-folded, if this is a typed character.
    pub fn char_lower(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// Everything read from the window in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Events in arrival order.
    pub events: Vec<InputEvent>,
    /// Movement keys held down (WASD or arrows).
    pub held: MoveInput,
    /// Mouse position on the virtual canvas.
    pub mouse: (f32, f32),
}

impl FrameInput {
    /// Input made of the given events, nothing held.
    pub fn from_events(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Input with only movement keys held.
    pub fn holding(held: MoveInput) -> Self {
        Self {
            held,
            ..Self::default()
        }
    }
}

const KEY_MAP: &[(KeyCode, Key)] = &[
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::KpEnter, Key::Enter),
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Backspace, Key::Backspace),
];

fn any_down(codes: &[KeyCode]) -> bool {
    codes.iter().any(|code| is_key_down(*code))
}

/// Read this frame's input from the window.
pub fn poll() -> FrameInput {
    let mut events = Vec::new();

    for (code, key) in KEY_MAP {
        if is_key_pressed(*code) {
            events.push(InputEvent::Key(*key));
        }
    }
    while let Some(ch) = get_char_pressed() {
        // Filter control characters but keep printable ones
        if (' '..='~').contains(&ch) {
            events.push(InputEvent::Char(ch));
        }
    }
    let mouse = mouse_canvas_position();
    if is_mouse_button_pressed(MouseButton::Left) {
        events.push(InputEvent::Click {
            x: mouse.0,
            y: mouse.1,
        });
    }
    if is_quit_requested() {
        events.push(InputEvent::Quit);
    }

    let held = MoveInput {
        left: any_down(&[KeyCode::A, KeyCode::Left]),
        right: any_down(&[KeyCode::D, KeyCode::Right]),
        up: any_down(&[KeyCode::W, KeyCode::Up]),
        down: any_down(&[KeyCode::S, KeyCode::Down]),
    };

    FrameInput {
        events,
        held,
        mouse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypress_classification() {
        assert!(InputEvent::Key(Key::Escape).is_keypress());
        assert!(InputEvent::Char('x').is_keypress());
        assert!(!InputEvent::Click { x: 0.0, y: 0.0 }.is_keypress());
        assert!(!InputEvent::Quit.is_keypress());
        assert_eq!(InputEvent::Char('E').char_lower(), Some('e'));
        assert_eq!(InputEvent::Key(Key::Enter).char_lower(), None);
    }
}
