//! Player input state
//!
//! Device handlers never touch the player directly. They queue
//! [`InputEvent`]s on the scene, which folds them into an [`InputState`]
//! once per frame before entities update.

use serde::{Deserialize, Serialize};

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

impl Key {
    /// Map a browser-style key name to a logical key
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Space" | "Enter" => Some(Key::Fire),
            _ => None,
        }
    }
}

/// Discrete key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
}

/// Held directions plus the one-shot fire latch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Set by a Fire press, consumed by the frame's update pass
    pub fire: bool,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.set(key, true),
            InputEvent::KeyUp(key) => self.set(key, false),
        }
    }

    fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            // Releasing fire does not cancel a shot already requested
            Key::Fire => self.fire |= pressed,
        }
    }

    /// Clear one-shot inputs after the update pass
    pub(crate) fn end_frame(&mut self) {
        self.fire = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::default();
        input.apply(InputEvent::KeyDown(Key::Left));
        input.apply(InputEvent::KeyDown(Key::Up));
        assert!(input.left && input.up);
        input.apply(InputEvent::KeyUp(Key::Left));
        assert!(!input.left && input.up);
    }

    #[test]
    fn test_fire_latches_until_end_of_frame() {
        let mut input = InputState::default();
        input.apply(InputEvent::KeyDown(Key::Fire));
        input.apply(InputEvent::KeyUp(Key::Fire));
        assert!(input.fire);
        input.end_frame();
        assert!(!input.fire);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_key_name("ArrowUp"), Some(Key::Up));
        assert_eq!(Key::from_key_name(" "), Some(Key::Fire));
        assert_eq!(Key::from_key_name("q"), None);
    }
}
