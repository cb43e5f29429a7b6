use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard state polled by lessons while drawing.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a winit key event. Returns the key code when it has one.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<KeyCode> {
        let PhysicalKey::Code(key) = event.physical_key else {
            return None;
        };
        match event.state {
            ElementState::Pressed => self.press(key),
            ElementState::Released => self.release(key),
        }
        Some(key)
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if any of `keys` is held down.
    pub fn any_down(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| self.keys_down.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_hold_release() {
        let mut input = Input::new();
        input.press(KeyCode::KeyL);
        assert!(input.key_down(KeyCode::KeyL));

        input.press(KeyCode::KeyL); // auto-repeat
        assert!(input.key_down(KeyCode::KeyL));

        input.release(KeyCode::KeyL);
        assert!(!input.key_down(KeyCode::KeyL));
    }

    #[test]
    fn any_down_and_clear() {
        let mut input = Input::new();
        input.press(KeyCode::KeyI);
        assert!(input.any_down(&[KeyCode::Numpad8, KeyCode::KeyI]));
        input.clear();
        assert!(!input.any_down(&[KeyCode::Numpad8, KeyCode::KeyI]));
    }
}
