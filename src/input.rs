use std::collections::HashSet;

use winit::keyboard::KeyCode;

/// Logical movement keys, decoupled from the physical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl Key {
    /// Arrow keys and WASD both drive movement.
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(Key::Forward),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(Key::Backward),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Key::TurnLeft),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Key::TurnRight),
            _ => None,
        }
    }
}

/// Set of logical keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    down: HashSet<Key>,
}

impl HeldKeys {
    pub fn press(&mut self, key: Key) {
        self.down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.down.remove(&key);
    }

    /// Drop everything, e.g. when the window loses focus mid-press.
    pub fn clear(&mut self) {
        self.down.clear();
    }

    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.down.contains(&key)
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            down: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_map_to_same_keys() {
        assert_eq!(Key::from_key_code(KeyCode::ArrowUp), Some(Key::Forward));
        assert_eq!(Key::from_key_code(KeyCode::KeyW), Some(Key::Forward));
        assert_eq!(Key::from_key_code(KeyCode::KeyA), Some(Key::TurnLeft));
        assert_eq!(Key::from_key_code(KeyCode::ArrowRight), Some(Key::TurnRight));
        assert_eq!(Key::from_key_code(KeyCode::Space), None);
    }

    #[test]
    fn press_release() {
        let mut keys = HeldKeys::default();
        keys.press(Key::Forward);
        keys.press(Key::Forward);
        assert!(keys.is_held(Key::Forward));
        keys.release(Key::Forward);
        assert!(!keys.is_held(Key::Forward));

        keys.press(Key::TurnLeft);
        keys.clear();
        assert_eq!(keys, HeldKeys::default());
    }
}
