// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::event::{Key, KeyAction, KeyboardKeyEvent};
use std::collections::HashSet;

/// State of the three lock keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggles {
    /// Caps lock is on.
    pub caps_lock: bool,
    /// Num lock is on.
    pub num_lock: bool,
    /// Scroll lock is on.
    pub scroll_lock: bool,
}

/// Currently pressed keys plus the toggle keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardState {
    pressed: HashSet<Key>,
    /// Lock-key toggles. Flipped on every non-repeated press.
    pub toggles: Toggles,
}

impl KeyboardState {
    /// Applies a key event.
    pub fn apply(&mut self, event: &KeyboardKeyEvent) {
        match event.action {
            KeyAction::Pressed => {
                if !event.repeat {
                    match event.key {
                        Key::CapsLock => self.toggles.caps_lock = !self.toggles.caps_lock,
                        Key::NumLock => self.toggles.num_lock = !self.toggles.num_lock,
                        Key::ScrollLock => self.toggles.scroll_lock = !self.toggles.scroll_lock,
                        _ => {}
                    }
                }
                self.pressed.insert(event.key);
            }
            KeyAction::Released => {
                self.pressed.remove(&event.key);
            }
        }
    }

    /// Whether `key` is held down.
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Iterates the held keys, in no particular order.
    pub fn pressed(&self) -> impl Iterator<Item = &Key> {
        self.pressed.iter()
    }

    /// Releases every key. Toggles are kept.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WindowId;

    fn key(key: Key, action: KeyAction, repeat: bool) -> KeyboardKeyEvent {
        KeyboardKeyEvent {
            window: WindowId(0),
            key,
            action,
            repeat,
        }
    }

    #[test]
    fn press_and_release() {
        let mut state = KeyboardState::default();
        state.apply(&key(Key::character('a'), KeyAction::Pressed, false));
        assert!(state.is_pressed(Key::Character('a')));
        state.apply(&key(Key::character('a'), KeyAction::Released, false));
        assert!(!state.is_pressed(Key::Character('a')));
    }

    #[test]
    fn toggles_flip_on_press_only() {
        let mut state = KeyboardState::default();
        state.apply(&key(Key::CapsLock, KeyAction::Pressed, false));
        state.apply(&key(Key::CapsLock, KeyAction::Pressed, true));
        state.apply(&key(Key::CapsLock, KeyAction::Released, false));
        assert!(state.toggles.caps_lock);

        state.apply(&key(Key::CapsLock, KeyAction::Pressed, false));
        assert!(!state.toggles.caps_lock);
        assert!(!state.toggles.num_lock);
    }
}
