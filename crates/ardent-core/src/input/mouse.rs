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

use crate::event::{MouseButton, MouseEventKind};
use crate::math::Vec2;
use std::collections::HashSet;

/// Mouse position, movement, buttons and wheel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseState {
    /// Cursor position in window pixels.
    pub position: Vec2,
    /// Movement since the previous motion event.
    pub delta: Vec2,
    /// Accumulated wheel scrolling.
    pub wheel: Vec2,
    buttons: HashSet<MouseButton>,
}

impl MouseState {
    /// Applies a mouse event.
    pub fn apply(&mut self, kind: &MouseEventKind) {
        match *kind {
            MouseEventKind::Moved { x, y } => {
                self.delta = Vec2::new(x - self.position.x, y - self.position.y);
                self.position = Vec2::new(x, y);
            }
            MouseEventKind::ButtonPressed(button) => {
                self.buttons.insert(button);
            }
            MouseEventKind::ButtonReleased(button) => {
                self.buttons.remove(&button);
            }
            MouseEventKind::Wheel { dx, dy } => {
                self.wheel = Vec2::new(self.wheel.x + dx, self.wheel.y + dy);
            }
        }
    }

    /// Whether `button` is held down.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_tracks_delta() {
        let mut state = MouseState::default();
        state.apply(&MouseEventKind::Moved { x: 10.0, y: 5.0 });
        state.apply(&MouseEventKind::Moved { x: 12.0, y: 4.0 });
        assert_eq!(state.position, Vec2::new(12.0, 4.0));
        assert_eq!(state.delta, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn buttons_and_wheel() {
        let mut state = MouseState::default();
        state.apply(&MouseEventKind::ButtonPressed(MouseButton::Right));
        assert!(state.is_pressed(MouseButton::Right));
        state.apply(&MouseEventKind::ButtonReleased(MouseButton::Right));
        assert!(!state.is_pressed(MouseButton::Right));

        state.apply(&MouseEventKind::Wheel { dx: 0.0, dy: 1.0 });
        state.apply(&MouseEventKind::Wheel { dx: 0.0, dy: 2.0 });
        assert_eq!(state.wheel.y, 3.0);
    }
}
