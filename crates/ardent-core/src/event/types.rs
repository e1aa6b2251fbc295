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

use std::fmt;

/// Identifies a window across the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// A keyboard key, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, stored lower-case.
    Character(char),
    /// Space bar.
    Space,
    /// Return / enter.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Either shift key.
    Shift,
    /// Either control key.
    Control,
    /// Either alt key.
    Alt,
    /// Caps lock (a toggle key).
    CapsLock,
    /// Num lock (a toggle key).
    NumLock,
    /// Scroll lock (a toggle key).
    ScrollLock,
    /// Function key `F1`..`F24`.
    Function(u8),
    /// Anything else, by backend scancode.
    Other(u32),
}

impl Key {
    /// Builds a character key, normalizing to lower case.
    pub fn character(c: char) -> Self {
        Key::Character(c.to_ascii_lowercase())
    }
}

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// The key was pressed.
    Pressed,
    /// The key was released.
    Released,
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardKeyEvent {
    /// Window that had focus.
    pub window: WindowId,
    /// The key.
    pub key: Key,
    /// Press or release.
    pub action: KeyAction,
    /// Set for auto-repeated presses.
    pub repeat: bool,
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Right button.
    Right,
    /// Middle button / wheel click.
    Middle,
    /// Any extra button, by index.
    Other(u8),
}

/// What happened to the mouse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEventKind {
    /// The cursor moved to `(x, y)` in window pixels.
    Moved {
        /// New x position.
        x: f32,
        /// New y position.
        y: f32,
    },
    /// A button went down.
    ButtonPressed(MouseButton),
    /// A button went up.
    ButtonReleased(MouseButton),
    /// The wheel scrolled.
    Wheel {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
}

/// A mouse event.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Window under the cursor.
    pub window: WindowId,
    /// The event payload.
    pub kind: MouseEventKind,
}

/// What happened to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    /// The user asked to close the window.
    CloseRequested,
    /// The drawable area changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The window moved on screen.
    Moved {
        /// New x position.
        x: i32,
        /// New y position.
        y: i32,
    },
    /// Keyboard focus gained.
    FocusGained,
    /// Keyboard focus lost.
    FocusLost,
    /// Minimized.
    Minimized,
    /// Restored from minimized/maximized.
    Restored,
}

/// A window state change.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    /// The affected window.
    pub window: WindowId,
    /// The event payload.
    pub kind: WindowEventKind,
}

/// An application-defined event.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    /// Channel number; layers filter on it.
    pub channel: u32,
    /// Event type inside the channel.
    pub kind: u32,
    /// Opaque payload.
    pub payload: Vec<u8>,
}

/// The channel an event travels on. Layers use it to filter what they handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    /// Window events.
    Window,
    /// Keyboard events.
    Keyboard,
    /// Mouse events.
    Mouse,
    /// Application-defined channel.
    Custom(u32),
}

/// Every event a [`LayerStack`](crate::layer::LayerStack) can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A window state change.
    Window(WindowEvent),
    /// A keyboard key event.
    Keyboard(KeyboardKeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// An application-defined event.
    Custom(CustomEvent),
}

impl Event {
    /// The channel this event travels on.
    pub fn channel(&self) -> EventChannel {
        match self {
            Event::Window(_) => EventChannel::Window,
            Event::Keyboard(_) => EventChannel::Keyboard,
            Event::Mouse(_) => EventChannel::Mouse,
            Event::Custom(c) => EventChannel::Custom(c.channel),
        }
    }

    /// The window this event refers to, if any.
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Event::Window(e) => Some(e.window),
            Event::Keyboard(e) => Some(e.window),
            Event::Mouse(e) => Some(e.window),
            Event::Custom(_) => None,
        }
    }

    /// Shorthand for a key event.
    pub fn key(window: WindowId, key: Key, action: KeyAction) -> Self {
        Event::Keyboard(KeyboardKeyEvent {
            window,
            key,
            action,
            repeat: false,
        })
    }

    /// Shorthand for a mouse event.
    pub fn mouse(window: WindowId, kind: MouseEventKind) -> Self {
        Event::Mouse(MouseEvent { window, kind })
    }

    /// Shorthand for a window event.
    pub fn window_event(window: WindowId, kind: WindowEventKind) -> Self {
        Event::Window(WindowEvent { window, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_follow_the_variant() {
        let w = WindowId(3);
        assert_eq!(
            Event::key(w, Key::Space, KeyAction::Pressed).channel(),
            EventChannel::Keyboard
        );
        assert_eq!(
            Event::mouse(w, MouseEventKind::Wheel { dx: 0.0, dy: 1.0 }).channel(),
            EventChannel::Mouse
        );
        let custom = Event::Custom(CustomEvent {
            channel: 9,
            kind: 1,
            payload: vec![],
        });
        assert_eq!(custom.channel(), EventChannel::Custom(9));
        assert_eq!(custom.window(), None);
    }

    #[test]
    fn character_keys_are_lower_case() {
        assert_eq!(Key::character('W'), Key::Character('w'));
    }
}
