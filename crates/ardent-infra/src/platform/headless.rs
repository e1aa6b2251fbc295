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

//! A windowless [`OsWindow`] driven through a channel.
//!
//! Tests and tools push [`HeadlessInput`] through a [`HeadlessHandle`]; the platform
//! event pump picks it up on its next poll, translated into engine events.

use ardent_core::event::{Event, Key, KeyAction, MouseButton, MouseEventKind, WindowEventKind, WindowId};
use ardent_core::platform::{OsWindow, WindowSettings};
use std::sync::{Arc, Mutex};

/// Raw input a headless window turns into engine events.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessInput {
    /// A key changed state.
    Key {
        /// The key.
        key: Key,
        /// Pressed or released.
        action: KeyAction,
        /// Whether this is an auto-repeat.
        repeat: bool,
    },
    /// The cursor moved to `(x, y)`.
    CursorMoved {
        /// Horizontal position in pixels.
        x: f32,
        /// Vertical position in pixels.
        y: f32,
    },
    /// A mouse button changed state.
    MouseButton {
        /// The button.
        button: MouseButton,
        /// Whether it went down.
        pressed: bool,
    },
    /// The wheel scrolled.
    Wheel {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// The user resized the window.
    Resized(u32, u32),
    /// Keyboard focus changed.
    Focus(bool),
    /// The user asked to close the window.
    CloseRequested,
}

#[derive(Debug, Default)]
struct HeadlessState {
    open: bool,
    size: (u32, u32),
    position: (i32, i32),
    cursor: (f32, f32),
    captured: bool,
    opens: u32,
}

/// A window that exists only in memory.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Arc<Mutex<HeadlessState>>,
    input: flume::Receiver<HeadlessInput>,
    sender: flume::Sender<HeadlessInput>,
    refuse_open: bool,
}

impl HeadlessWindow {
    /// Creates a closed window. The engine opens it.
    pub fn new() -> Self {
        let (sender, input) = flume::unbounded();
        Self {
            state: Arc::default(),
            input,
            sender,
            refuse_open: false,
        }
    }

    /// A window whose `open` always fails, as if the OS refused.
    pub fn refusing() -> Self {
        Self {
            refuse_open: true,
            ..Self::new()
        }
    }

    /// A handle for feeding input and inspecting the window from other threads.
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            state: Arc::clone(&self.state),
            sender: self.sender.clone(),
        }
    }

    fn translate(&self, input: HeadlessInput, window: WindowId) -> Option<Event> {
        let event = match input {
            HeadlessInput::Key { key, action, repeat } => {
                let mut event = Event::key(window, key, action);
                if let Event::Keyboard(key_event) = &mut event {
                    key_event.repeat = repeat;
                }
                event
            }
            HeadlessInput::CursorMoved { x, y } => {
                self.state.lock().unwrap().cursor = (x, y);
                Event::mouse(window, MouseEventKind::Moved { x, y })
            }
            HeadlessInput::MouseButton { button, pressed: true } => {
                Event::mouse(window, MouseEventKind::ButtonPressed(button))
            }
            HeadlessInput::MouseButton { button, pressed: false } => {
                Event::mouse(window, MouseEventKind::ButtonReleased(button))
            }
            HeadlessInput::Wheel { dx, dy } => Event::mouse(window, MouseEventKind::Wheel { dx, dy }),
            HeadlessInput::Resized(width, height) => {
                let mut state = self.state.lock().unwrap();
                if state.size == (width, height) {
                    return None;
                }
                state.size = (width, height);
                Event::window_event(window, WindowEventKind::Resized { width, height })
            }
            HeadlessInput::Focus(true) => Event::window_event(window, WindowEventKind::FocusGained),
            HeadlessInput::Focus(false) => Event::window_event(window, WindowEventKind::FocusLost),
            HeadlessInput::CloseRequested => Event::window_event(window, WindowEventKind::CloseRequested),
        };
        Some(event)
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl OsWindow for HeadlessWindow {
    fn open(&mut self, settings: &WindowSettings) -> bool {
        if self.refuse_open {
            log::warn!("Headless window '{}' refused to open", settings.title);
            return false;
        }
        let mut state = self.state.lock().unwrap();
        state.open = true;
        state.size = (settings.width, settings.height);
        state.opens += 1;
        log::debug!(
            "Opened headless window '{}' ({}x{})",
            settings.title,
            settings.width,
            settings.height
        );
        true
    }

    fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.open = false;
        state.captured = false;
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn size(&self) -> (u32, u32) {
        self.state.lock().unwrap().size
    }

    fn position(&self) -> (i32, i32) {
        self.state.lock().unwrap().position
    }

    fn warp_mouse_cursor(&mut self, x: f32, y: f32) {
        self.state.lock().unwrap().cursor = (x, y);
    }

    fn capture_mouse(&mut self, capture: bool) {
        self.state.lock().unwrap().captured = capture;
    }

    fn poll_events(&mut self, window: WindowId) -> Vec<Event> {
        if !self.is_open() {
            self.input.drain().for_each(drop);
            return Vec::new();
        }
        let pending: Vec<HeadlessInput> = self.input.try_iter().collect();
        pending
            .into_iter()
            .filter_map(|input| self.translate(input, window))
            .collect()
    }
}

/// Feeds input into a [`HeadlessWindow`] and observes its state.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Arc<Mutex<HeadlessState>>,
    sender: flume::Sender<HeadlessInput>,
}

impl HeadlessHandle {
    /// Queues raw input.
    pub fn send(&self, input: HeadlessInput) {
        if self.sender.send(input).is_err() {
            log::debug!("Headless window is gone; input dropped");
        }
    }

    /// Queues a key press.
    pub fn press_key(&self, key: Key) {
        self.send(HeadlessInput::Key {
            key,
            action: KeyAction::Pressed,
            repeat: false,
        });
    }

    /// Queues a key release.
    pub fn release_key(&self, key: Key) {
        self.send(HeadlessInput::Key {
            key,
            action: KeyAction::Released,
            repeat: false,
        });
    }

    /// Queues a cursor move.
    pub fn move_mouse(&self, x: f32, y: f32) {
        self.send(HeadlessInput::CursorMoved { x, y });
    }

    /// Queues a user resize.
    pub fn resize(&self, width: u32, height: u32) {
        self.send(HeadlessInput::Resized(width, height));
    }

    /// Queues a close request.
    pub fn request_close(&self) {
        self.send(HeadlessInput::CloseRequested);
    }

    /// Whether the window is open.
    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    /// The window size.
    pub fn size(&self) -> (u32, u32) {
        self.state.lock().unwrap().size
    }

    /// Where the cursor is.
    pub fn cursor(&self) -> (f32, f32) {
        self.state.lock().unwrap().cursor
    }

    /// Whether the cursor is captured.
    pub fn is_captured(&self) -> bool {
        self.state.lock().unwrap().captured
    }

    /// How many times the window was opened.
    pub fn open_count(&self) -> u32 {
        self.state.lock().unwrap().opens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_translated_in_order() {
        let mut window = HeadlessWindow::new();
        let handle = window.handle();
        assert!(window.open(&WindowSettings::new("test", 64, 32)));

        handle.press_key(Key::character('A'));
        handle.move_mouse(3.0, 4.0);
        handle.resize(64, 32);
        handle.resize(128, 64);
        handle.request_close();

        let events = window.poll_events(WindowId(7));
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], Event::Keyboard(k) if k.key == Key::Character('a') && k.window == WindowId(7)));
        assert_eq!(handle.cursor(), (3.0, 4.0));
        assert!(matches!(
            events[2],
            Event::Window(ref w) if w.kind == WindowEventKind::Resized { width: 128, height: 64 }
        ));
        assert_eq!(handle.size(), (128, 64));
        assert!(window.poll_events(WindowId(7)).is_empty());
    }

    #[test]
    fn closed_windows_drop_input() {
        let mut window = HeadlessWindow::new();
        let handle = window.handle();
        handle.press_key(Key::Space);
        assert!(window.poll_events(WindowId(1)).is_empty());
        assert!(window.open(&WindowSettings::default()));
        assert!(window.poll_events(WindowId(1)).is_empty());
    }

    #[test]
    fn refusing_window_stays_closed() {
        let mut window = HeadlessWindow::refusing();
        assert!(!window.open(&WindowSettings::default()));
        assert!(!window.is_open());
        assert_eq!(window.handle().open_count(), 0);
    }
}
