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

use super::Layer;
use crate::event::{Event, WindowEventKind, WindowId};
use crate::input::SharedInput;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Writes keyboard events into the instance input state.
pub struct KeyboardLayer {
    input: SharedInput,
}

impl KeyboardLayer {
    /// Creates the layer over the given input state.
    pub fn new(input: SharedInput) -> Self {
        Self { input }
    }
}

impl Layer for KeyboardLayer {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn on_event(&mut self, event: &Event) -> bool {
        let Event::Keyboard(key) = event else {
            return false;
        };
        self.input.write().unwrap().keyboard.apply(key);
        true
    }
}

/// Writes mouse events into the instance input state.
pub struct MouseLayer {
    input: SharedInput,
}

impl MouseLayer {
    /// Creates the layer over the given input state.
    pub fn new(input: SharedInput) -> Self {
        Self { input }
    }
}

impl Layer for MouseLayer {
    fn name(&self) -> &str {
        "mouse"
    }

    fn on_event(&mut self, event: &Event) -> bool {
        let Event::Mouse(mouse) = event else {
            return false;
        };
        self.input.write().unwrap().mouse.apply(&mouse.kind);
        true
    }
}

/// Flags the window layer raises for a window. The window entity consumes them on
/// its next update.
#[derive(Debug, Default)]
pub struct WindowFlags {
    close_requested: AtomicBool,
    focused: AtomicBool,
    minimized: AtomicBool,
    pending_resize: Mutex<Option<(u32, u32)>>,
}

impl WindowFlags {
    /// Asks the window to close on its next update.
    pub fn request_close(&self) {
        self.close_requested.store(true, Ordering::Release);
    }

    /// Whether a close was requested.
    pub fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::Acquire)
    }

    /// Whether the window has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::Acquire)
    }

    /// Whether the window is minimized.
    pub fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::Acquire)
    }

    /// Takes the last resize reported since the previous call.
    pub fn take_resize(&self) -> Option<(u32, u32)> {
        self.pending_resize.lock().unwrap().take()
    }

    fn apply(&self, kind: WindowEventKind) {
        match kind {
            WindowEventKind::CloseRequested => self.request_close(),
            WindowEventKind::Resized { width, height } => {
                *self.pending_resize.lock().unwrap() = Some((width, height));
            }
            WindowEventKind::FocusGained => self.focused.store(true, Ordering::Release),
            WindowEventKind::FocusLost => self.focused.store(false, Ordering::Release),
            WindowEventKind::Minimized => self.minimized.store(true, Ordering::Release),
            WindowEventKind::Restored => self.minimized.store(false, Ordering::Release),
            WindowEventKind::Moved { .. } => {}
        }
    }
}

/// Window flags of every window of an instance.
pub type WindowTable = Arc<RwLock<HashMap<WindowId, Arc<WindowFlags>>>>;

/// Turns window events into [`WindowFlags`] updates.
pub struct WindowLayer {
    windows: WindowTable,
}

impl WindowLayer {
    /// Creates the layer over the given window table.
    pub fn new(windows: WindowTable) -> Self {
        Self { windows }
    }
}

impl Layer for WindowLayer {
    fn name(&self) -> &str {
        "window"
    }

    fn on_event(&mut self, event: &Event) -> bool {
        let Event::Window(window_event) = event else {
            return false;
        };
        match self.windows.read().unwrap().get(&window_event.window) {
            Some(flags) => flags.apply(window_event.kind),
            None => log::debug!(
                "Dropping {:?} for unknown {}",
                window_event.kind,
                window_event.window
            ),
        }
        true
    }
}
