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

use crate::event::{Event, WindowId};
use crate::utils::AsAny;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// How an OS window is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Title bar text.
    pub title: String,
    /// Initial drawable width in pixels.
    pub width: u32,
    /// Initial drawable height in pixels.
    pub height: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Whether the window starts visible.
    pub visible: bool,
    /// Whether presentation waits for vertical sync.
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Ardent".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            visible: true,
            vsync: true,
        }
    }
}

impl WindowSettings {
    /// Settings with a title and a size, everything else default.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }
}

/// An OS-level window, as provided by the windowing system.
///
/// The engine never talks to the OS directly; concrete implementations live in the
/// infrastructure crate.
pub trait OsWindow: AsAny + Send {
    /// Creates the native window. Returns `false` when the OS refused.
    fn open(&mut self, settings: &WindowSettings) -> bool;

    /// Destroys the native window.
    fn close(&mut self);

    /// Whether the native window exists.
    fn is_open(&self) -> bool;

    /// Drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Position on screen.
    fn position(&self) -> (i32, i32);

    /// Moves the cursor inside the window.
    fn warp_mouse_cursor(&mut self, x: f32, y: f32);

    /// Grabs or releases the cursor.
    fn capture_mouse(&mut self, capture: bool);

    /// Returns the events that arrived since the last poll, stamped with `window`.
    fn poll_events(&mut self, window: WindowId) -> Vec<Event>;
}

/// An OS window shared between its engine window and the platform event pump.
pub type SharedOsWindow = Arc<Mutex<Box<dyn OsWindow>>>;
