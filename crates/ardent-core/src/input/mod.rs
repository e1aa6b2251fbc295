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

//! Input state shared between the event layers and the rest of the engine.
//!
//! The built-in [`KeyboardLayer`](crate::layer::KeyboardLayer) and
//! [`MouseLayer`](crate::layer::MouseLayer) are the only writers. Everybody else
//! reads a snapshot through [`SharedInput`].

mod keyboard;
mod mouse;

pub use keyboard::{KeyboardState, Toggles};
pub use mouse::MouseState;

use std::sync::{Arc, RwLock};

/// Keyboard and mouse state of one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// Keyboard keys and toggle keys.
    pub keyboard: KeyboardState,
    /// Mouse position, buttons and wheel.
    pub mouse: MouseState,
}

/// Handle to an instance's input state.
pub type SharedInput = Arc<RwLock<InputState>>;
