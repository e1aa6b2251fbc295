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

//! Typed input/window events and the channel that carries them across threads.
//!
//! OS-facing collaborators produce [`Event`] values; the platform event pump hands
//! them to the owning instance, whose [`LayerStack`](crate::layer::LayerStack)
//! consumes them. Events can also be injected from any thread through the
//! platform's [`EventBus`].

mod bus;
mod types;

pub use self::bus::EventBus;
pub use self::types::{
    CustomEvent, Event, EventChannel, Key, KeyAction, KeyboardKeyEvent, MouseButton, MouseEvent,
    MouseEventKind, WindowEvent, WindowEventKind, WindowId,
};
