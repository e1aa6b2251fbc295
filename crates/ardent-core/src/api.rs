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

//! Graphics API selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The graphics API an [`Instance`](crate::instance::Instance) renders with.
///
/// Exactly one API is chosen per instance, at construction, and it never changes
/// afterwards. Every GPU-backed object of that instance selects its per-API backend
/// object from this value once, when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsApi {
    /// No graphics at all. Instances with this API only run the update loop.
    #[default]
    None,
    /// CPU-side reference implementation.
    Software,
    /// OpenGL 4.6 core profile.
    OpenGl,
    /// Vulkan 1.x.
    Vulkan,
}

impl GraphicsApi {
    /// Every API variant, in declaration order.
    pub const ALL: [GraphicsApi; 4] = [
        GraphicsApi::None,
        GraphicsApi::Software,
        GraphicsApi::OpenGl,
        GraphicsApi::Vulkan,
    ];

    /// Whether the engine claims support for this API.
    ///
    /// A supported API still needs a backend registered on the
    /// [`Platform`](crate::platform::Platform) to actually work. A supported API
    /// without a registered backend is an engine bug, an unsupported one is a
    /// configuration error.
    pub fn is_supported(self) -> bool {
        !matches!(self, GraphicsApi::None)
    }

    /// Whether this API produces any graphics output.
    pub fn has_graphics(self) -> bool {
        !matches!(self, GraphicsApi::None)
    }

    /// A short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            GraphicsApi::None => "None",
            GraphicsApi::Software => "Software",
            GraphicsApi::OpenGl => "OpenGL",
            GraphicsApi::Vulkan => "Vulkan",
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
