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

use ardent_core::event::WindowId;
use std::sync::{Arc, Mutex};

/// One stage execution recorded by the software backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SoftwareCommand {
    /// A framebuffer was cleared.
    Clear {
        /// Framebuffer label.
        framebuffer: String,
        /// Clear color, quantized to RGBA8.
        color: [u8; 4],
    },
    /// A world was drawn into a framebuffer.
    DrawWorld {
        /// World name.
        world: String,
        /// Framebuffer label.
        framebuffer: String,
        /// Number of mesh renderers drawn.
        draws: usize,
        /// Number of triangles submitted.
        triangles: usize,
    },
    /// A framebuffer attachment was copied onto a window surface.
    BlitToWindow {
        /// Source framebuffer label.
        framebuffer: String,
        /// Target window.
        window: WindowId,
    },
    /// A window surface was copied into a framebuffer attachment.
    BlitFromWindow {
        /// Source window.
        window: WindowId,
        /// Target framebuffer label.
        framebuffer: String,
    },
    /// A compute material was dispatched.
    Compute {
        /// Material name.
        material: String,
        /// Workgroup counts.
        workgroups: [u32; 3],
    },
    /// A framebuffer was resized.
    Resize {
        /// Framebuffer label.
        framebuffer: String,
        /// New size.
        size: (u32, u32),
    },
    /// A window surface was presented.
    Swap {
        /// Presented window.
        window: WindowId,
    },
    /// A hook stage ran.
    Hook {
        /// Hook label.
        label: String,
    },
}

/// A shared, append-only log of executed commands.
#[derive(Debug, Clone, Default)]
pub struct CommandTrace {
    commands: Arc<Mutex<Vec<SoftwareCommand>>>,
}

impl CommandTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn record(&self, command: SoftwareCommand) {
        log::trace!("software: {command:?}");
        self.commands.lock().unwrap().push(command);
    }

    /// A copy of every recorded command, oldest first.
    pub fn commands(&self) -> Vec<SoftwareCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Removes and returns every recorded command.
    pub fn take(&self) -> Vec<SoftwareCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
