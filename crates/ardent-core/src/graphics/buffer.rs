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

use super::arena::{ArenaDescriptor, ArenaUsage, ByteRange, GraphicMemoryArena};
use crate::error::ResourceError;
use crate::instance::{InstAttachable, InstanceContext};
use std::sync::Arc;

/// A typed view over one arena, written at byte offsets.
#[derive(Debug)]
pub struct Buffer {
    label: String,
    arena: GraphicMemoryArena,
}

impl Buffer {
    /// Creates a fixed-size buffer and registers it with the instance.
    pub fn new(instance: &InstanceContext, label: impl Into<String>, size: u64, usage: ArenaUsage) -> Arc<Self> {
        instance.attach(Self::create(instance, ArenaDescriptor::new(label, size, usage)))
    }

    /// Creates a buffer without registering it. Used for buffers owned by another
    /// engine object.
    pub fn create(instance: &InstanceContext, descriptor: ArenaDescriptor) -> Self {
        Self {
            label: descriptor.label.clone(),
            arena: GraphicMemoryArena::new(instance, descriptor),
        }
    }

    /// Writes `data` at `offset`.
    ///
    /// Returns `false`, without writing anything, when `offset + data.len()` exceeds
    /// the capacity. An exact fit is accepted. Failures are not logged here.
    pub fn set(&self, data: &[u8], offset: u64) -> bool {
        let range = ByteRange::new(offset, data.len() as u64);
        if !range.fits(self.arena.capacity()) {
            return false;
        }
        self.arena.update(range, data).is_ok()
    }

    /// Writes a plain-old-data value at `offset`.
    pub fn set_pod<T: bytemuck::Pod>(&self, value: &T, offset: u64) -> bool {
        self.set(bytemuck::bytes_of(value), offset)
    }

    /// Writes a slice of plain-old-data values at `offset`.
    pub fn set_slice<T: bytemuck::Pod>(&self, values: &[T], offset: u64) -> bool {
        self.set(bytemuck::cast_slice(values), offset)
    }

    /// Reads `size` bytes at `offset`.
    pub fn get(&self, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError> {
        self.arena.read(ByteRange::new(offset, size))
    }

    /// Capacity in bytes.
    pub fn size(&self) -> u64 {
        self.arena.capacity()
    }

    /// Resizes the underlying arena.
    pub fn resize(&self, size: u64) -> Result<(), ResourceError> {
        self.arena.resize(size)
    }

    /// The underlying arena.
    pub fn arena(&self) -> &GraphicMemoryArena {
        &self.arena
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl InstAttachable for Buffer {
    fn name(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "Buffer"
    }

    fn on_destroy(&self) {
        self.arena.on_destroy();
    }
}
