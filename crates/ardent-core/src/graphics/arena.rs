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

//! Graphic memory arenas: the substrate of every GPU-backed resource.

use super::allocator::ArenaAllocator;
use super::backend::ArenaBackend;
use crate::error::ResourceError;
use crate::instance::{InstanceContext, InstanceHandle};
use crate::logging::Severity;
use std::fmt;
use std::sync::Mutex;

/// A byte range `[offset, offset + size)` inside an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteRange {
    /// First byte.
    pub offset: u64,
    /// Length in bytes.
    pub size: u64,
}

impl ByteRange {
    /// Creates a range.
    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// One past the last byte. Saturates instead of overflowing.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    /// Whether the range lies inside `[0, capacity)`.
    pub fn fits(&self, capacity: u64) -> bool {
        self.offset
            .checked_add(self.size)
            .is_some_and(|end| end <= capacity)
    }
}

/// What an arena's memory is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArenaUsage {
    /// Read-only shader constants.
    #[default]
    Uniform,
    /// Shader storage, read and written by shaders.
    ReadWrite,
    /// Vertex data.
    Vertex,
    /// Index data.
    Index,
    /// Staging memory for transfers.
    Transfer,
}

/// Everything a backend needs to create an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaDescriptor {
    /// Debug label.
    pub label: String,
    /// Initial size in bytes.
    pub size: u64,
    /// Whether the arena may grow when an allocation does not fit.
    pub resizable: bool,
    /// What the memory is bound as.
    pub usage: ArenaUsage,
    /// Whether the backend must expose the arena as a bindable API object, as
    /// opposed to memory only the backend itself reads.
    pub is_api_object: bool,
}

impl ArenaDescriptor {
    /// A fixed-size, bindable arena.
    pub fn new(label: impl Into<String>, size: u64, usage: ArenaUsage) -> Self {
        Self {
            label: label.into(),
            size,
            resizable: false,
            usage,
            is_api_object: true,
        }
    }

    /// Makes the arena growable.
    pub fn resizable(mut self) -> Self {
        self.resizable = true;
        self
    }
}

/// An API-agnostic handle to one block of GPU-visible memory.
///
/// The per-API memory is created once, at construction, by the backend of the
/// owning instance's API. When no backend exists the failure is logged as fatal and
/// the arena stays unusable: it reports a capacity of zero and rejects every
/// operation with [`ResourceError::Unusable`].
///
/// Besides raw range updates the arena doubles as an allocator: `allocate` and
/// `release` hand out sub-ranges, which is how vertex layouts pool many meshes in
/// one buffer. Resizable arenas grow when an allocation does not fit.
pub struct GraphicMemoryArena {
    descriptor: ArenaDescriptor,
    instance: InstanceHandle,
    allocator: Mutex<ArenaAllocator>,
    backend: Mutex<Option<Box<dyn ArenaBackend>>>,
}

impl GraphicMemoryArena {
    /// Creates an arena through the instance's backend.
    pub fn new(instance: &InstanceContext, descriptor: ArenaDescriptor) -> Self {
        let backend = match instance.backend() {
            Some(backend) => match backend.create_arena(&descriptor) {
                Ok(arena) => Some(arena),
                Err(e) => {
                    instance.log(
                        format!("Failed to create arena '{}': {e}", descriptor.label),
                        Severity::FatalError,
                    );
                    None
                }
            },
            None => {
                instance.log(
                    format!(
                        "Can not create arena '{}': no backend for the {} API.",
                        descriptor.label,
                        instance.api()
                    ),
                    Severity::FatalError,
                );
                None
            }
        };
        let capacity = backend.as_ref().map_or(0, |b| b.size());
        Self {
            allocator: Mutex::new(ArenaAllocator::new(capacity)),
            backend: Mutex::new(backend),
            instance: instance.handle(),
            descriptor,
        }
    }

    /// The creation descriptor.
    pub fn descriptor(&self) -> &ArenaDescriptor {
        &self.descriptor
    }

    /// Whether a backend object exists.
    pub fn is_usable(&self) -> bool {
        self.backend.lock().unwrap().is_some()
    }

    /// Current size in bytes, `0` when unusable.
    pub fn capacity(&self) -> u64 {
        self.backend.lock().unwrap().as_ref().map_or(0, |b| b.size())
    }

    /// Bytes handed out by `allocate`.
    pub fn used(&self) -> u64 {
        self.allocator.lock().unwrap().used()
    }

    /// Bytes still available to `allocate` without growing.
    pub fn free(&self) -> u64 {
        self.allocator.lock().unwrap().free()
    }

    /// Writes `data` at the start of `range`.
    ///
    /// `data` must not be longer than the range and the range must lie inside the
    /// arena; nothing is written otherwise.
    pub fn update(&self, range: ByteRange, data: &[u8]) -> Result<(), ResourceError> {
        if data.len() as u64 > range.size {
            return Err(ResourceError::InvalidRange {
                offset: range.offset,
                size: data.len() as u64,
            });
        }
        let mut backend = self.backend.lock().unwrap();
        let backend = backend.as_mut().ok_or(ResourceError::Unusable)?;
        let capacity = backend.size();
        if !range.fits(capacity) {
            return Err(ResourceError::OutOfBounds {
                offset: range.offset,
                size: range.size,
                capacity,
            });
        }
        backend.update(range.offset, data)
    }

    /// Reads the bytes of `range`.
    pub fn read(&self, range: ByteRange) -> Result<Vec<u8>, ResourceError> {
        let backend = self.backend.lock().unwrap();
        let backend = backend.as_ref().ok_or(ResourceError::Unusable)?;
        let capacity = backend.size();
        if !range.fits(capacity) {
            return Err(ResourceError::OutOfBounds {
                offset: range.offset,
                size: range.size,
                capacity,
            });
        }
        backend.read(range.offset, range.size)
    }

    /// Reserves a sub-range of `size` bytes.
    ///
    /// A resizable arena grows (at least doubling) when no free range fits; a fixed
    /// one fails with `OutOfMemory`.
    pub fn allocate(&self, size: u64) -> Result<ByteRange, ResourceError> {
        let mut allocator = self.allocator.lock().unwrap();
        if let Some(range) = allocator.allocate(size) {
            return Ok(range);
        }
        let capacity = allocator.capacity();
        if size == 0 || !self.descriptor.resizable {
            return Err(ResourceError::OutOfMemory {
                requested: size,
                capacity,
            });
        }

        let grown = capacity.saturating_mul(2).max(capacity.saturating_add(size));
        {
            let mut backend = self.backend.lock().unwrap();
            backend
                .as_mut()
                .ok_or(ResourceError::Unusable)?
                .resize(grown)?;
        }
        allocator.resize(grown)?;
        self.instance.log(
            format!(
                "Arena '{}' grew from {capacity} to {grown} bytes.",
                self.descriptor.label
            ),
            Severity::Debug,
        );
        allocator.allocate(size).ok_or(ResourceError::OutOfMemory {
            requested: size,
            capacity: grown,
        })
    }

    /// Frees a range handed out by `allocate`.
    pub fn release(&self, range: ByteRange) -> Result<(), ResourceError> {
        self.allocator.lock().unwrap().release(range)
    }

    /// Resizes the arena, keeping the contents that still fit. Shrinking below a live
    /// allocation is refused.
    pub fn resize(&self, size: u64) -> Result<(), ResourceError> {
        let mut allocator = self.allocator.lock().unwrap();
        let mut backend = self.backend.lock().unwrap();
        let backend = backend.as_mut().ok_or(ResourceError::Unusable)?;
        let mut resized = allocator.clone();
        resized.resize(size)?;
        backend.resize(size)?;
        *allocator = resized;
        Ok(())
    }

    /// Runs `f` on the backend object, if there is one.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn ArenaBackend) -> R) -> Option<R> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().map(|b| f(&mut **b))
    }

    /// Destroys the backend object. The arena is unusable afterwards.
    pub fn on_destroy(&self) {
        if let Some(mut backend) = self.backend.lock().unwrap().take() {
            backend.on_destroy();
        }
    }
}

impl Drop for GraphicMemoryArena {
    fn drop(&mut self) {
        self.on_destroy();
    }
}

impl fmt::Debug for GraphicMemoryArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicMemoryArena")
            .field("descriptor", &self.descriptor)
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_range_fits() {
        assert!(ByteRange::new(0, 16).fits(16));
        assert!(ByteRange::new(8, 8).fits(16));
        assert!(!ByteRange::new(8, 9).fits(16));
        assert!(!ByteRange::new(u64::MAX, 2).fits(u64::MAX));
    }

    #[test]
    fn descriptor_builder() {
        let desc = ArenaDescriptor::new("verts", 128, ArenaUsage::Vertex).resizable();
        assert!(desc.resizable);
        assert!(desc.is_api_object);
        assert_eq!(desc.usage, ArenaUsage::Vertex);
    }
}
