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

use super::backend::TextureBackend;
use crate::error::ResourceError;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Pixel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized.
    #[default]
    Rgba8,
    /// 8-bit BGRA, unsigned normalized.
    Bgra8,
    /// Single 8-bit channel.
    R8,
    /// 16-bit float RGBA.
    Rgba16F,
    /// 32-bit float RGBA.
    Rgba32F,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
    /// 32-bit float depth.
    Depth32F,
}

impl TextureFormat {
    /// Whether this is a depth format.
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8 | TextureFormat::Depth32F)
    }

    /// Size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rgba8
            | TextureFormat::Bgra8
            | TextureFormat::Depth24Stencil8
            | TextureFormat::Depth32F => 4,
            TextureFormat::Rgba16F => 8,
            TextureFormat::Rgba32F => 16,
        }
    }
}

/// What a texture is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TexturePurpose {
    /// Sampled by shaders.
    #[default]
    Image,
    /// Rendered into through a framebuffer, and sampled.
    RenderTarget,
    /// CPU-side pixels only, never bound.
    CpuOnly,
}

impl TexturePurpose {
    /// Whether a framebuffer may render into a texture with this purpose.
    pub fn is_render_target(self) -> bool {
        matches!(self, TexturePurpose::RenderTarget)
    }
}

/// Everything a backend needs to create a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Debug label.
    pub label: String,
    /// Size in pixels.
    pub size: (u32, u32),
    /// Pixel format.
    pub format: TextureFormat,
    /// Usage.
    pub purpose: TexturePurpose,
}

impl TextureDescriptor {
    /// Creates a descriptor.
    pub fn new(label: impl Into<String>, size: (u32, u32), format: TextureFormat, purpose: TexturePurpose) -> Self {
        Self {
            label: label.into(),
            size,
            format,
            purpose,
        }
    }

    /// A color render target.
    pub fn render_target(label: impl Into<String>, size: (u32, u32)) -> Self {
        Self::new(label, size, TextureFormat::Rgba8, TexturePurpose::RenderTarget)
    }

    /// A depth render target.
    pub fn depth_target(label: impl Into<String>, size: (u32, u32)) -> Self {
        Self::new(label, size, TextureFormat::Depth32F, TexturePurpose::RenderTarget)
    }

    /// Number of bytes of the whole pixel contents.
    pub fn byte_size(&self) -> u64 {
        u64::from(self.size.0) * u64::from(self.size.1) * u64::from(self.format.bytes_per_pixel())
    }
}

/// A texture. Missing backends leave it unusable, like arenas.
pub struct Texture {
    descriptor: TextureDescriptor,
    backend: Mutex<Option<Box<dyn TextureBackend>>>,
    instance: InstanceHandle,
}

impl Texture {
    /// Creates a texture and registers it with the instance.
    pub fn new(instance: &InstanceContext, descriptor: TextureDescriptor) -> Arc<Self> {
        let backend = match instance.backend() {
            Some(backend) => backend
                .create_texture(&descriptor)
                .map_err(|e| {
                    instance.log(
                        format!("Failed to create texture '{}': {e}", descriptor.label),
                        Severity::FatalError,
                    )
                })
                .ok(),
            None => {
                instance.log(
                    format!(
                        "Can not create texture '{}': no backend for the {} API.",
                        descriptor.label,
                        instance.api()
                    ),
                    Severity::FatalError,
                );
                None
            }
        };
        instance.attach(Self {
            descriptor,
            backend: Mutex::new(backend),
            instance: instance.handle(),
        })
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.descriptor.label
    }

    /// Current size in pixels. Falls back to the creation size when unusable.
    pub fn size(&self) -> (u32, u32) {
        self.backend
            .lock()
            .unwrap()
            .as_ref()
            .map_or(self.descriptor.size, |b| b.size())
    }

    /// The pixel format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// The usage.
    pub fn purpose(&self) -> TexturePurpose {
        self.descriptor.purpose
    }

    /// Whether a backend object exists.
    pub fn is_usable(&self) -> bool {
        self.backend.lock().unwrap().is_some()
    }

    /// Replaces the pixel contents.
    pub fn write(&self, data: &[u8]) -> Result<(), ResourceError> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().ok_or(ResourceError::Unusable)?.write(data)
    }

    /// Reads the pixel contents back.
    pub fn read(&self) -> Result<Vec<u8>, ResourceError> {
        let backend = self.backend.lock().unwrap();
        backend.as_ref().ok_or(ResourceError::Unusable)?.read()
    }

    /// Reallocates the storage at a new size.
    pub fn resize(&self, size: (u32, u32)) -> Result<(), ResourceError> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().ok_or(ResourceError::Unusable)?.resize(size)
    }

    /// Runs `f` on the backend object, if there is one.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn TextureBackend) -> R) -> Option<R> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().map(|b| f(&mut **b))
    }
}

impl InstAttachable for Texture {
    fn name(&self) -> &str {
        &self.descriptor.label
    }

    fn type_name(&self) -> &'static str {
        "Texture"
    }

    fn on_destroy(&self) {
        if let Some(mut backend) = self.backend.lock().unwrap().take() {
            backend.on_destroy();
            self.instance
                .log_debug(format!("Texture '{}' destroyed.", self.descriptor.label));
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("descriptor", &self.descriptor)
            .field("usable", &self.is_usable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_formats() {
        assert!(TextureFormat::Depth32F.is_depth());
        assert!(!TextureFormat::Rgba8.is_depth());
    }

    #[test]
    fn descriptor_byte_size() {
        let desc = TextureDescriptor::render_target("color", (4, 2));
        assert_eq!(desc.byte_size(), 32);
        let hdr = TextureDescriptor::new("hdr", (2, 2), TextureFormat::Rgba32F, TexturePurpose::Image);
        assert_eq!(hdr.byte_size(), 64);
    }
}
