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

use super::backend::FramebufferBackend;
use super::reference::ReferenceList;
use super::texture::{Texture, TextureFormat, TexturePurpose};
use crate::error::ResourceError;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use std::fmt;
use std::sync::{Arc, Mutex};

/// What a backend needs to build the per-API framebuffer object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    /// Debug label.
    pub label: String,
    /// Shared size of every attachment.
    pub size: (u32, u32),
    /// Formats of the color attachments, in attachment order.
    pub color_formats: Vec<TextureFormat>,
    /// Format of the depth attachment, if any.
    pub depth_format: Option<TextureFormat>,
}

/// The properties of a texture that decide whether it can be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// The texture's purpose.
    pub purpose: TexturePurpose,
    /// The texture's format.
    pub format: TextureFormat,
    /// The texture's size in pixels.
    pub size: (u32, u32),
}

impl AttachmentInfo {
    fn of(texture: &Texture) -> Self {
        Self {
            purpose: texture.purpose(),
            format: texture.format(),
            size: texture.size(),
        }
    }
}

/// Checks a framebuffer's attachment set.
///
/// Every attachment must be a render target, color attachments must use a color
/// format, the depth attachment a depth format, and all of them must share one size.
/// Returns that size.
pub fn validate_attachments(
    colors: &[AttachmentInfo],
    depth: Option<AttachmentInfo>,
) -> Result<(u32, u32), ResourceError> {
    let mut size = None;
    let mut check_size = |found: (u32, u32)| match size {
        None => {
            size = Some(found);
            Ok(())
        }
        Some(expected) if expected == found => Ok(()),
        Some(expected) => Err(ResourceError::SizeMismatch { expected, found }),
    };

    for (index, color) in colors.iter().enumerate() {
        if !color.purpose.is_render_target() {
            return Err(ResourceError::InvalidAttachment {
                index: Some(index),
                reason: format!("purpose {:?} is not a render target", color.purpose),
            });
        }
        if color.format.is_depth() {
            return Err(ResourceError::InvalidAttachment {
                index: Some(index),
                reason: format!("{:?} is a depth format", color.format),
            });
        }
        check_size(color.size)?;
    }

    if let Some(depth) = depth {
        if !depth.purpose.is_render_target() {
            return Err(ResourceError::InvalidAttachment {
                index: None,
                reason: format!("purpose {:?} is not a render target", depth.purpose),
            });
        }
        if !depth.format.is_depth() {
            return Err(ResourceError::InvalidAttachment {
                index: None,
                reason: format!("{:?} is not a depth format", depth.format),
            });
        }
        check_size(depth.size)?;
    }

    size.ok_or_else(|| ResourceError::InvalidAttachment {
        index: None,
        reason: "a framebuffer needs at least one attachment".to_string(),
    })
}

/// A set of render-target textures rendered into together.
pub struct Framebuffer {
    label: String,
    colors: Vec<Arc<Texture>>,
    depth: Option<Arc<Texture>>,
    backend: Mutex<Option<Box<dyn FramebufferBackend>>>,
    references: ReferenceList,
    instance: InstanceHandle,
}

impl Framebuffer {
    /// Validates the attachments, creates the per-API object and registers the
    /// framebuffer with the instance.
    ///
    /// An invalid attachment set is logged as an error and returned as `Err`; no
    /// framebuffer is built. A missing backend is fatal for the framebuffer, which is
    /// still returned but stays unusable.
    pub fn new(
        instance: &InstanceContext,
        label: impl Into<String>,
        colors: Vec<Arc<Texture>>,
        depth: Option<Arc<Texture>>,
    ) -> Result<Arc<Self>, ResourceError> {
        let label = label.into();
        let color_info: Vec<AttachmentInfo> = colors.iter().map(|t| AttachmentInfo::of(t)).collect();
        let size = validate_attachments(&color_info, depth.as_deref().map(AttachmentInfo::of)).map_err(|e| {
            instance.log(
                format!("Can not create framebuffer '{label}': {e}"),
                Severity::Error,
            );
            e
        })?;

        let descriptor = FramebufferDescriptor {
            label: label.clone(),
            size,
            color_formats: color_info.iter().map(|c| c.format).collect(),
            depth_format: depth.as_ref().map(|d| d.format()),
        };
        let backend = match instance.backend() {
            Some(backend) => backend
                .create_framebuffer(&descriptor)
                .map_err(|e| {
                    instance.log(
                        format!("Failed to create framebuffer '{label}': {e}"),
                        Severity::FatalError,
                    )
                })
                .ok(),
            None => {
                instance.log(
                    format!(
                        "Can not create framebuffer '{label}': no backend for the {} API.",
                        instance.api()
                    ),
                    Severity::FatalError,
                );
                None
            }
        };

        Ok(instance.attach(Self {
            label,
            colors,
            depth,
            backend: Mutex::new(backend),
            references: ReferenceList::default(),
            instance: instance.handle(),
        }))
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size shared by every attachment.
    pub fn size(&self) -> (u32, u32) {
        self.colors
            .first()
            .or(self.depth.as_ref())
            .map_or((0, 0), |t| t.size())
    }

    /// The color attachments, in attachment order.
    pub fn color_attachments(&self) -> &[Arc<Texture>] {
        &self.colors
    }

    /// The color attachment at `index`.
    pub fn color_attachment(&self, index: usize) -> Option<&Arc<Texture>> {
        self.colors.get(index)
    }

    /// The depth attachment.
    pub fn depth_attachment(&self) -> Option<&Arc<Texture>> {
        self.depth.as_ref()
    }

    /// Whether a backend object exists.
    pub fn is_usable(&self) -> bool {
        self.backend.lock().unwrap().is_some()
    }

    /// Resizes every attachment, then the per-API object. Sizes are not validated.
    pub fn resize(&self, size: (u32, u32)) -> Result<(), ResourceError> {
        for texture in self.colors.iter().chain(self.depth.iter()) {
            texture.resize(size)?;
        }
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().ok_or(ResourceError::Unusable)?.resize(size)
    }

    /// The pipelines referencing this framebuffer.
    pub fn references(&self) -> &ReferenceList {
        &self.references
    }

    /// Runs `f` on the backend object, if there is one.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn FramebufferBackend) -> R) -> Option<R> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().map(|b| f(&mut **b))
    }
}

impl InstAttachable for Framebuffer {
    fn name(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "Framebuffer"
    }

    fn on_destroy(&self) {
        let Some(mut backend) = self.backend.lock().unwrap().take() else {
            return;
        };
        let holders = self.references.count();
        if holders > 0 {
            self.instance.log(
                format!(
                    "Framebuffer '{}' destroyed while {holders} pipeline reference(s) remain.",
                    self.label
                ),
                Severity::Warning,
            );
        }
        backend.on_destroy();
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("label", &self.label)
            .field("colors", &self.colors.len())
            .field("depth", &self.depth.is_some())
            .field("references", &self.references.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(size: (u32, u32)) -> AttachmentInfo {
        AttachmentInfo {
            purpose: TexturePurpose::RenderTarget,
            format: TextureFormat::Rgba8,
            size,
        }
    }

    fn depth(size: (u32, u32)) -> AttachmentInfo {
        AttachmentInfo {
            purpose: TexturePurpose::RenderTarget,
            format: TextureFormat::Depth32F,
            size,
        }
    }

    #[test]
    fn matching_attachments_validate() {
        let size = validate_attachments(&[target((8, 8)), target((8, 8))], Some(depth((8, 8))));
        assert_eq!(size, Ok((8, 8)));
    }

    #[test]
    fn image_purpose_is_rejected() {
        let mut image = target((8, 8));
        image.purpose = TexturePurpose::Image;
        let err = validate_attachments(&[target((8, 8)), image], None).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidAttachment { index: Some(1), .. }));
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let err = validate_attachments(&[target((8, 8))], Some(depth((4, 4)))).unwrap_err();
        assert_eq!(
            err,
            ResourceError::SizeMismatch {
                expected: (8, 8),
                found: (4, 4)
            }
        );
    }

    #[test]
    fn depth_slot_needs_a_depth_format() {
        let err = validate_attachments(&[], Some(target((2, 2)))).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidAttachment { index: None, .. }));
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(validate_attachments(&[], None).is_err());
    }
}
