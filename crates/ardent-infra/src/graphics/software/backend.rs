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

use super::pipeline::SoftwarePipeline;
use super::resources::{
    SoftwareArena, SoftwareFramebuffer, SoftwareGraphicInstance, SoftwareSurface, SoftwareTexture,
};
use super::trace::CommandTrace;
use ardent_core::api::GraphicsApi;
use ardent_core::error::ResourceError;
use ardent_core::event::WindowId;
use ardent_core::graphics::{
    ArenaBackend, ArenaDescriptor, FramebufferBackend, FramebufferDescriptor, GraphicBackend,
    GraphicInstanceBackend, RenderPipelineBackend, TextureBackend, TextureDescriptor, WindowBackend,
};
use ardent_core::platform::{OsWindow, WindowSettings};
use std::sync::atomic::{AtomicBool, Ordering};

/// Factory for the software implementation of every per-API object.
///
/// Registered on a platform under [`GraphicsApi::Software`]. Every pipeline it
/// creates writes into the same [`CommandTrace`].
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    trace: CommandTrace,
    context_ready: AtomicBool,
}

impl SoftwareBackend {
    /// Creates a backend with an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// The trace shared by every pipeline of this backend.
    pub fn trace(&self) -> &CommandTrace {
        &self.trace
    }

    /// Whether `init_context` ran.
    pub fn has_context(&self) -> bool {
        self.context_ready.load(Ordering::Acquire)
    }
}

impl GraphicBackend for SoftwareBackend {
    fn api(&self) -> GraphicsApi {
        GraphicsApi::Software
    }

    fn init_context(&self, window: &dyn OsWindow) -> Result<(), ResourceError> {
        if !window.is_open() {
            return Err(ResourceError::BackendError(
                "the software context needs an open window".to_string(),
            ));
        }
        if !self.context_ready.swap(true, Ordering::AcqRel) {
            log::info!("Software graphics context ready");
        }
        Ok(())
    }

    fn create_graphic_instance(&self) -> Result<Box<dyn GraphicInstanceBackend>, ResourceError> {
        Ok(Box::new(SoftwareGraphicInstance::default()))
    }

    fn create_arena(&self, descriptor: &ArenaDescriptor) -> Result<Box<dyn ArenaBackend>, ResourceError> {
        log::trace!("software: arena '{}' of {} bytes", descriptor.label, descriptor.size);
        Ok(Box::new(SoftwareArena::new(descriptor.size)))
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<Box<dyn TextureBackend>, ResourceError> {
        Ok(Box::new(SoftwareTexture::new(descriptor.size, descriptor.format)))
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<Box<dyn FramebufferBackend>, ResourceError> {
        Ok(Box::new(SoftwareFramebuffer::new(
            descriptor.label.clone(),
            descriptor.size,
        )))
    }

    fn create_window(
        &self,
        settings: &WindowSettings,
        window: WindowId,
    ) -> Result<Box<dyn WindowBackend>, ResourceError> {
        Ok(Box::new(SoftwareSurface::new(
            window,
            (settings.width, settings.height),
        )))
    }

    fn create_render_pipeline(&self, label: &str) -> Result<Box<dyn RenderPipelineBackend>, ResourceError> {
        Ok(Box::new(SoftwarePipeline::new(label, self.trace.clone())))
    }
}
