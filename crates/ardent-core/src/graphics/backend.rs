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

//! The per-API backend contract.
//!
//! A [`GraphicBackend`] is registered on the [`Platform`](crate::platform::Platform)
//! for one [`GraphicsApi`]. Every GPU-backed engine object asks it for its per-API
//! object exactly once, at construction, and afterwards talks to that object through
//! the small traits below.

use super::arena::ArenaDescriptor;
use super::framebuffer::FramebufferDescriptor;
use super::stage::RenderStage;
use super::texture::TextureDescriptor;
use crate::api::GraphicsApi;
use crate::error::ResourceError;
use crate::event::WindowId;
use crate::platform::{OsWindow, WindowSettings};
use crate::utils::AsAny;
use std::fmt::Debug;

/// Factory for every per-API object of one graphics API.
pub trait GraphicBackend: Send + Sync + Debug + 'static {
    /// The API this backend implements.
    fn api(&self) -> GraphicsApi;

    /// Performs context setup that needs the first OS window (an OpenGL context, a
    /// Vulkan surface, ...).
    /// ## Arguments
    /// * `window` - The OS window the first engine window is built on.
    /// ## Errors
    /// * `ResourceError` - If the context could not be created.
    fn init_context(&self, window: &dyn OsWindow) -> Result<(), ResourceError>;

    /// Creates the per-API graphic instance of an engine instance.
    /// ## Errors
    /// * `ResourceError` - If the backend could not allocate its instance state.
    fn create_graphic_instance(&self) -> Result<Box<dyn GraphicInstanceBackend>, ResourceError>;

    /// Creates the device memory behind a [`GraphicMemoryArena`](super::GraphicMemoryArena).
    /// ## Arguments
    /// * `descriptor` - Size, usage and growth policy of the arena.
    /// ## Returns
    /// A backend arena whose `size()` equals `descriptor.size`.
    /// ## Errors
    /// * `ResourceError` - If the memory could not be allocated.
    fn create_arena(&self, descriptor: &ArenaDescriptor) -> Result<Box<dyn ArenaBackend>, ResourceError>;

    /// Creates the storage of a [`Texture`](super::Texture).
    /// ## Errors
    /// * `ResourceError` - If the format is not supported or allocation failed.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<Box<dyn TextureBackend>, ResourceError>;

    /// Creates the per-API object of a validated [`Framebuffer`](super::Framebuffer).
    /// ## Errors
    /// * `ResourceError` - If the attachment combination is not supported.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<Box<dyn FramebufferBackend>, ResourceError>;

    /// Creates the presentation surface of an engine [`Window`](super::Window).
    /// ## Arguments
    /// * `settings` - The settings the OS window was opened with.
    /// * `window` - The id the platform assigned to the window.
    /// ## Errors
    /// * `ResourceError` - If no surface could be created for the window.
    fn create_window(
        &self,
        settings: &WindowSettings,
        window: WindowId,
    ) -> Result<Box<dyn WindowBackend>, ResourceError>;

    /// Creates the execution delegate of a [`RenderPipeline`](super::RenderPipeline).
    /// ## Errors
    /// * `ResourceError` - If the backend can not execute pipelines.
    fn create_render_pipeline(&self, label: &str) -> Result<Box<dyn RenderPipelineBackend>, ResourceError>;
}

/// Per-API state of an engine instance.
pub trait GraphicInstanceBackend: AsAny + Send {
    /// Called right after creation.
    fn on_create(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Flushes per-frame work. Called once per event-pump tick.
    fn on_render(&mut self);

    /// Whether asynchronous backend setup has finished.
    fn is_setup_done(&self) -> bool;

    /// Releases the instance state.
    fn on_destroy(&mut self) {}
}

/// A linear block of device memory.
pub trait ArenaBackend: AsAny + Send {
    /// Current size in bytes.
    fn size(&self) -> u64;

    /// Writes `data` at `offset`. The caller has already bounds-checked the write.
    fn update(&mut self, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads `size` bytes at `offset`.
    fn read(&self, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError>;

    /// Reallocates to `size` bytes, keeping the contents that still fit.
    fn resize(&mut self, size: u64) -> Result<(), ResourceError>;

    /// Releases the memory.
    fn on_destroy(&mut self) {}
}

/// Storage of a texture.
pub trait TextureBackend: AsAny + Send {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);

    /// Replaces the whole pixel contents.
    fn write(&mut self, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads the whole pixel contents back.
    fn read(&self) -> Result<Vec<u8>, ResourceError>;

    /// Reallocates the storage. Contents are undefined afterwards.
    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError>;

    /// Releases the storage.
    fn on_destroy(&mut self) {}
}

/// Per-API object of a framebuffer.
pub trait FramebufferBackend: AsAny + Send {
    /// Called after the attachments were resized to `size`.
    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError>;

    /// Releases the framebuffer object.
    fn on_destroy(&mut self) {}
}

/// Presentation surface of a window.
pub trait WindowBackend: AsAny + Send {
    /// Reallocates the surface for a new drawable size.
    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError>;

    /// Releases the surface.
    fn on_destroy(&mut self) {}
}

/// Executes a render pipeline's stage list against one API.
pub trait RenderPipelineBackend: AsAny + Send {
    /// Called once after the pipeline was built, before any execution.
    fn on_attach(&mut self, _stages: &[RenderStage]) {}

    /// Executes every stage, in order.
    fn on_execute(&mut self, stages: &[RenderStage]);

    /// Called once when the pipeline is destroyed.
    fn on_destroy(&mut self) {}
}

/// The delegate of a pipeline whose API has no backend: it does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderPipeline;

impl RenderPipelineBackend for NullRenderPipeline {
    fn on_execute(&mut self, _stages: &[RenderStage]) {}
}
