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

//! GPU-backed resources and the render pipeline.
//!
//! Every resource here is API-agnostic. At construction it asks the instance's
//! [`GraphicBackend`] for its per-API object once and forwards to it afterwards.
//! Resources whose backend could not be created stay unusable instead of panicking.

mod allocator;
mod arena;
mod backend;
mod buffer;
mod draw;
mod framebuffer;
mod graphic_instance;
mod material;
mod mesh;
mod pipeline;
mod reference;
mod shader;
mod stage;
mod texture;
mod vertex_layout;
mod window;

pub use self::allocator::ArenaAllocator;
pub use self::arena::{ArenaDescriptor, ArenaUsage, ByteRange, GraphicMemoryArena};
pub use self::backend::{
    ArenaBackend, FramebufferBackend, GraphicBackend, GraphicInstanceBackend, NullRenderPipeline,
    RenderPipelineBackend, TextureBackend, WindowBackend,
};
pub use self::buffer::Buffer;
pub use self::draw::{DrawItem, DrawList};
pub use self::framebuffer::{validate_attachments, AttachmentInfo, Framebuffer, FramebufferDescriptor};
pub use self::graphic_instance::GraphicInstance;
pub use self::material::{MeshPointer, RenderMaterial};
pub use self::mesh::{Mesh, Vertex};
pub use self::pipeline::RenderPipeline;
pub use self::reference::{PipelineId, ReferenceList};
pub use self::shader::{PassThroughProcessor, Shader, ShaderProcessor, ShaderStage};
pub use self::stage::{RenderStage, RenderStageKind, RenderStageType, SharedSize, StageHook};
pub use self::texture::{Texture, TextureDescriptor, TextureFormat, TexturePurpose};
pub use self::vertex_layout::{RenderVertexLayout, VertexElement, VertexElementType, BASELINE_VERTEX_ELEMENTS};
pub use self::window::Window;
