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

use super::arena::{ArenaDescriptor, ArenaUsage};
use super::backend::{GraphicBackend, GraphicInstanceBackend};
use super::buffer::Buffer;
use crate::error::ResourceError;
use crate::instance::InstanceContext;
use crate::math::Mat4;
use crate::scene::CameraData;
use std::fmt;
use std::mem::size_of;
use std::sync::{Arc, Mutex};

/// Handle slots reserved in the texture and image handle buffers at creation.
const INITIAL_HANDLE_SLOTS: u64 = 64;
/// Object transform slots reserved at creation.
const INITIAL_OBJECT_SLOTS: u64 = 64;

/// Per-instance graphics state: the backend's instance object and the four shared
/// buffers shaders bind by convention.
pub struct GraphicInstance {
    backend: Mutex<Box<dyn GraphicInstanceBackend>>,
    texture_handles: Buffer,
    image_handles: Buffer,
    camera: Buffer,
    objects: Buffer,
}

impl GraphicInstance {
    /// Creates the graphic instance of `instance` through `backend`.
    pub fn new(instance: &InstanceContext, backend: &dyn GraphicBackend) -> Result<Arc<Self>, ResourceError> {
        let mut graphic = backend.create_graphic_instance()?;
        graphic.on_create()?;

        let handle_size = INITIAL_HANDLE_SLOTS * size_of::<u64>() as u64;
        let buffer = |label: &str, size: u64, usage: ArenaUsage| {
            Buffer::create(instance, ArenaDescriptor::new(label, size, usage).resizable())
        };
        Ok(Arc::new(Self {
            backend: Mutex::new(graphic),
            texture_handles: buffer("texture-handles", handle_size, ArenaUsage::ReadWrite),
            image_handles: buffer("image-handles", handle_size, ArenaUsage::ReadWrite),
            camera: buffer("camera", size_of::<CameraData>() as u64, ArenaUsage::Uniform),
            objects: buffer(
                "object-transforms",
                INITIAL_OBJECT_SLOTS * size_of::<Mat4>() as u64,
                ArenaUsage::ReadWrite,
            ),
        }))
    }

    /// Flushes per-frame backend work.
    pub fn on_render(&self) {
        self.backend.lock().unwrap().on_render();
    }

    /// Whether backend setup has completed.
    pub fn is_setup_done(&self) -> bool {
        self.backend.lock().unwrap().is_setup_done()
    }

    /// Bindless texture handles.
    pub fn texture_handle_buffer(&self) -> &Buffer {
        &self.texture_handles
    }

    /// Bindless storage image handles.
    pub fn image_handle_buffer(&self) -> &Buffer {
        &self.image_handles
    }

    /// The active camera's [`CameraData`].
    pub fn camera_buffer(&self) -> &Buffer {
        &self.camera
    }

    /// One model matrix per drawn object.
    pub fn object_buffer(&self) -> &Buffer {
        &self.objects
    }

    /// Writes the camera data.
    pub fn upload_camera(&self, camera: &CameraData) -> bool {
        self.camera.set_pod(camera, 0)
    }

    /// Writes the model matrices, growing the object buffer when needed.
    pub fn upload_objects(&self, transforms: &[Mat4]) -> bool {
        let needed = (transforms.len() * size_of::<Mat4>()) as u64;
        if needed > self.objects.size() && self.objects.resize(needed.next_power_of_two()).is_err() {
            return false;
        }
        self.objects.set_slice(transforms, 0)
    }

    /// Runs `f` on the backend object.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn GraphicInstanceBackend) -> R) -> R {
        let mut backend = self.backend.lock().unwrap();
        f(&mut **backend)
    }

    /// Destroys the shared buffers and the backend object.
    pub fn on_destroy(&self) {
        for buffer in [&self.texture_handles, &self.image_handles, &self.camera, &self.objects] {
            buffer.arena().on_destroy();
        }
        self.backend.lock().unwrap().on_destroy();
    }
}

impl fmt::Debug for GraphicInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicInstance")
            .field("setup_done", &self.is_setup_done())
            .field("objects", &self.objects.size())
            .finish()
    }
}
