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

use super::graphic_instance::GraphicInstance;
use super::material::{MeshPointer, RenderMaterial};
use super::mesh::Mesh;
use crate::math::Mat4;
use crate::scene::{Camera, CameraData, MeshRenderer, Object, World};
use std::sync::Arc;

/// One mesh renderer found in a world, ready to be drawn.
#[derive(Clone)]
pub struct DrawItem {
    /// Name of the object carrying the renderer.
    pub object: String,
    /// The object's global model matrix.
    pub model: Mat4,
    /// The drawn mesh.
    pub mesh: Arc<Mesh>,
    /// The material it is drawn with.
    pub material: Arc<RenderMaterial>,
    /// Where the mesh lives in the material's arenas. `None` if its upload failed.
    pub mesh_pointer: Option<MeshPointer>,
}

/// Everything a backend needs to draw a world from one camera.
#[derive(Clone, Default)]
pub struct DrawList {
    /// The camera block.
    pub camera: CameraData,
    /// The draws, in gather order.
    pub items: Vec<DrawItem>,
}

impl DrawList {
    /// Collects every mesh renderer in `world`, roots by name, each tree depth first.
    ///
    /// The camera block comes from the [`Camera`] attached to `camera`, fitted to
    /// `target_size`. Without one, a default camera placed by `camera` is used.
    pub fn gather(world: &World, camera: &Object, target_size: (u32, u32)) -> Self {
        let mut lens = camera
            .with_attachment::<Camera, _>(|c| *c)
            .unwrap_or_default();
        lens.fit_to(target_size);

        let items = world
            .all_objects()
            .into_iter()
            .filter_map(|object| {
                object.with_attachment::<MeshRenderer, _>(|renderer| DrawItem {
                    object: object.name().to_string(),
                    model: object.global_matrix(),
                    mesh: Arc::clone(renderer.mesh()),
                    material: Arc::clone(renderer.material()),
                    mesh_pointer: renderer.mesh_pointer(),
                })
            })
            .collect();

        Self {
            camera: lens.data(camera),
            items,
        }
    }

    /// Model matrices in draw order.
    pub fn model_matrices(&self) -> Vec<Mat4> {
        self.items.iter().map(|item| item.model).collect()
    }

    /// Writes the camera block and the model matrices into the shared buffers.
    pub fn upload(&self, graphic: &GraphicInstance) -> bool {
        graphic.upload_camera(&self.camera) && graphic.upload_objects(&self.model_matrices())
    }

    /// Number of draws.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
