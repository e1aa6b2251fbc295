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

use super::object::{Object, ObjectAttachable};
use crate::graphics::{Mesh, MeshPointer, RenderMaterial};
use std::sync::Arc;

/// Draws one mesh with one material.
///
/// Attaching the renderer registers a mesh instance with the material; removing it
/// gives the instance back.
pub struct MeshRenderer {
    mesh: Arc<Mesh>,
    material: Arc<RenderMaterial>,
    pointer: Option<MeshPointer>,
}

impl MeshRenderer {
    /// Creates a renderer. Nothing is uploaded until it is attached to an object.
    pub fn new(mesh: Arc<Mesh>, material: Arc<RenderMaterial>) -> Self {
        Self {
            mesh,
            material,
            pointer: None,
        }
    }

    /// The drawn mesh.
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// The material the mesh is drawn with.
    pub fn material(&self) -> &Arc<RenderMaterial> {
        &self.material
    }

    /// Whether the mesh is registered with the material.
    pub fn is_registered(&self) -> bool {
        self.pointer.is_some()
    }

    /// Where the mesh lives in the material's arenas, once registered.
    pub fn mesh_pointer(&self) -> Option<MeshPointer> {
        self.pointer.and_then(|_| self.material.mesh_pointer(&self.mesh))
    }
}

impl ObjectAttachable for MeshRenderer {
    fn type_name(&self) -> &'static str {
        "MeshRenderer"
    }

    fn on_attach(&mut self, _object: &Object) {
        // The material logs upload failures.
        self.pointer = self.material.add_mesh_instance(&self.mesh).ok();
    }

    fn on_remove(&mut self, _object: &Object) {
        if self.pointer.take().is_some() {
            self.material.remove_mesh_instance(&self.mesh);
        }
    }
}
