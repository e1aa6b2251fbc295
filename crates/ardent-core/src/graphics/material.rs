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

use super::arena::{ByteRange, GraphicMemoryArena};
use super::mesh::Mesh;
use super::shader::Shader;
use super::vertex_layout::RenderVertexLayout;
use crate::error::ResourceError;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Where a mesh lives inside a vertex layout's arenas, and how many renderers use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshPointer {
    /// Vertex data range.
    pub vertices: ByteRange,
    /// Index data range.
    pub indices: ByteRange,
    /// Number of live instances.
    pub instances: u32,
}

struct StoredMesh {
    mesh: Arc<Mesh>,
    pointer: MeshPointer,
}

/// A shader bound to a vertex layout, plus the meshes drawn with it.
///
/// Meshes are uploaded once per distinct `Arc<Mesh>` and reference counted: adding
/// the same mesh again only bumps its count, and the arena ranges are released when
/// the count drops back to zero.
pub struct RenderMaterial {
    name: String,
    layout: Arc<RenderVertexLayout>,
    shader: Option<Shader>,
    meshes: Mutex<HashMap<usize, StoredMesh>>,
    instance: InstanceHandle,
}

fn mesh_key(mesh: &Arc<Mesh>) -> usize {
    Arc::as_ptr(mesh) as usize
}

impl RenderMaterial {
    /// Creates a material and registers it with the instance.
    pub fn new(
        instance: &InstanceContext,
        name: impl Into<String>,
        layout: Arc<RenderVertexLayout>,
        shader: Option<Shader>,
    ) -> Arc<Self> {
        instance.attach(Self {
            name: name.into(),
            layout,
            shader,
            meshes: Mutex::new(HashMap::new()),
            instance: instance.handle(),
        })
    }

    /// The material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vertex layout meshes are pooled in.
    pub fn layout(&self) -> &Arc<RenderVertexLayout> {
        &self.layout
    }

    /// The shader, if any.
    pub fn shader(&self) -> Option<&Shader> {
        self.shader.as_ref()
    }

    /// Registers one instance of `mesh`.
    ///
    /// The first registration allocates and uploads the vertex and index data; later
    /// ones for the same `Arc` only increment the instance count. Mesh contents are
    /// not compared.
    pub fn add_mesh_instance(&self, mesh: &Arc<Mesh>) -> Result<MeshPointer, ResourceError> {
        let mut meshes = self.meshes.lock().unwrap();
        if let Some(stored) = meshes.get_mut(&mesh_key(mesh)) {
            stored.pointer.instances += 1;
            return Ok(stored.pointer);
        }

        let pointer = self.upload(mesh).map_err(|e| {
            self.instance.log(
                format!(
                    "Material '{}' could not upload mesh '{}': {e}",
                    self.name,
                    mesh.name()
                ),
                Severity::Error,
            );
            e
        })?;
        meshes.insert(
            mesh_key(mesh),
            StoredMesh {
                mesh: Arc::clone(mesh),
                pointer,
            },
        );
        Ok(pointer)
    }

    /// Unregisters one instance of `mesh`, releasing its arena ranges with the last.
    ///
    /// Removing a mesh that was never added logs an error and changes nothing.
    pub fn remove_mesh_instance(&self, mesh: &Arc<Mesh>) -> bool {
        let mut meshes = self.meshes.lock().unwrap();
        let key = mesh_key(mesh);
        let Some(stored) = meshes.get_mut(&key) else {
            self.instance.log(
                format!(
                    "Mesh '{}' is not registered in material '{}'.",
                    mesh.name(),
                    self.name
                ),
                Severity::Error,
            );
            return false;
        };
        stored.pointer.instances -= 1;
        if stored.pointer.instances == 0 {
            if let Some(stored) = meshes.remove(&key) {
                self.release(&stored.pointer);
            }
        }
        true
    }

    /// Where `mesh` is stored, if it is registered.
    pub fn mesh_pointer(&self, mesh: &Arc<Mesh>) -> Option<MeshPointer> {
        self.meshes
            .lock()
            .unwrap()
            .get(&mesh_key(mesh))
            .map(|s| s.pointer)
    }

    /// Number of distinct registered meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.lock().unwrap().len()
    }

    /// The registered meshes with their storage.
    pub fn meshes(&self) -> Vec<(Arc<Mesh>, MeshPointer)> {
        self.meshes
            .lock()
            .unwrap()
            .values()
            .map(|s| (Arc::clone(&s.mesh), s.pointer))
            .collect()
    }

    fn upload(&self, mesh: &Mesh) -> Result<MeshPointer, ResourceError> {
        let vertex_arena = self.layout.vertex_arena();
        let index_arena = self.layout.index_arena();

        let vertices = reserve(vertex_arena, mesh.vertex_bytes().len() as u64)?;
        let indices = match reserve(index_arena, mesh.index_bytes().len() as u64) {
            Ok(range) => range,
            Err(e) => {
                self.release_range(vertex_arena, vertices);
                return Err(e);
            }
        };
        let pointer = MeshPointer {
            vertices,
            indices,
            instances: 1,
        };
        let uploaded = write(vertex_arena, vertices, mesh.vertex_bytes())
            .and_then(|_| write(index_arena, indices, mesh.index_bytes()));
        if let Err(e) = uploaded {
            self.release(&pointer);
            return Err(e);
        }
        Ok(pointer)
    }

    fn release(&self, pointer: &MeshPointer) {
        self.release_range(self.layout.vertex_arena(), pointer.vertices);
        self.release_range(self.layout.index_arena(), pointer.indices);
    }

    fn release_range(&self, arena: &GraphicMemoryArena, range: ByteRange) {
        if range.size == 0 {
            return;
        }
        if let Err(e) = arena.release(range) {
            self.instance.log(
                format!("Material '{}' failed to release {range:?}: {e}", self.name),
                Severity::Warning,
            );
        }
    }
}

// Empty vertex or index lists take no arena space.
fn reserve(arena: &GraphicMemoryArena, size: u64) -> Result<ByteRange, ResourceError> {
    if size == 0 {
        return Ok(ByteRange::new(0, 0));
    }
    arena.allocate(size)
}

fn write(arena: &GraphicMemoryArena, range: ByteRange, data: &[u8]) -> Result<(), ResourceError> {
    if range.size == 0 {
        return Ok(());
    }
    arena.update(range, data)
}

impl InstAttachable for RenderMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "RenderMaterial"
    }

    fn on_destroy(&self) {
        let meshes = std::mem::take(&mut *self.meshes.lock().unwrap());
        for stored in meshes.values() {
            self.release(&stored.pointer);
        }
    }
}

impl fmt::Debug for RenderMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderMaterial")
            .field("name", &self.name)
            .field("layout", &self.layout.name())
            .field("meshes", &self.mesh_count())
            .finish()
    }
}
