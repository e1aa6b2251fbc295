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

use bytemuck::{Pod, Zeroable};

/// One vertex of the baseline schema.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub texcoord: [f32; 2],
    /// Object-space normal.
    pub normal: [f32; 3],
}

impl Vertex {
    /// Creates a vertex.
    pub const fn new(position: [f32; 3], texcoord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// CPU-side mesh data.
///
/// Meshes are shared as `Arc<Mesh>`; materials track them by pointer identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh.
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    /// A unit triangle in the XY plane facing +Z.
    pub fn triangle() -> Self {
        let n = [0.0, 0.0, 1.0];
        Self::new(
            "triangle",
            vec![
                Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0], n),
                Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0], n),
                Vertex::new([0.0, 0.5, 0.0], [0.5, 1.0], n),
            ],
            vec![0, 1, 2],
        )
    }

    /// A unit quad in the XY plane facing +Z.
    pub fn quad() -> Self {
        let n = [0.0, 0.0, 1.0];
        Self::new(
            "quad",
            vec![
                Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0], n),
                Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0], n),
                Vertex::new([0.5, 0.5, 0.0], [1.0, 1.0], n),
                Vertex::new([-0.5, 0.5, 0.0], [0.0, 1.0], n),
            ],
            vec![0, 1, 2, 2, 3, 0],
        )
    }

    /// The mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The triangle-list indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The vertex data as bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index data as bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of triangles. A mesh without indices is drawn as a plain triangle list.
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len() / 3
        } else {
            self.indices.len() / 3
        }
    }
}
