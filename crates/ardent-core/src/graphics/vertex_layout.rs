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

use super::arena::{ArenaDescriptor, ArenaUsage, GraphicMemoryArena};
use crate::instance::{InstAttachable, InstanceContext};
use std::sync::Arc;

/// Type of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexElementType {
    /// One `f32`.
    Float,
    /// Two `f32`.
    Vec2,
    /// Three `f32`.
    Vec3,
    /// Four `f32`.
    Vec4,
    /// One `u32`.
    UInt,
}

impl VertexElementType {
    /// Size in bytes.
    pub fn size(self) -> u32 {
        match self {
            VertexElementType::Float | VertexElementType::UInt => 4,
            VertexElementType::Vec2 => 8,
            VertexElementType::Vec3 => 12,
            VertexElementType::Vec4 => 16,
        }
    }
}

/// One attribute of the vertex schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Attribute name as shaders see it.
    pub name: &'static str,
    /// Attribute type.
    pub ty: VertexElementType,
    /// Byte offset inside a vertex.
    pub offset: u32,
}

/// The baseline schema: position, texture coordinate, normal.
pub const BASELINE_VERTEX_ELEMENTS: [VertexElement; 3] = [
    VertexElement {
        name: "position",
        ty: VertexElementType::Vec3,
        offset: 0,
    },
    VertexElement {
        name: "texcoord",
        ty: VertexElementType::Vec2,
        offset: 12,
    },
    VertexElement {
        name: "normal",
        ty: VertexElementType::Vec3,
        offset: 20,
    },
];

/// A vertex schema together with the vertex and index arenas every mesh of that
/// schema is pooled in.
#[derive(Debug)]
pub struct RenderVertexLayout {
    name: String,
    elements: Vec<VertexElement>,
    stride: u32,
    vertices: GraphicMemoryArena,
    indices: GraphicMemoryArena,
}

impl RenderVertexLayout {
    /// Creates a baseline-schema layout and registers it with the instance. Both
    /// arenas start at the configured capacity and grow on demand.
    pub fn new(instance: &InstanceContext, name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        let capacity = instance.config().vertex_arena_capacity;
        let vertices = GraphicMemoryArena::new(
            instance,
            ArenaDescriptor::new(format!("{name}.vertices"), capacity, ArenaUsage::Vertex).resizable(),
        );
        let indices = GraphicMemoryArena::new(
            instance,
            ArenaDescriptor::new(format!("{name}.indices"), capacity, ArenaUsage::Index).resizable(),
        );
        let elements = BASELINE_VERTEX_ELEMENTS.to_vec();
        let stride = elements.iter().map(|e| e.ty.size()).sum();
        instance.attach(Self {
            name,
            elements,
            stride,
            vertices,
            indices,
        })
    }

    /// The layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vertex attributes, in offset order.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The arena vertex data is allocated from.
    pub fn vertex_arena(&self) -> &GraphicMemoryArena {
        &self.vertices
    }

    /// The arena index data is allocated from.
    pub fn index_arena(&self) -> &GraphicMemoryArena {
        &self.indices
    }
}

impl InstAttachable for RenderVertexLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "RenderVertexLayout"
    }

    fn on_destroy(&self) {
        self.vertices.on_destroy();
        self.indices.on_destroy();
    }
}
