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

//! Objects, their attachments and worlds.

mod camera;
mod mesh_renderer;
mod object;
mod transform;
mod world;

pub use camera::{Camera, CameraData};
pub use mesh_renderer::MeshRenderer;
pub use object::{Object, ObjectAttachable};
pub use transform::{Transform, TransformChanges};
pub use world::{World, WorldExtension};
