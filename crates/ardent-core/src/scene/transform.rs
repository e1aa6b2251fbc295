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

use crate::math::{Mat4, Quaternion, Vec3};

/// Position, rotation and scale of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Rotation.
    pub rotation: Quaternion,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a transform.
    pub fn new(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// A pure translation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// A rotation given as Euler angles in radians, applied X, then Y, then Z.
    pub fn from_euler(position: Vec3, x: f32, y: f32, z: f32) -> Self {
        Self {
            position,
            rotation: Quaternion::from_euler(x, y, z),
            ..Self::default()
        }
    }

    /// The local model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_trs(self.position, self.rotation, self.scale)
    }
}

/// Which parts of a transform changed since the last update tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformChanges {
    /// The position changed.
    pub moved: bool,
    /// The rotation changed.
    pub rotated: bool,
    /// The scale changed.
    pub scaled: bool,
}

impl TransformChanges {
    /// Whether anything changed.
    pub fn any(&self) -> bool {
        self.moved || self.rotated || self.scaled
    }
}
