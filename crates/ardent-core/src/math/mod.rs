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

//! Math value types used by transforms and GPU upload structs.
//!
//! These are plain `#[repr(C)]` POD types so they can be written into graphic
//! memory arenas with `bytemuck`. All angles are in radians.

pub mod color;
pub mod matrix;
pub mod quaternion;
pub mod vector;

pub use self::color::Color;
pub use self::matrix::Mat4;
pub use self::quaternion::Quaternion;
pub use self::vector::{Vec2, Vec3};

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

/// Returns `true` when `a` and `b` differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
