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
use crate::math::Mat4;

/// The per-frame camera block shaders read from the camera buffer.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct CameraData {
    /// World to view space.
    pub view: Mat4,
    /// View to clip space.
    pub projection: Mat4,
    /// Eye position in world space, `w = 1`.
    pub position: [f32; 4],
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A perspective camera. Its object's global transform places the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view, in radians.
    pub fov_y: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Width over height.
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Creates a camera.
    pub fn new(fov_y: f32, near: f32, far: f32, aspect: f32) -> Self {
        Self {
            fov_y,
            near,
            far,
            aspect,
        }
    }

    /// Derives the aspect ratio from a target size. Zero heights are ignored.
    pub fn fit_to(&mut self, size: (u32, u32)) {
        if size.1 > 0 {
            self.aspect = size.0 as f32 / size.1 as f32;
        }
    }

    /// The projection matrix.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    /// The camera block for an eye placed by `object`.
    pub fn data(&self, object: &Object) -> CameraData {
        let position = object.global_position();
        CameraData {
            view: Mat4::view(position, object.global_rotation()),
            projection: self.projection(),
            position: [position.x, position.y, position.z, 1.0],
        }
    }
}

impl ObjectAttachable for Camera {
    fn type_name(&self) -> &'static str {
        "Camera"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GraphicsApi;
    use crate::config::EngineConfig;
    use crate::instance::Instance;
    use crate::math::Vec3;
    use crate::platform::Platform;
    use crate::scene::Transform;
    use approx::assert_abs_diff_eq;

    #[test]
    fn camera_block_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<CameraData>(), 144);
    }

    #[test]
    fn data_follows_the_object() {
        let mut instance = Instance::new("camera", GraphicsApi::None, &Platform::new(), EngineConfig::default());
        instance.stop_updates();
        let eye = Object::new(&instance, "eye", Transform::from_position(Vec3::new(0.0, 0.0, 5.0)));
        let data = Camera::default().data(&eye);
        assert_eq!(data.position, [0.0, 0.0, 5.0, 1.0]);
        let origin = data.view.transform_point(Vec3::ZERO);
        assert_abs_diff_eq!(origin.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn fit_to_ignores_empty_targets() {
        let mut camera = Camera::default();
        camera.fit_to((800, 400));
        assert_abs_diff_eq!(camera.aspect, 2.0);
        camera.fit_to((800, 0));
        assert_abs_diff_eq!(camera.aspect, 2.0);
    }
}
