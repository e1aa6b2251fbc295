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

//! Render stages: the steps of a pipeline's fixed execution sequence.

use super::framebuffer::Framebuffer;
use super::material::RenderMaterial;
use super::window::Window;
use crate::math::Color;
use crate::scene::{Object, World};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A user callback run by a [`RenderStageKind::Hook`] stage.
pub type StageHook = Arc<dyn Fn() + Send + Sync>;

/// A size the caller can change while a pipeline is running.
#[derive(Debug, Clone, Default)]
pub struct SharedSize(Arc<Mutex<(u32, u32)>>);

impl SharedSize {
    /// Creates a shared size.
    pub fn new(size: (u32, u32)) -> Self {
        Self(Arc::new(Mutex::new(size)))
    }

    /// Replaces the size.
    pub fn set(&self, size: (u32, u32)) {
        *self.0.lock().unwrap() = size;
    }

    /// The current size.
    pub fn get(&self) -> (u32, u32) {
        *self.0.lock().unwrap()
    }
}

/// The discriminant of a [`RenderStageKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RenderStageType {
    Clear,
    BlitToWindow,
    BlitFromWindow,
    RenderWorld,
    Compute,
    ResizeFramebuffer,
    ResizeFramebufferToWindow,
    SwapWindow,
    Hook,
}

/// What a stage does, with the resources it works on.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum RenderStageKind {
    /// Clears every color attachment of `target` to `color`, and its depth attachment
    /// to `depth` when given.
    Clear {
        target: Arc<Framebuffer>,
        color: Color,
        depth: Option<f32>,
    },
    /// Copies a color attachment of `source` onto the window surface.
    BlitToWindow {
        source: Arc<Framebuffer>,
        window: Arc<Window>,
        attachment: usize,
    },
    /// Copies the window surface into a color attachment of `target`.
    BlitFromWindow {
        window: Arc<Window>,
        target: Arc<Framebuffer>,
        attachment: usize,
    },
    /// Draws every mesh renderer of `world` as seen from `camera` into `target`.
    RenderWorld {
        world: Arc<World>,
        camera: Arc<Object>,
        target: Arc<Framebuffer>,
    },
    /// Dispatches the material's shader with the given workgroup counts.
    Compute {
        material: Arc<RenderMaterial>,
        workgroups: [u32; 3],
    },
    /// Resizes `target` whenever `size` changes.
    ResizeFramebuffer {
        target: Arc<Framebuffer>,
        size: SharedSize,
    },
    /// Keeps `target` the size of `window`.
    ResizeFramebufferToWindow {
        target: Arc<Framebuffer>,
        window: Arc<Window>,
    },
    /// Presents the window surface.
    SwapWindow { window: Arc<Window> },
    /// Runs a user callback.
    Hook { label: String, callback: StageHook },
}

/// One step of a render pipeline.
#[derive(Clone)]
pub struct RenderStage {
    /// What the stage does.
    pub kind: RenderStageKind,
    /// Free-form integer parameters forwarded to the backend.
    pub params: [i32; 3],
}

impl RenderStage {
    fn from_kind(kind: RenderStageKind) -> Self {
        Self { kind, params: [0; 3] }
    }

    /// Clears `target`.
    pub fn clear(target: &Arc<Framebuffer>, color: Color, depth: Option<f32>) -> Self {
        Self::from_kind(RenderStageKind::Clear {
            target: Arc::clone(target),
            color,
            depth,
        })
    }

    /// Copies color attachment `attachment` of `source` onto `window`.
    pub fn blit_to_window(source: &Arc<Framebuffer>, window: &Arc<Window>, attachment: usize) -> Self {
        Self::from_kind(RenderStageKind::BlitToWindow {
            source: Arc::clone(source),
            window: Arc::clone(window),
            attachment,
        })
    }

    /// Copies `window` into color attachment `attachment` of `target`.
    pub fn blit_from_window(window: &Arc<Window>, target: &Arc<Framebuffer>, attachment: usize) -> Self {
        Self::from_kind(RenderStageKind::BlitFromWindow {
            window: Arc::clone(window),
            target: Arc::clone(target),
            attachment,
        })
    }

    /// Draws `world` from `camera` into `target`.
    pub fn render_world(world: &Arc<World>, camera: &Arc<Object>, target: &Arc<Framebuffer>) -> Self {
        Self::from_kind(RenderStageKind::RenderWorld {
            world: Arc::clone(world),
            camera: Arc::clone(camera),
            target: Arc::clone(target),
        })
    }

    /// Dispatches `material`.
    pub fn compute(material: &Arc<RenderMaterial>, workgroups: [u32; 3]) -> Self {
        Self::from_kind(RenderStageKind::Compute {
            material: Arc::clone(material),
            workgroups,
        })
    }

    /// Resizes `target` to follow `size`.
    pub fn resize_framebuffer(target: &Arc<Framebuffer>, size: SharedSize) -> Self {
        Self::from_kind(RenderStageKind::ResizeFramebuffer {
            target: Arc::clone(target),
            size,
        })
    }

    /// Resizes `target` to follow `window`.
    pub fn resize_to_window(target: &Arc<Framebuffer>, window: &Arc<Window>) -> Self {
        Self::from_kind(RenderStageKind::ResizeFramebufferToWindow {
            target: Arc::clone(target),
            window: Arc::clone(window),
        })
    }

    /// Presents `window`.
    pub fn swap_window(window: &Arc<Window>) -> Self {
        Self::from_kind(RenderStageKind::SwapWindow {
            window: Arc::clone(window),
        })
    }

    /// Runs `callback` at this point of the sequence.
    pub fn hook(label: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::from_kind(RenderStageKind::Hook {
            label: label.into(),
            callback: Arc::new(callback),
        })
    }

    /// Replaces the backend parameters.
    pub fn with_params(mut self, params: [i32; 3]) -> Self {
        self.params = params;
        self
    }

    /// The stage discriminant.
    pub fn stage_type(&self) -> RenderStageType {
        match &self.kind {
            RenderStageKind::Clear { .. } => RenderStageType::Clear,
            RenderStageKind::BlitToWindow { .. } => RenderStageType::BlitToWindow,
            RenderStageKind::BlitFromWindow { .. } => RenderStageType::BlitFromWindow,
            RenderStageKind::RenderWorld { .. } => RenderStageType::RenderWorld,
            RenderStageKind::Compute { .. } => RenderStageType::Compute,
            RenderStageKind::ResizeFramebuffer { .. } => RenderStageType::ResizeFramebuffer,
            RenderStageKind::ResizeFramebufferToWindow { .. } => RenderStageType::ResizeFramebufferToWindow,
            RenderStageKind::SwapWindow { .. } => RenderStageType::SwapWindow,
            RenderStageKind::Hook { .. } => RenderStageType::Hook,
        }
    }

    /// Every framebuffer the stage touches.
    pub fn framebuffers(&self) -> Vec<&Arc<Framebuffer>> {
        match &self.kind {
            RenderStageKind::Clear { target, .. }
            | RenderStageKind::BlitFromWindow { target, .. }
            | RenderStageKind::RenderWorld { target, .. }
            | RenderStageKind::ResizeFramebuffer { target, .. }
            | RenderStageKind::ResizeFramebufferToWindow { target, .. } => vec![target],
            RenderStageKind::BlitToWindow { source, .. } => vec![source],
            RenderStageKind::Compute { .. }
            | RenderStageKind::SwapWindow { .. }
            | RenderStageKind::Hook { .. } => Vec::new(),
        }
    }

    /// Every window the stage touches.
    pub fn windows(&self) -> Vec<&Arc<Window>> {
        match &self.kind {
            RenderStageKind::BlitToWindow { window, .. }
            | RenderStageKind::BlitFromWindow { window, .. }
            | RenderStageKind::ResizeFramebufferToWindow { window, .. }
            | RenderStageKind::SwapWindow { window } => vec![window],
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RenderStage");
        s.field("type", &self.stage_type());
        match &self.kind {
            RenderStageKind::Hook { label, .. } => {
                s.field("label", label);
            }
            RenderStageKind::Compute { material, workgroups } => {
                s.field("material", &material.name()).field("workgroups", workgroups);
            }
            _ => {
                let framebuffers: Vec<_> = self.framebuffers().iter().map(|fb| fb.label().to_string()).collect();
                let windows: Vec<_> = self.windows().iter().map(|w| w.id()).collect();
                s.field("framebuffers", &framebuffers).field("windows", &windows);
            }
        }
        s.field("params", &self.params).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_size_is_shared() {
        let size = SharedSize::new((1, 2));
        let other = size.clone();
        other.set((3, 4));
        assert_eq!(size.get(), (3, 4));
    }

    #[test]
    fn hook_touches_no_resources() {
        let stage = RenderStage::hook("overlay", || {}).with_params([1, 2, 3]);
        assert_eq!(stage.stage_type(), RenderStageType::Hook);
        assert!(stage.framebuffers().is_empty());
        assert!(stage.windows().is_empty());
        assert_eq!(stage.params, [1, 2, 3]);
        assert!(format!("{stage:?}").contains("overlay"));
    }
}
