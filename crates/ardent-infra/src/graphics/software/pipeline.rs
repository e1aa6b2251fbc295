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

use super::resources::{blit_rgba8, encode_color, encode_depth, SoftwareSurface, SoftwareTexture};
use super::trace::{CommandTrace, SoftwareCommand};
use ardent_core::graphics::{
    DrawList, Framebuffer, RenderPipelineBackend, RenderStage, RenderStageKind, Texture, TextureFormat, Window,
};
use ardent_core::math::Color;
use ardent_core::scene::{Object, World};
use std::sync::Arc;

/// Executes pipeline stages against software resources, recording each one.
#[derive(Debug)]
pub struct SoftwarePipeline {
    label: String,
    trace: CommandTrace,
    attached: bool,
    destroyed: bool,
}

impl SoftwarePipeline {
    /// Creates a delegate recording into `trace`.
    pub fn new(label: impl Into<String>, trace: CommandTrace) -> Self {
        Self {
            label: label.into(),
            trace,
            attached: false,
            destroyed: false,
        }
    }

    /// Whether `on_attach` ran.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether `on_destroy` ran.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn execute_stage(&self, stage: &RenderStage) {
        match &stage.kind {
            RenderStageKind::Clear { target, color, depth } => self.clear(target, *color, *depth),
            RenderStageKind::RenderWorld { world, camera, target } => self.render_world(world, camera, target),
            RenderStageKind::BlitToWindow {
                source,
                window,
                attachment,
            } => self.blit_to_window(source, window, *attachment),
            RenderStageKind::BlitFromWindow {
                window,
                target,
                attachment,
            } => self.blit_from_window(window, target, *attachment),
            RenderStageKind::Compute { material, workgroups } => {
                self.trace.record(SoftwareCommand::Compute {
                    material: material.name().to_string(),
                    workgroups: *workgroups,
                });
            }
            RenderStageKind::ResizeFramebuffer { target, size } => self.resize(target, size.get()),
            RenderStageKind::ResizeFramebufferToWindow { target, window } => self.resize(target, window.size()),
            RenderStageKind::SwapWindow { window } => self.swap(window),
            RenderStageKind::Hook { label, callback } => {
                callback();
                self.trace.record(SoftwareCommand::Hook { label: label.clone() });
            }
        }
    }

    fn clear(&self, target: &Framebuffer, color: Color, depth: Option<f32>) {
        for texture in target.color_attachments() {
            let pixel = encode_color(color, texture.format());
            fill_texture(texture, &pixel);
        }
        if let (Some(texture), Some(depth)) = (target.depth_attachment(), depth) {
            let pixel = encode_depth(depth, texture.format());
            fill_texture(texture, &pixel);
        }
        self.trace.record(SoftwareCommand::Clear {
            framebuffer: target.label().to_string(),
            color: color.to_rgba8(),
        });
    }

    fn render_world(&self, world: &World, camera: &Object, target: &Framebuffer) {
        let draws = DrawList::gather(world, camera, target.size());
        if let Some(graphic) = world.instance().upgrade().and_then(|i| i.graphic()) {
            if !draws.upload(&graphic) {
                log::warn!("Pipeline '{}': could not upload the draw data of world '{}'", self.label, world.name());
            }
        }
        let triangles = draws
            .items
            .iter()
            .filter(|item| item.mesh_pointer.is_some())
            .map(|item| item.mesh.triangle_count())
            .sum();
        self.trace.record(SoftwareCommand::DrawWorld {
            world: world.name().to_string(),
            framebuffer: target.label().to_string(),
            draws: draws.len(),
            triangles,
        });
    }

    fn blit_to_window(&self, source: &Framebuffer, window: &Window, attachment: usize) {
        let Some(texture) = rgba8_attachment(source, attachment, &self.label) else {
            return;
        };
        let Ok(pixels) = texture.read() else {
            return;
        };
        let size = texture.size();
        let drawn = window.with_backend(|backend| {
            (*backend)
                .as_any_mut()
                .downcast_mut::<SoftwareSurface>()
                .map(|surface| surface.draw(&pixels, size))
                .is_some()
        });
        if drawn == Some(true) {
            self.trace.record(SoftwareCommand::BlitToWindow {
                framebuffer: source.label().to_string(),
                window: window.id(),
            });
        }
    }

    fn blit_from_window(&self, window: &Window, target: &Framebuffer, attachment: usize) {
        let Some(texture) = rgba8_attachment(target, attachment, &self.label) else {
            return;
        };
        let surface = window
            .with_backend(|backend| {
                (*backend)
                    .as_any()
                    .downcast_ref::<SoftwareSurface>()
                    .map(|surface| (surface.back_buffer().to_vec(), surface.size()))
            })
            .flatten();
        let Some((pixels, size)) = surface else {
            return;
        };
        let target_size = texture.size();
        let mut copy = vec![0; target_size.0 as usize * target_size.1 as usize * 4];
        blit_rgba8(&pixels, size, &mut copy, target_size);
        match texture.write(&copy) {
            Ok(()) => self.trace.record(SoftwareCommand::BlitFromWindow {
                window: window.id(),
                framebuffer: target.label().to_string(),
            }),
            Err(e) => log::warn!("Pipeline '{}': blit from {} failed: {e}", self.label, window.id()),
        }
    }

    fn resize(&self, target: &Framebuffer, size: (u32, u32)) {
        if size == target.size() || size.0 == 0 || size.1 == 0 {
            return;
        }
        match target.resize(size) {
            Ok(()) => self.trace.record(SoftwareCommand::Resize {
                framebuffer: target.label().to_string(),
                size,
            }),
            Err(e) => log::warn!("Pipeline '{}': resizing '{}' failed: {e}", self.label, target.label()),
        }
    }

    fn swap(&self, window: &Window) {
        let presented = window.with_backend(|backend| {
            (*backend)
                .as_any_mut()
                .downcast_mut::<SoftwareSurface>()
                .map(SoftwareSurface::present)
                .is_some()
        });
        if presented == Some(true) {
            self.trace.record(SoftwareCommand::Swap { window: window.id() });
        }
    }
}

fn fill_texture(texture: &Texture, pixel: &[u8]) {
    texture.with_backend(|backend| {
        if let Some(texture) = (*backend).as_any_mut().downcast_mut::<SoftwareTexture>() {
            texture.fill(pixel);
        }
    });
}

fn rgba8_attachment<'a>(framebuffer: &'a Framebuffer, index: usize, pipeline: &str) -> Option<&'a Arc<Texture>> {
    let texture = framebuffer.color_attachment(index);
    match texture {
        Some(texture) if texture.format() == TextureFormat::Rgba8 => Some(texture),
        Some(texture) => {
            log::warn!(
                "Pipeline '{pipeline}': can not blit {:?} attachment {index} of '{}'",
                texture.format(),
                framebuffer.label()
            );
            None
        }
        None => {
            log::warn!(
                "Pipeline '{pipeline}': framebuffer '{}' has no color attachment {index}",
                framebuffer.label()
            );
            None
        }
    }
}

impl RenderPipelineBackend for SoftwarePipeline {
    fn on_attach(&mut self, stages: &[RenderStage]) {
        self.attached = true;
        log::debug!("Software pipeline '{}' attached with {} stages", self.label, stages.len());
    }

    fn on_execute(&mut self, stages: &[RenderStage]) {
        for stage in stages {
            self.execute_stage(stage);
        }
    }

    fn on_destroy(&mut self) {
        self.destroyed = true;
    }
}
