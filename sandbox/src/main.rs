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

// Ardent Sandbox
// Renders a spinning triangle into a headless window with the software backend.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use ardent_core::event::Key;
use ardent_core::graphics::{
    Framebuffer, Mesh, RenderMaterial, RenderPipeline, RenderStage, RenderVertexLayout, Texture,
    TextureDescriptor, Window,
};
use ardent_core::math::{Color, Quaternion, Vec3};
use ardent_core::platform::WindowSettings;
use ardent_core::scene::{Camera, MeshRenderer, Object, ObjectAttachable, Transform, World};
use ardent_core::{EngineConfig, GraphicsApi, Instance, Platform};
use ardent_infra::{HeadlessWindow, SoftwareBackend, SoftwareCommand};

const RUN_FOR: Duration = Duration::from_secs(2);

/// Turns its object a little every update.
struct Spinner {
    step: Quaternion,
}

impl ObjectAttachable for Spinner {
    fn type_name(&self) -> &'static str {
        "Spinner"
    }

    fn on_update(&mut self, object: &Object) {
        object.rotate(self.step);
    }
}

fn load_config() -> Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(&path).with_context(|| format!("reading config '{path}'")),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = load_config()?;

    let platform = Platform::with_pump_rate(config.event_pump_rate);
    let backend = Arc::new(SoftwareBackend::new());
    platform.register_backend(backend.clone());
    let instance = Instance::new("sandbox", GraphicsApi::Software, &platform, config);

    // --- Window and render targets ---
    let os = HeadlessWindow::new();
    let input = os.handle();
    let window = Window::new(&instance, WindowSettings::new("Ardent Sandbox", 320, 180), Box::new(os))?;
    if !instance.sync_graphic_setup() {
        bail!("graphics setup did not complete");
    }
    let size = window.size();
    let color = Texture::new(&instance, TextureDescriptor::render_target("scene.color", size));
    let depth = Texture::new(&instance, TextureDescriptor::depth_target("scene.depth", size));
    let framebuffer = Framebuffer::new(&instance, "scene", vec![color], Some(depth))?;

    // --- Scene ---
    let layout = RenderVertexLayout::new(&instance, "baseline");
    let material = RenderMaterial::new(&instance, "unlit", layout, None);
    let world = World::new(&instance, "demo");
    let camera = Object::new(&instance, "camera", Transform::from_position(Vec3::new(0.0, 0.0, 3.0)));
    camera.add_attachment(Camera::default());
    let triangle = Object::new(&instance, "triangle", Transform::default());
    triangle.add_attachment(MeshRenderer::new(Arc::new(Mesh::triangle()), material));
    triangle.add_attachment(Spinner {
        step: Quaternion::from_axis_angle(Vec3::Y, 0.02),
    });
    world.add_object(&camera)?;
    world.add_object(&triangle)?;

    // --- Pipeline ---
    let stages = [
        RenderStage::resize_to_window(&framebuffer, &window),
        RenderStage::clear(&framebuffer, Color::new(0.1, 0.1, 0.15, 1.0), Some(1.0)),
        RenderStage::render_world(&world, &camera, &framebuffer),
        RenderStage::blit_to_window(&framebuffer, &window, 0),
        RenderStage::swap_window(&window),
    ];
    let pipeline = RenderPipeline::new(&instance, "main", &stages, true);

    let started = Instant::now();
    input.press_key(Key::Space);
    input.resize(640, 360);
    while started.elapsed() < RUN_FOR && window.is_open() {
        thread::sleep(Duration::from_millis(50));
    }
    log::info!(
        "Space held: {}, window size: {:?}",
        instance.is_key_pressed(Key::Space),
        window.size()
    );

    input.request_close();
    while window.is_open() && started.elapsed() < RUN_FOR * 2 {
        thread::sleep(Duration::from_millis(10));
    }
    pipeline.stop();

    let commands = backend.trace().take();
    let frames = commands
        .iter()
        .filter(|c| matches!(c, SoftwareCommand::Swap { .. }))
        .count();
    log::info!(
        "Pipeline '{}' ran {} times and presented {frames} frames ({} commands recorded)",
        pipeline.label(),
        pipeline.executions(),
        commands.len()
    );
    Ok(())
}
