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

//! Integration tests for render pipelines executed by the software backend into
//! headless windows.

mod common;

use ardent_core::graphics::{
    Framebuffer, Mesh, RenderMaterial, RenderPipeline, RenderStage, RenderVertexLayout, SharedSize, Texture,
    TextureDescriptor, Window,
};
use ardent_core::math::{Color, Vec3};
use ardent_core::platform::WindowSettings;
use ardent_core::scene::{Camera, CameraData, MeshRenderer, Object, Transform, World};
use ardent_core::{GraphicsApi, Severity};
use ardent_infra::graphics::software::SoftwareSurface;
use ardent_infra::{HeadlessHandle, HeadlessWindow, SoftwareCommand};
use common::{harness, wait_for, Harness};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

struct Scene {
    window: Arc<Window>,
    handle: HeadlessHandle,
    framebuffer: Arc<Framebuffer>,
    world: Arc<World>,
    camera: Arc<Object>,
    material: Arc<RenderMaterial>,
}

fn open_window(h: &Harness, title: &str, size: (u32, u32)) -> (Arc<Window>, HeadlessHandle) {
    let os = HeadlessWindow::new();
    let handle = os.handle();
    let window = Window::new(&h.instance, WindowSettings::new(title, size.0, size.1), Box::new(os))
        .expect("headless window should open");
    (window, handle)
}

fn build_scene(h: &Harness) -> Scene {
    let (window, handle) = open_window(h, "main", (8, 8));
    let color = Texture::new(&h.instance, TextureDescriptor::render_target("scene.color", (8, 8)));
    let depth = Texture::new(&h.instance, TextureDescriptor::depth_target("scene.depth", (8, 8)));
    let framebuffer = Framebuffer::new(&h.instance, "scene", vec![color], Some(depth)).unwrap();

    let layout = RenderVertexLayout::new(&h.instance, "baseline");
    let material = RenderMaterial::new(&h.instance, "unlit", layout, None);

    let world = World::new(&h.instance, "level");
    let camera = Object::new(&h.instance, "camera", Transform::from_position(Vec3::new(0.0, 0.0, 5.0)));
    camera.add_attachment(Camera::default());
    let triangle = Object::new(&h.instance, "triangle", Transform::default());
    triangle.add_attachment(MeshRenderer::new(Arc::new(Mesh::triangle()), Arc::clone(&material)));
    world.add_object(&camera).unwrap();
    world.add_object(&triangle).unwrap();

    Scene {
        window,
        handle,
        framebuffer,
        world,
        camera,
        material,
    }
}

fn front_buffer(window: &Window) -> Vec<u8> {
    window
        .with_backend(|backend| {
            (*backend)
                .as_any()
                .downcast_ref::<SoftwareSurface>()
                .map(|surface| surface.front_buffer().to_vec())
        })
        .flatten()
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage execution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stages_execute_in_declaration_order() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let stages = [
        RenderStage::clear(&scene.framebuffer, RED, Some(1.0)),
        RenderStage::render_world(&scene.world, &scene.camera, &scene.framebuffer),
        RenderStage::blit_to_window(&scene.framebuffer, &scene.window, 0),
        RenderStage::swap_window(&scene.window),
    ];
    let pipeline = RenderPipeline::new(&h.instance, "main", &stages, false);
    assert!(!pipeline.is_degraded(), "the software backend provides a delegate");
    h.backend.trace().take();

    pipeline.execute_once();
    pipeline.execute_once();

    let commands = h.backend.trace().take();
    assert_eq!(commands.len(), 8, "one command per stage per execution: {commands:?}");
    for tick in commands.chunks(4) {
        assert!(matches!(&tick[0], SoftwareCommand::Clear { framebuffer, color } if framebuffer == "scene" && *color == [255, 0, 0, 255]));
        assert!(matches!(
            &tick[1],
            SoftwareCommand::DrawWorld { world, draws: 1, triangles: 1, .. } if world == "level"
        ));
        assert!(matches!(&tick[2], SoftwareCommand::BlitToWindow { window, .. } if *window == scene.window.id()));
        assert!(matches!(&tick[3], SoftwareCommand::Swap { window } if *window == scene.window.id()));
    }
    assert_eq!(pipeline.executions(), 2);
}

#[test]
fn test_render_world_uploads_camera_block() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let pipeline = RenderPipeline::new(
        &h.instance,
        "camera",
        &[RenderStage::render_world(&scene.world, &scene.camera, &scene.framebuffer)],
        false,
    );
    pipeline.execute_once();

    let graphic = h.instance.graphic().expect("the window initialized graphics");
    let bytes = graphic
        .camera_buffer()
        .get(0, std::mem::size_of::<CameraData>() as u64)
        .unwrap();
    let data: CameraData = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(data.position, [0.0, 0.0, 5.0, 1.0]);

    let renderer_pointer = scene
        .world
        .object("triangle")
        .and_then(|o| o.with_attachment::<MeshRenderer, _>(|r| r.mesh_pointer()))
        .flatten();
    assert!(renderer_pointer.is_some(), "attaching the renderer registers its mesh");
    assert_eq!(scene.material.mesh_count(), 1);
}

#[test]
fn test_swap_presents_cleared_color() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let stages = [
        RenderStage::clear(&scene.framebuffer, RED, None),
        RenderStage::blit_to_window(&scene.framebuffer, &scene.window, 0),
        RenderStage::swap_window(&scene.window),
    ];
    let pipeline = RenderPipeline::new(&h.instance, "present", &stages, false);
    assert!(front_buffer(&scene.window).iter().all(|&b| b == 0));

    pipeline.execute_once();

    let front = front_buffer(&scene.window);
    assert_eq!(front.len(), 8 * 8 * 4);
    assert!(front.chunks(4).all(|px| px == [255, 0, 0, 255]), "every pixel should be red");
}

#[test]
fn test_blit_requires_existing_attachment() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let pipeline = RenderPipeline::new(
        &h.instance,
        "bad-blit",
        &[RenderStage::blit_to_window(&scene.framebuffer, &scene.window, 3)],
        false,
    );
    h.backend.trace().take();
    pipeline.execute_once();
    assert!(h.backend.trace().is_empty(), "a missing attachment is skipped");
}

#[test]
fn test_resize_stages_follow_their_source() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let size = SharedSize::new((8, 8));
    let stages = [
        RenderStage::resize_framebuffer(&scene.framebuffer, size.clone()),
        RenderStage::resize_to_window(&scene.framebuffer, &scene.window),
    ];
    let pipeline = RenderPipeline::new(&h.instance, "resize", &stages, false);
    h.backend.trace().take();

    pipeline.execute_once();
    assert!(h.backend.trace().is_empty(), "unchanged sizes do nothing");

    size.set((4, 2));
    pipeline.execute_once();
    let commands = h.backend.trace().take();
    assert_eq!(
        commands,
        vec![
            SoftwareCommand::Resize {
                framebuffer: "scene".into(),
                size: (4, 2)
            },
            SoftwareCommand::Resize {
                framebuffer: "scene".into(),
                size: (8, 8)
            },
        ]
    );
    assert_eq!(scene.framebuffer.size(), (8, 8));
}

#[test]
fn test_window_resize_reaches_surface() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    scene.handle.resize(16, 4);
    assert!(
        wait_for(|| {
            h.instance.update_elements();
            scene.window.size() == (16, 4)
        }),
        "the pump should deliver the resize and the window update apply it"
    );
    let surface_size = scene
        .window
        .with_backend(|backend| {
            (*backend)
                .as_any()
                .downcast_ref::<SoftwareSurface>()
                .map(SoftwareSurface::size)
        })
        .flatten();
    assert_eq!(surface_size, Some((16, 4)));
}

#[test]
fn test_hooks_run_on_each_execution() {
    let h = harness(GraphicsApi::Software);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let pipeline = RenderPipeline::new(
        &h.instance,
        "hooks",
        &[RenderStage::hook("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })],
        false,
    );
    for _ in 0..3 {
        pipeline.execute_once();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.backend.trace().len(), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Threading
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_start_and_stop_are_idempotent() {
    let h = harness(GraphicsApi::Software);
    let pipeline = RenderPipeline::new(&h.instance, "threaded", &[RenderStage::hook("tick", || {})], false);
    pipeline.set_rate(500.0);

    pipeline.start();
    pipeline.start();
    assert!(pipeline.is_running());
    assert_eq!(pipeline.thread_spawns(), 1, "a second start must not spawn a thread");
    assert!(wait_for(|| pipeline.executions() >= 2));

    pipeline.stop();
    pipeline.stop();
    assert!(!pipeline.is_running());
    let executions = pipeline.executions();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(pipeline.executions(), executions, "a stopped pipeline does not execute");
}

#[test]
fn test_pipeline_without_backend_degrades() {
    let h = harness(GraphicsApi::OpenGl);
    let pipeline = RenderPipeline::new(&h.instance, "nothing", &[RenderStage::hook("noop", || {})], false);
    assert!(pipeline.is_degraded());
    assert_eq!(h.sink.count(Severity::CriticalWarning), 1);
    pipeline.execute_once();
    assert!(h.backend.trace().is_empty());
}

#[test]
fn test_destroy_releases_references() {
    let h = harness(GraphicsApi::Software);
    let scene = build_scene(&h);
    let pipeline = RenderPipeline::new(
        &h.instance,
        "refs",
        &[
            RenderStage::clear(&scene.framebuffer, RED, None),
            RenderStage::swap_window(&scene.window),
        ],
        false,
    );
    assert!(scene.framebuffer.references().contains(pipeline.id()));
    assert!(scene.window.references().contains(pipeline.id()));

    pipeline.destroy();
    assert_eq!(scene.framebuffer.references().count(), 0);
    assert_eq!(scene.window.references().count(), 0);
}
