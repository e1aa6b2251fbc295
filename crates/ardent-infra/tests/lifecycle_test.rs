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

//! Integration tests for instance and window lifecycles: event delivery through the
//! platform pump, self-removal of closed windows and the teardown order.

mod common;

use ardent_core::event::{Key, MouseButton};
use ardent_core::graphics::Window;
use ardent_core::logging::MemorySink;
use ardent_core::platform::WindowSettings;
use ardent_core::{EngineConfig, GraphicsApi, InstAttachable, Instance, InstanceHandle, Platform, ResourceError, Severity};
use ardent_infra::{HeadlessInput, HeadlessWindow, SoftwareBackend};
use common::{harness, wait_for};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Counts its updates and flags any that arrive after its destruction.
struct Watchdog {
    name: String,
    instance: InstanceHandle,
    updates: AtomicUsize,
    late_updates: AtomicUsize,
    destroyed: AtomicBool,
}

impl InstAttachable for Watchdog {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Watchdog"
    }

    fn on_update(&self) -> bool {
        if self.destroyed.load(Ordering::SeqCst) {
            self.late_updates.fetch_add(1, Ordering::SeqCst);
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn on_destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.instance
            .log(format!("Watchdog '{}' destroyed.", self.name), Severity::Info);
    }
}

fn headless(h: &common::Harness) -> (Arc<Window>, ardent_infra::HeadlessHandle) {
    let os = HeadlessWindow::new();
    let handle = os.handle();
    let window = Window::new(&h.instance, WindowSettings::new("main", 32, 24), Box::new(os)).unwrap();
    (window, handle)
}

// ─────────────────────────────────────────────────────────────────────────────
// Windows
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_window_initializes_graphics_and_pump() {
    let h = harness(GraphicsApi::Software);
    assert!(!h.instance.has_graphic());
    let (window, handle) = headless(&h);

    assert!(handle.is_open());
    assert_eq!(window.size(), (32, 24));
    assert!(h.backend.has_context());
    assert!(h.instance.has_graphic());
    assert_eq!(h.platform.window_count(), 1);
    assert!(h.platform.is_pump_running());
    assert!(h.instance.sync_graphic_setup(), "the pump renders a first frame");
}

#[test]
fn test_sync_setup_without_graphics_returns_false() {
    let h = harness(GraphicsApi::None);
    assert!(!h.instance.sync_graphic_setup());
}

#[test]
fn test_refused_window_is_fatal() {
    let h = harness(GraphicsApi::Software);
    let result = Window::new(
        &h.instance,
        WindowSettings::new("nope", 8, 8),
        Box::new(HeadlessWindow::refusing()),
    );
    assert!(matches!(result, Err(ResourceError::BackendError(_))));
    assert_eq!(h.sink.count(Severity::FatalError), 1);
    assert_eq!(h.platform.window_count(), 0);
}

#[test]
fn test_missing_backend_fails_window_creation() {
    let h = harness(GraphicsApi::Vulkan);
    let os = HeadlessWindow::new();
    let handle = os.handle();
    let result = Window::new(&h.instance, WindowSettings::new("vk", 8, 8), Box::new(os));
    assert!(result.is_err());
    assert!(!handle.is_open(), "the OS window is closed again");
    assert!(h
        .sink
        .messages()
        .iter()
        .any(|m| m.contains("marked as supported but has no implementation")));
}

#[test]
fn test_close_request_removes_window() {
    let h = harness(GraphicsApi::Software);
    let (window, handle) = headless(&h);
    handle.request_close();

    assert!(
        wait_for(|| {
            h.instance.update_elements();
            !window.is_open()
        }),
        "the close request should reach the window"
    );
    assert!(!handle.is_open());
    assert_eq!(h.platform.window_count(), 0);
    assert!(wait_for(|| !h.platform.is_pump_running()), "the last window stops the pump");
    assert!(!h.instance.element_names().iter().any(|n| n == "main"));
    assert!(h.sink.messages().contains(&"Closed window 'main'.".to_string()));
}

#[test]
fn test_input_reaches_instance_state() {
    let h = harness(GraphicsApi::Software);
    let (_window, handle) = headless(&h);

    handle.press_key(Key::character('W'));
    handle.move_mouse(5.0, 7.0);
    handle.send(HeadlessInput::MouseButton {
        button: MouseButton::Left,
        pressed: true,
    });
    assert!(wait_for(|| {
        let input = h.instance.input();
        input.keyboard.is_pressed(Key::Character('w')) && input.mouse.is_pressed(MouseButton::Left)
    }));
    let mouse = h.instance.input().mouse;
    assert_eq!((mouse.position.x, mouse.position.y), (5.0, 7.0));
    assert_eq!(handle.cursor(), (5.0, 7.0));

    handle.release_key(Key::Character('w'));
    assert!(wait_for(|| !h.instance.is_key_pressed(Key::Character('w'))));
}

// ─────────────────────────────────────────────────────────────────────────────
// Teardown
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_teardown_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = Platform::with_pump_rate(500.0);
    platform.register_backend(Arc::new(SoftwareBackend::new()));
    let sink = MemorySink::new();
    let config = EngineConfig {
        update_rate: 1000.0,
        ..EngineConfig::default()
    };
    let instance = Instance::with_log_sink("doomed", GraphicsApi::Software, &platform, config, Box::new(sink.clone()));

    let os = HeadlessWindow::new();
    let handle = os.handle();
    Window::new(&instance, WindowSettings::new("main", 8, 8), Box::new(os)).unwrap();
    let watchdog = instance.attach(Watchdog {
        name: "dog".into(),
        instance: instance.handle(),
        updates: AtomicUsize::new(0),
        late_updates: AtomicUsize::new(0),
        destroyed: AtomicBool::new(false),
    });
    assert!(wait_for(|| watchdog.updates.load(Ordering::SeqCst) > 0), "the update thread runs");

    drop(instance);
    let updates = watchdog.updates.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(10));

    assert!(watchdog.destroyed.load(Ordering::SeqCst));
    assert_eq!(watchdog.late_updates.load(Ordering::SeqCst), 0);
    assert_eq!(watchdog.updates.load(Ordering::SeqCst), updates, "nothing updates after teardown");
    assert!(!handle.is_open());
    assert_eq!(platform.window_count(), 0);

    let messages = sink.messages();
    let position = |text: &str| {
        messages
            .iter()
            .position(|m| m == text)
            .unwrap_or_else(|| panic!("missing log line {text:?} in {messages:?}"))
    };
    let closed = position("Closed window 'main'.");
    let dog = position("Watchdog 'dog' destroyed.");
    let destroyed = position("Instance 'doomed' destroyed.");
    assert!(closed < dog, "elements are destroyed in registration order");
    assert!(dog < destroyed);
    assert_eq!(messages.last().map(String::as_str), Some("Logger shut down."));
}
