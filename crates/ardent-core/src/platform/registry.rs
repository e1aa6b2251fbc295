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

use super::SharedOsWindow;
use crate::api::GraphicsApi;
use crate::event::{Event, EventBus, WindowId};
use crate::graphics::GraphicBackend;
use crate::instance::InstanceContext;
use crate::utils::Limiter;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::thread::{self, JoinHandle};

/// Default tick rate of the event pump.
const DEFAULT_PUMP_RATE: f64 = 120.0;

struct RegisteredWindow {
    id: WindowId,
    instance: Weak<InstanceContext>,
    os: SharedOsWindow,
}

struct PlatformShared {
    backends: RwLock<HashMap<GraphicsApi, Arc<dyn GraphicBackend>>>,
    os_active: AtomicBool,
    windows: Mutex<Vec<RegisteredWindow>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    pump_generation: AtomicU64,
    pump_rate: f64,
    injected: EventBus<(WindowId, Event)>,
    next_window_id: AtomicU32,
}

/// The explicit process-wide registry.
///
/// Cloning is cheap and every clone refers to the same registry. The OS event pump
/// thread is started when the first window registers and stopped when the last one
/// unregisters; it polls every OS window, routes events into the owning instance's
/// layer stack and drives each instance's graphic instance `on_render`.
#[derive(Clone)]
pub struct Platform {
    shared: Arc<PlatformShared>,
}

impl Platform {
    /// Creates a platform whose event pump ticks at the default rate.
    pub fn new() -> Self {
        Self::with_pump_rate(DEFAULT_PUMP_RATE)
    }

    /// Creates a platform whose event pump ticks `rate` times per second.
    pub fn with_pump_rate(rate: f64) -> Self {
        Self {
            shared: Arc::new(PlatformShared {
                backends: RwLock::new(HashMap::new()),
                os_active: AtomicBool::new(true),
                windows: Mutex::new(Vec::new()),
                pump: Mutex::new(None),
                pump_generation: AtomicU64::new(0),
                pump_rate: rate,
                injected: EventBus::new(),
                next_window_id: AtomicU32::new(1),
            }),
        }
    }

    /// Registers the backend implementing `backend.api()`, replacing any previous one.
    pub fn register_backend(&self, backend: Arc<dyn GraphicBackend>) {
        let api = backend.api();
        log::info!("Registering {api} graphics backend");
        if self
            .shared
            .backends
            .write()
            .unwrap()
            .insert(api, backend)
            .is_some()
        {
            log::warn!("Replaced an existing {api} graphics backend");
        }
    }

    /// The backend implementing `api`, if one is registered.
    pub fn backend(&self, api: GraphicsApi) -> Option<Arc<dyn GraphicBackend>> {
        self.shared.backends.read().unwrap().get(&api).cloned()
    }

    /// Every API with a registered backend.
    pub fn registered_apis(&self) -> Vec<GraphicsApi> {
        let backends = self.shared.backends.read().unwrap();
        GraphicsApi::ALL
            .into_iter()
            .filter(|api| backends.contains_key(api))
            .collect()
    }

    /// Whether the windowing subsystem is still up. Render pipelines stop themselves
    /// once this turns `false`.
    pub fn is_os_active(&self) -> bool {
        self.shared.os_active.load(Ordering::Acquire)
    }

    /// Shuts the windowing subsystem down and stops the event pump.
    pub fn shutdown(&self) {
        if self.shared.os_active.swap(false, Ordering::AcqRel) {
            log::info!("Platform shutting down");
        }
        self.stop_pump();
    }

    /// Reserves a fresh window id.
    pub fn allocate_window_id(&self) -> WindowId {
        WindowId(self.shared.next_window_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Adds an OS window to the pump. The first registration starts the pump thread.
    pub fn register_window(&self, id: WindowId, instance: Weak<InstanceContext>, os: SharedOsWindow) {
        self.shared
            .windows
            .lock()
            .unwrap()
            .push(RegisteredWindow { id, instance, os });
        log::debug!("Registered {id} with the platform");
        self.ensure_pump();
    }

    /// Removes an OS window from the pump. Removing the last window stops the pump
    /// thread. Returns `false` if the window was not registered.
    pub fn unregister_window(&self, id: WindowId) -> bool {
        let found = {
            let mut windows = self.shared.windows.lock().unwrap();
            let before = windows.len();
            windows.retain(|w| w.id != id);
            windows.len() != before
        };
        if found {
            log::debug!("Unregistered {id} from the platform");
        }
        self.stop_pump_if_idle();
        found
    }

    /// Number of registered OS windows.
    pub fn window_count(&self) -> usize {
        self.shared.windows.lock().unwrap().len()
    }

    /// Whether the event pump thread is running.
    pub fn is_pump_running(&self) -> bool {
        self.shared.pump.lock().unwrap().is_some()
    }

    /// Queues an event for `window`, delivered on the next pump tick.
    pub fn inject(&self, window: WindowId, event: Event) {
        self.shared.injected.publish((window, event));
    }

    /// A sender for injecting events from other threads.
    pub fn injector(&self) -> flume::Sender<(WindowId, Event)> {
        self.shared.injected.sender()
    }

    /// Runs one pump iteration on the calling thread.
    pub fn pump_once(&self) {
        self.shared.pump_once();
    }

    fn ensure_pump(&self) {
        let mut slot = self.shared.pump.lock().unwrap();
        if slot.is_some() {
            return;
        }
        let generation = self.shared.pump_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name("ardent-event-pump".to_string())
            .spawn(move || shared.run_pump(generation))
        {
            Ok(handle) => *slot = Some(handle),
            Err(e) => log::error!("Failed to spawn the event pump thread: {e}"),
        }
    }

    fn stop_pump(&self) {
        let handle = {
            let mut slot = self.shared.pump.lock().unwrap();
            self.shared.pump_generation.fetch_add(1, Ordering::AcqRel);
            slot.take()
        };
        self.join_pump(handle);
    }

    // The emptiness check happens under the pump lock, so a window registered
    // concurrently either keeps the pump alive or spawns a fresh one.
    fn stop_pump_if_idle(&self) {
        let handle = {
            let mut slot = self.shared.pump.lock().unwrap();
            if !self.shared.windows.lock().unwrap().is_empty() {
                return;
            }
            self.shared.pump_generation.fetch_add(1, Ordering::AcqRel);
            slot.take()
        };
        self.join_pump(handle);
    }

    fn join_pump(&self, handle: Option<JoinHandle<()>>) {
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("The event pump thread panicked");
            }
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("apis", &self.registered_apis())
            .field("os_active", &self.is_os_active())
            .field("windows", &self.window_count())
            .finish()
    }
}

impl PlatformShared {
    fn run_pump(&self, generation: u64) {
        log::debug!("Event pump started");
        let mut limiter = Limiter::new(self.pump_rate);
        limiter.start();
        while self.pump_generation.load(Ordering::Acquire) == generation
            && self.os_active.load(Ordering::Acquire)
        {
            self.pump_once();
            limiter.end_tick();
        }
        log::debug!("Event pump stopped after {} ticks", limiter.ticks());
    }

    fn pump_once(&self) {
        let windows: Vec<(WindowId, Weak<InstanceContext>, SharedOsWindow)> = self
            .windows
            .lock()
            .unwrap()
            .iter()
            .map(|w| (w.id, w.instance.clone(), Arc::clone(&w.os)))
            .collect();

        let mut instances: Vec<Arc<InstanceContext>> = Vec::new();
        for (id, instance, os) in &windows {
            let events = os.lock().unwrap().poll_events(*id);
            let Some(instance) = instance.upgrade() else {
                continue;
            };
            for event in events {
                instance.handle_event(event);
            }
            if !instances.iter().any(|i| Arc::ptr_eq(i, &instance)) {
                instances.push(instance);
            }
        }

        for (id, event) in self.injected.drain() {
            match windows
                .iter()
                .find(|(window, _, _)| *window == id)
                .and_then(|(_, instance, _)| instance.upgrade())
            {
                Some(instance) => {
                    instance.handle_event(event);
                }
                None => log::debug!("Dropping injected event for unknown {id}"),
            }
        }

        for instance in &instances {
            instance.render_graphic();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OsWindow, WindowSettings};
    use std::time::{Duration, Instant};

    struct StillWindow;

    impl OsWindow for StillWindow {
        fn open(&mut self, _settings: &WindowSettings) -> bool {
            true
        }
        fn close(&mut self) {}
        fn is_open(&self) -> bool {
            true
        }
        fn size(&self) -> (u32, u32) {
            (1, 1)
        }
        fn position(&self) -> (i32, i32) {
            (0, 0)
        }
        fn warp_mouse_cursor(&mut self, _x: f32, _y: f32) {}
        fn capture_mouse(&mut self, _capture: bool) {}
        fn poll_events(&mut self, _window: WindowId) -> Vec<Event> {
            Vec::new()
        }
    }

    fn still_window() -> SharedOsWindow {
        Arc::new(Mutex::new(Box::new(StillWindow)))
    }

    #[test]
    fn window_ids_are_unique() {
        let platform = Platform::new();
        let a = platform.allocate_window_id();
        let b = platform.allocate_window_id();
        assert_ne!(a, b);
    }

    #[test]
    fn pump_follows_window_registrations() {
        let platform = Platform::with_pump_rate(500.0);
        assert!(!platform.is_pump_running());

        let first = platform.allocate_window_id();
        let second = platform.allocate_window_id();
        platform.register_window(first, Weak::new(), still_window());
        platform.register_window(second, Weak::new(), still_window());
        assert!(platform.is_pump_running());

        assert!(platform.unregister_window(first));
        assert!(platform.is_pump_running());
        assert!(platform.unregister_window(second));
        assert!(!platform.is_pump_running());
        assert!(!platform.unregister_window(second));
    }

    #[test]
    fn pump_survives_concurrent_register_and_unregister() {
        let platform = Platform::with_pump_rate(1000.0);
        for _ in 0..500 {
            let leaving = platform.allocate_window_id();
            let arriving = platform.allocate_window_id();
            platform.register_window(leaving, Weak::new(), still_window());

            let barrier = Arc::new(std::sync::Barrier::new(2));
            let remover = {
                let platform = platform.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    platform.unregister_window(leaving)
                })
            };
            barrier.wait();
            platform.register_window(arriving, Weak::new(), still_window());
            assert!(remover.join().unwrap());

            assert_eq!(platform.window_count(), 1);
            assert!(platform.is_pump_running(), "a registered window was left without a pump");
            assert!(platform.unregister_window(arriving));
            assert!(!platform.is_pump_running());
        }
    }

    #[test]
    fn shutdown_clears_os_active_and_stops_the_pump() {
        let platform = Platform::with_pump_rate(500.0);
        let id = platform.allocate_window_id();
        platform.register_window(id, Weak::new(), still_window());
        assert!(platform.is_os_active());

        let begin = Instant::now();
        platform.shutdown();
        assert!(!platform.is_os_active());
        assert!(!platform.is_pump_running());
        assert!(begin.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn injected_events_for_unknown_windows_are_dropped() {
        let platform = Platform::new();
        platform.inject(
            WindowId(42),
            Event::window_event(WindowId(42), crate::event::WindowEventKind::CloseRequested),
        );
        platform.pump_once();
        platform.pump_once();
    }
}
