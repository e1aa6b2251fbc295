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

use super::{InstAttachable, InstanceHandle};
use crate::api::GraphicsApi;
use crate::config::EngineConfig;
use crate::error::InstanceError;
use crate::event::{Event, Key, WindowId};
use crate::graphics::{GraphicBackend, GraphicInstance};
use crate::input::{InputState, SharedInput};
use crate::layer::{KeyboardLayer, Layer, LayerStack, MouseLayer, WindowFlags, WindowLayer, WindowTable};
use crate::logging::{LogSink, Logger, Severity};
use crate::platform::{OsWindow, Platform};
use crate::utils::Limiter;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// The shared state of an [`Instance`].
///
/// Elements, the update thread and the platform event pump all reach the instance
/// through this type; only the owning [`Instance`] can destroy it.
pub struct InstanceContext {
    id: u64,
    name: String,
    api: GraphicsApi,
    platform: Platform,
    config: EngineConfig,
    elements: Mutex<Vec<Arc<dyn InstAttachable>>>,
    logger: Mutex<Option<Logger>>,
    graphic: RwLock<Option<Arc<GraphicInstance>>>,
    input: SharedInput,
    layers: Mutex<LayerStack>,
    windows: WindowTable,
    updating: AtomicBool,
    self_ref: Weak<InstanceContext>,
}

impl InstanceContext {
    /// Unique id of the instance within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graphics API chosen at construction.
    pub fn api(&self) -> GraphicsApi {
        self.api
    }

    /// The platform this instance was created on.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A non-owning handle for elements to keep.
    pub fn handle(&self) -> InstanceHandle {
        InstanceHandle::new(self.self_ref.clone())
    }

    /// The backend of the instance's API, if graphics are enabled and one is
    /// registered.
    pub fn backend(&self) -> Option<Arc<dyn GraphicBackend>> {
        if !self.api.has_graphics() {
            return None;
        }
        self.platform.backend(self.api)
    }

    /// Logs a message through the instance logger. Without a logger the message
    /// goes to the `log` facade.
    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match self.logger.lock().unwrap().as_ref() {
            Some(logger) => logger.log(message, severity),
            None => log::log!(target: "ardent", severity.level(), "{message}"),
        }
    }

    /// Logs a debug message.
    pub fn log_debug(&self, message: impl Into<String>) {
        self.log(message, Severity::Debug);
    }

    /// Writes every queued log entry.
    pub fn print_log(&self) {
        if let Some(logger) = self.logger.lock().unwrap().as_ref() {
            logger.print_all();
        }
    }

    // --- Elements ---

    /// Registers an element. It is updated after every element registered before it.
    pub fn add_element(&self, element: Arc<dyn InstAttachable>) {
        self.log_debug(format!(
            "Adding {} '{}' to instance '{}'",
            element.type_name(),
            element.name(),
            self.name
        ));
        self.elements.lock().unwrap().push(element);
    }

    /// Wraps `element` in an `Arc`, registers it and hands it back.
    pub fn attach<T: InstAttachable + 'static>(&self, element: T) -> Arc<T> {
        let element = Arc::new(element);
        self.add_element(element.clone());
        element
    }

    /// Unregisters an element, found by identity. The first match is removed.
    ///
    /// Logs an error and returns `false` if the element is not registered.
    pub fn remove_element(&self, element: &dyn InstAttachable) -> bool {
        let removed = {
            let mut elements = self.elements.lock().unwrap();
            elements
                .iter()
                .position(|e| std::ptr::addr_eq(Arc::as_ptr(e), element))
                .map(|index| elements.remove(index))
        };
        match removed {
            Some(_) => true,
            None => {
                self.log(
                    format!(
                        "Can not remove {} '{}': it is not part of instance '{}'.",
                        element.type_name(),
                        element.name(),
                        self.name
                    ),
                    Severity::Error,
                );
                false
            }
        }
    }

    /// Unregisters an element and calls its `on_destroy`.
    pub fn destroy_element(&self, element: &dyn InstAttachable) -> bool {
        if !self.remove_element(element) {
            return false;
        }
        element.on_destroy();
        true
    }

    /// Whether `element` is registered.
    pub fn contains_element(&self, element: &dyn InstAttachable) -> bool {
        self.elements
            .lock()
            .unwrap()
            .iter()
            .any(|e| std::ptr::addr_eq(Arc::as_ptr(e), element))
    }

    /// Number of registered elements.
    pub fn element_count(&self) -> usize {
        self.elements.lock().unwrap().len()
    }

    /// Names of the registered elements, in registration order.
    pub fn element_names(&self) -> Vec<String> {
        self.elements
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Runs one update pass over every element, in registration order.
    ///
    /// An element returning `false` is dropped and the pass continues with the element
    /// that took its slot. The element list is not locked while an element updates,
    /// so elements may register or remove other elements.
    pub fn update_elements(&self) {
        let mut index = 0;
        loop {
            let element = match self.elements.lock().unwrap().get(index) {
                Some(element) => Arc::clone(element),
                None => break,
            };
            if element.on_update() {
                index += 1;
                continue;
            }
            let mut elements = self.elements.lock().unwrap();
            if let Some(position) = elements
                .iter()
                .position(|e| std::ptr::addr_eq(Arc::as_ptr(e), Arc::as_ptr(&element)))
            {
                elements.remove(position);
            }
        }
    }

    /// Whether the background update thread is running.
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    fn run_update_loop(&self) {
        let mut limiter = Limiter::new(self.config.update_rate);
        limiter.start();
        while self.updating.load(Ordering::Acquire) {
            self.update_elements();
            limiter.end_tick();
        }
    }

    // --- Graphics ---

    /// Sets up the graphics API for this instance. Only the first call does anything.
    ///
    /// An API the engine claims to support without a registered backend is an
    /// engine bug and an API it does not support is a configuration error. Both are
    /// fatal for the instance's graphics.
    pub fn init_graphic_api(&self, window: &dyn OsWindow) -> Result<Arc<GraphicInstance>, InstanceError> {
        if let Some(graphic) = self.graphic.read().unwrap().as_ref() {
            return Ok(Arc::clone(graphic));
        }
        if !self.api.is_supported() {
            let err = InstanceError::Unsupported(self.api);
            self.log(err.to_string(), Severity::FatalError);
            return Err(err);
        }
        let Some(backend) = self.platform.backend(self.api) else {
            let err = InstanceError::NotImplemented(self.api);
            self.log(err.to_string(), Severity::FatalError);
            return Err(err);
        };

        if let Err(e) = backend.init_context(window) {
            let err = InstanceError::InitializationFailed(e.to_string());
            self.log(err.to_string(), Severity::FatalError);
            return Err(err);
        }
        let graphic = GraphicInstance::new(self, backend.as_ref()).map_err(|e| {
            let err = InstanceError::InitializationFailed(e.to_string());
            self.log(err.to_string(), Severity::FatalError);
            err
        })?;

        let mut slot = self.graphic.write().unwrap();
        if let Some(existing) = slot.as_ref() {
            // Another thread won the race; keep its instance.
            graphic.on_destroy();
            return Ok(Arc::clone(existing));
        }
        *slot = Some(Arc::clone(&graphic));
        self.log(
            format!("Initialized the {} graphics API for '{}'.", self.api, self.name),
            Severity::Info,
        );
        Ok(graphic)
    }

    /// The graphic instance, once graphics are initialized.
    pub fn graphic(&self) -> Option<Arc<GraphicInstance>> {
        self.graphic.read().unwrap().clone()
    }

    /// Whether `init_graphic_api` succeeded.
    pub fn has_graphic(&self) -> bool {
        self.graphic.read().unwrap().is_some()
    }

    /// Blocks until the backend reports its setup complete.
    ///
    /// Returns `false` right away when graphics are not initialized, or once the
    /// windowing subsystem shuts down before setup completes.
    pub fn sync_graphic_setup(&self) -> bool {
        let Some(graphic) = self.graphic() else {
            return false;
        };
        let interval = Duration::from_millis(self.config.setup_poll_interval_ms.max(1));
        while !graphic.is_setup_done() {
            if !self.platform.is_os_active() {
                return false;
            }
            thread::sleep(interval);
        }
        true
    }

    /// Lets the graphic instance flush its per-frame work. Driven by the platform
    /// event pump.
    pub fn render_graphic(&self) {
        if let Some(graphic) = self.graphic() {
            graphic.on_render();
        }
    }

    // --- Events and input ---

    /// Sends an event through the layer stack. Returns whether a layer handled it.
    pub fn handle_event(&self, event: Event) -> bool {
        self.layers.lock().unwrap().send_event(event)
    }

    /// Appends a layer after the built-in ones.
    pub fn push_layer(&self, layer: Box<dyn Layer>) {
        self.layers.lock().unwrap().push(layer);
    }

    /// Layer names in dispatch order.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.lock().unwrap().names()
    }

    /// A snapshot of the input state.
    pub fn input(&self) -> InputState {
        self.input.read().unwrap().clone()
    }

    /// The shared input state.
    pub fn shared_input(&self) -> SharedInput {
        Arc::clone(&self.input)
    }

    /// Whether `key` is held down.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.input.read().unwrap().keyboard.is_pressed(key)
    }

    /// Creates the flag set the window layer writes for `window`.
    pub fn register_window_flags(&self, window: WindowId) -> Arc<WindowFlags> {
        let flags = Arc::new(WindowFlags::default());
        self.windows
            .write()
            .unwrap()
            .insert(window, Arc::clone(&flags));
        flags
    }

    /// The flag set of `window`.
    pub fn window_flags(&self, window: WindowId) -> Option<Arc<WindowFlags>> {
        self.windows.read().unwrap().get(&window).cloned()
    }

    /// Forgets the flag set of `window`.
    pub fn remove_window_flags(&self, window: WindowId) {
        self.windows.write().unwrap().remove(&window);
    }

    fn teardown(&self) {
        let elements = std::mem::take(&mut *self.elements.lock().unwrap());
        for element in &elements {
            self.log_debug(format!(
                "Destroying {} '{}'",
                element.type_name(),
                element.name()
            ));
            element.on_destroy();
        }
        drop(elements);

        let graphic = self.graphic.write().unwrap().take();
        if let Some(graphic) = graphic {
            graphic.on_destroy();
        }

        self.log(format!("Instance '{}' destroyed.", self.name), Severity::Info);
        let logger = self.logger.lock().unwrap().take();
        drop(logger);
    }
}

impl fmt::Debug for InstanceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api", &self.api)
            .field("elements", &self.element_count())
            .finish()
    }
}

/// One running engine session.
///
/// Owns its [`InstanceContext`] and the background update thread. Dropping the
/// instance stops and joins the update thread, destroys every element in
/// registration order, then flushes and destroys the logger.
pub struct Instance {
    context: Arc<InstanceContext>,
    update_thread: Option<JoinHandle<()>>,
}

impl Instance {
    /// Creates an instance logging to the `log` facade.
    pub fn new(name: impl Into<String>, api: GraphicsApi, platform: &Platform, config: EngineConfig) -> Self {
        let logger = config.logger.enabled.then(|| Logger::new(config.logger.clone()));
        Self::build(name.into(), api, platform, config, logger)
    }

    /// Creates an instance whose logger writes into `sink`.
    pub fn with_log_sink(
        name: impl Into<String>,
        api: GraphicsApi,
        platform: &Platform,
        config: EngineConfig,
        sink: Box<dyn LogSink>,
    ) -> Self {
        let logger = Logger::with_sink(config.logger.clone(), sink);
        Self::build(name.into(), api, platform, config, Some(logger))
    }

    fn build(
        name: String,
        api: GraphicsApi,
        platform: &Platform,
        config: EngineConfig,
        logger: Option<Logger>,
    ) -> Self {
        let input: SharedInput = Arc::default();
        let windows: WindowTable = Arc::default();
        let mut layers = LayerStack::new();
        layers.push(Box::new(KeyboardLayer::new(Arc::clone(&input))));
        layers.push(Box::new(MouseLayer::new(Arc::clone(&input))));
        layers.push(Box::new(WindowLayer::new(Arc::clone(&windows))));

        let context = Arc::new_cyclic(|self_ref| InstanceContext {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            api,
            platform: platform.clone(),
            config,
            elements: Mutex::new(Vec::new()),
            logger: Mutex::new(logger),
            graphic: RwLock::new(None),
            input,
            layers: Mutex::new(layers),
            windows,
            updating: AtomicBool::new(true),
            self_ref: self_ref.clone(),
        });
        context.log(
            format!("Instance '{}' created with the {} API.", context.name, api),
            Severity::Info,
        );

        let worker = Arc::clone(&context);
        let update_thread = match thread::Builder::new()
            .name(format!("ardent-update-{}", context.id))
            .spawn(move || worker.run_update_loop())
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                context.updating.store(false, Ordering::Release);
                context.log(
                    format!("Failed to spawn the update thread: {e}"),
                    Severity::FatalError,
                );
                None
            }
        };

        Self {
            context,
            update_thread,
        }
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<InstanceContext> {
        &self.context
    }

    /// Stops the background update thread and waits for it to exit. Elements can
    /// still be updated by hand with `update_elements`.
    pub fn stop_updates(&mut self) {
        self.context.updating.store(false, Ordering::Release);
        if let Some(handle) = self.update_thread.take() {
            if handle.join().is_err() {
                self.context
                    .log("The update thread panicked.", Severity::Error);
            }
        }
    }
}

impl Deref for Instance {
    type Target = InstanceContext;

    fn deref(&self) -> &InstanceContext {
        &self.context
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.stop_updates();
        self.context.teardown();
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("context", &self.context)
            .field("updating", &self.update_thread.is_some())
            .finish()
    }
}
