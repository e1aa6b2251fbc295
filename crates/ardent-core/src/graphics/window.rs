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

use super::backend::WindowBackend;
use super::reference::ReferenceList;
use crate::error::{InstanceError, ResourceError};
use crate::event::WindowId;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::layer::WindowFlags;
use crate::logging::Severity;
use crate::platform::{OsWindow, Platform, SharedOsWindow, WindowSettings};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An engine window: an OS window plus its per-API presentation surface.
///
/// Lifecycle: `new` opens the OS window, initializes the instance's graphics API on
/// first use, creates the surface and registers with the platform event pump. The
/// window layer raises the close flag on an OS close request; the next update tears
/// everything down and returns `false`, which drops the window from the instance.
/// A closed window never reopens.
pub struct Window {
    id: WindowId,
    settings: WindowSettings,
    os: SharedOsWindow,
    backend: Mutex<Option<Box<dyn WindowBackend>>>,
    flags: Arc<WindowFlags>,
    references: ReferenceList,
    size: Mutex<(u32, u32)>,
    closed: AtomicBool,
    instance: InstanceHandle,
    platform: Platform,
}

impl Window {
    /// Opens a window and registers it with the instance.
    ///
    /// ## Errors
    /// * `ResourceError::BackendError` - The OS refused to open the window, or the
    ///   graphics API could not be initialized.
    pub fn new(
        instance: &InstanceContext,
        settings: WindowSettings,
        os_window: Box<dyn OsWindow>,
    ) -> Result<Arc<Self>, ResourceError> {
        let os: SharedOsWindow = Arc::new(Mutex::new(os_window));
        {
            let mut guard = os.lock().unwrap();
            if !guard.open(&settings) {
                let err = ResourceError::BackendError(format!("the OS could not open window '{}'", settings.title));
                instance.log(err.to_string(), Severity::FatalError);
                return Err(err);
            }
        }

        let platform = instance.platform().clone();
        let id = platform.allocate_window_id();
        let backend = if instance.api().has_graphics() {
            let graphic = {
                let guard = os.lock().unwrap();
                instance.init_graphic_api(&**guard)
            };
            if let Err(e) = graphic {
                os.lock().unwrap().close();
                return Err(e.into());
            }
            match instance.backend() {
                Some(backend) => match backend.create_window(&settings, id) {
                    Ok(surface) => Some(surface),
                    Err(e) => {
                        instance.log(
                            format!("Failed to create the surface of window '{}': {e}", settings.title),
                            Severity::FatalError,
                        );
                        None
                    }
                },
                None => {
                    os.lock().unwrap().close();
                    return Err(InstanceError::NotImplemented(instance.api()).into());
                }
            }
        } else {
            None
        };

        let size = os.lock().unwrap().size();
        let flags = instance.register_window_flags(id);
        platform.register_window(id, instance.handle().weak(), Arc::clone(&os));
        instance.log(
            format!("Opened window '{}' ({id}) at {}x{}.", settings.title, size.0, size.1),
            Severity::Info,
        );

        Ok(instance.attach(Self {
            id,
            settings,
            os,
            backend: Mutex::new(backend),
            flags,
            references: ReferenceList::default(),
            size: Mutex::new(size),
            closed: AtomicBool::new(false),
            instance: instance.handle(),
            platform,
        }))
    }

    /// The platform-wide id.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The title the window was opened with.
    pub fn title(&self) -> &str {
        &self.settings.title
    }

    /// The settings the window was opened with.
    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    /// Current drawable size.
    pub fn size(&self) -> (u32, u32) {
        *self.size.lock().unwrap()
    }

    /// Whether the window is still open.
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Asks the window to close on its next update.
    pub fn request_close(&self) {
        self.flags.request_close();
    }

    /// The flags the window layer writes for this window.
    pub fn flags(&self) -> &Arc<WindowFlags> {
        &self.flags
    }

    /// Moves the cursor inside the window.
    pub fn warp_mouse_cursor(&self, x: f32, y: f32) {
        if self.is_open() {
            self.os.lock().unwrap().warp_mouse_cursor(x, y);
        }
    }

    /// Grabs or releases the cursor.
    pub fn capture_mouse(&self, capture: bool) {
        if self.is_open() {
            self.os.lock().unwrap().capture_mouse(capture);
        }
    }

    /// The pipelines referencing this window.
    pub fn references(&self) -> &ReferenceList {
        &self.references
    }

    /// Runs `f` on the presentation surface, if there is one.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn WindowBackend) -> R) -> Option<R> {
        let mut backend = self.backend.lock().unwrap();
        backend.as_mut().map(|b| f(&mut **b))
    }

    fn apply_resize(&self, size: (u32, u32)) {
        *self.size.lock().unwrap() = size;
        if let Some(Err(e)) = self.with_backend(|b| b.resize(size)) {
            self.instance.log(
                format!("Window '{}' failed to resize its surface: {e}", self.settings.title),
                Severity::Error,
            );
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let holders = self.references.count();
        if holders > 0 {
            self.instance.log(
                format!(
                    "Window '{}' closed while {holders} pipeline reference(s) remain.",
                    self.settings.title
                ),
                Severity::Warning,
            );
        }
        if let Some(mut backend) = self.backend.lock().unwrap().take() {
            backend.on_destroy();
        }
        self.os.lock().unwrap().close();
        self.platform.unregister_window(self.id);
        if let Some(instance) = self.instance.upgrade() {
            instance.remove_window_flags(self.id);
        }
        self.instance
            .log(format!("Closed window '{}'.", self.settings.title), Severity::Info);
    }
}

impl InstAttachable for Window {
    fn name(&self) -> &str {
        &self.settings.title
    }

    fn type_name(&self) -> &'static str {
        "Window"
    }

    fn on_update(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.flags.close_requested() {
            self.close();
            return false;
        }
        if let Some(size) = self.flags.take_resize() {
            self.apply_resize(size);
        }
        true
    }

    fn on_destroy(&self) {
        self.close();
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.settings.title)
            .field("size", &self.size())
            .field("open", &self.is_open())
            .finish()
    }
}
