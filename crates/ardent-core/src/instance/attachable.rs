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

use super::InstanceContext;
use crate::logging::Severity;
use std::sync::{Arc, Weak};

/// An entity owned by an [`Instance`](super::Instance).
///
/// Objects, worlds, windows, GPU resources and render pipelines all implement this.
/// The instance keeps every registered element alive, updates it once per tick in
/// registration order and destroys it when the instance goes away.
pub trait InstAttachable: Send + Sync {
    /// The element's name.
    fn name(&self) -> &str;

    /// A tag identifying the concrete element type.
    fn type_name(&self) -> &'static str;

    /// Called once per update tick. Returning `false` means the element no longer
    /// exists: the instance drops it from its list without calling `on_destroy`.
    fn on_update(&self) -> bool {
        true
    }

    /// Called by the instance when the element is destroyed.
    fn on_destroy(&self) {}
}

/// A non-owning back-reference to an instance.
///
/// Every instance-owned entity keeps one. It never keeps the instance alive.
#[derive(Debug, Clone, Default)]
pub struct InstanceHandle {
    inner: Weak<InstanceContext>,
}

impl InstanceHandle {
    pub(crate) fn new(inner: Weak<InstanceContext>) -> Self {
        Self { inner }
    }

    /// The instance, if it still exists.
    pub fn upgrade(&self) -> Option<Arc<InstanceContext>> {
        self.inner.upgrade()
    }

    /// The underlying weak pointer.
    pub fn weak(&self) -> Weak<InstanceContext> {
        self.inner.clone()
    }

    /// Logs through the instance, or straight to the `log` facade once the instance
    /// is gone.
    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match self.inner.upgrade() {
            Some(instance) => instance.log(message, severity),
            None => log::log!(target: "ardent", severity.level(), "{message}"),
        }
    }

    /// Logs a debug message.
    pub fn log_debug(&self, message: impl Into<String>) {
        self.log(message, Severity::Debug);
    }

    /// Whether both handles point at the same instance.
    pub fn same_instance(&self, other: &InstanceHandle) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}
