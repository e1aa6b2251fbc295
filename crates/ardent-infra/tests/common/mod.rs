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

//! Shared setup for the integration tests.

#![allow(dead_code)]

use ardent_core::logging::MemorySink;
use ardent_core::{EngineConfig, GraphicsApi, Instance, Platform};
use ardent_infra::SoftwareBackend;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// A platform with the software backend, and an instance on it whose log lands in a
/// memory sink. The background update thread is stopped so tests drive updates.
pub struct Harness {
    pub platform: Platform,
    pub backend: Arc<SoftwareBackend>,
    pub sink: MemorySink,
    pub instance: Instance,
}

pub fn harness(api: GraphicsApi) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = Platform::with_pump_rate(500.0);
    let backend = Arc::new(SoftwareBackend::new());
    platform.register_backend(backend.clone());
    let sink = MemorySink::new();
    let mut instance = Instance::with_log_sink(
        "integration",
        api,
        &platform,
        EngineConfig::default(),
        Box::new(sink.clone()),
    );
    instance.stop_updates();
    Harness {
        platform,
        backend,
        sink,
        instance,
    }
}

/// Polls `condition` until it holds or five seconds pass.
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}
