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

//! Engine configuration.
//!
//! A single [`EngineConfig`] is handed to every [`Instance`](crate::instance::Instance)
//! at construction. It can be loaded from and saved to JSON.

use crate::logging::Severity;
use serde::{Deserialize, Serialize};

/// Settings of the instance [`Logger`](crate::logging::Logger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Whether the instance owns a logger at all. Without one, messages go straight
    /// to the `log` facade.
    pub enabled: bool,
    /// Keep `Severity::Debug` messages.
    pub debug: bool,
    /// Print every message as soon as it is logged instead of waiting for `print_all`.
    pub auto_flush: bool,
    /// Messages below this severity are discarded.
    pub min_severity: Severity,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
            auto_flush: true,
            min_severity: Severity::Info,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tick rate of the instance update thread, in ticks per second.
    pub update_rate: f64,
    /// Default tick rate of render pipeline threads.
    pub pipeline_rate: f64,
    /// Tick rate of the platform event pump.
    pub event_pump_rate: f64,
    /// Poll interval of `sync_graphic_setup`, in milliseconds.
    pub setup_poll_interval_ms: u64,
    /// Initial capacity of the vertex and index arenas of a vertex layout, in bytes.
    pub vertex_arena_capacity: u64,
    /// Logger settings.
    pub logger: LoggerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_rate: 60.0,
            pipeline_rate: 60.0,
            event_pump_rate: 120.0,
            setup_poll_interval_ms: 1,
            vertex_arena_capacity: 64 * 1024,
            logger: LoggerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save the configuration to a JSON file.
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
