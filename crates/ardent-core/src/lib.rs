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

//! # Ardent Core
//!
//! Backend-agnostic core of the Ardent engine: the instance and its attachment
//! lifecycle, objects and worlds, event layers and input state, arena-backed GPU
//! resources, and render pipelines executing a fixed list of stages.
//!
//! Concrete graphics backends and OS windows live in `ardent-infra` and plug in
//! through [`graphics::GraphicBackend`] and [`platform::OsWindow`].

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod graphics;
pub mod input;
pub mod instance;
pub mod layer;
pub mod logging;
pub mod math;
pub mod platform;
pub mod scene;
pub mod utils;

pub use api::GraphicsApi;
pub use config::{EngineConfig, LoggerConfig};
pub use error::{InstanceError, ResourceError, SceneError};
pub use instance::{InstAttachable, Instance, InstanceContext, InstanceHandle};
pub use logging::Severity;
pub use platform::Platform;
