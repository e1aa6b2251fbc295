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

//! # Ardent Infra
//!
//! Concrete collaborators for `ardent-core`: a CPU-memory graphics backend that
//! implements every per-API interface and records what it executes, and a headless
//! OS window fed through a channel.

#![warn(missing_docs)]

pub mod graphics;
pub mod platform;

pub use graphics::software::{CommandTrace, SoftwareBackend, SoftwareCommand};
pub use platform::headless::{HeadlessHandle, HeadlessInput, HeadlessWindow};
