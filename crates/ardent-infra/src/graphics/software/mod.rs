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

//! The software graphics backend.
//!
//! Every per-API object lives in CPU memory. Pipelines execute their stages against
//! those objects and append one [`SoftwareCommand`] per executed stage to a shared
//! [`CommandTrace`], which makes execution order observable.

mod backend;
mod pipeline;
mod resources;
mod trace;

pub use self::backend::SoftwareBackend;
pub use self::pipeline::SoftwarePipeline;
pub use self::resources::{
    SoftwareArena, SoftwareFramebuffer, SoftwareGraphicInstance, SoftwareSurface, SoftwareTexture,
};
pub use self::trace::{CommandTrace, SoftwareCommand};
