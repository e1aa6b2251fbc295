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

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which pipeline stage a shader runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
    /// Compute shader.
    Compute,
}

/// Shader source text, before and after processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    name: String,
    stage: ShaderStage,
    source: String,
    processed: Option<String>,
}

impl Shader {
    /// Creates an unprocessed shader.
    pub fn new(name: impl Into<String>, stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage,
            source: source.into(),
            processed: None,
        }
    }

    /// The shader name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Stores the output of a shader processor.
    pub fn set_processed(&mut self, source: String) {
        self.processed = Some(source);
    }

    /// Whether a processor already ran.
    pub fn is_processed(&self) -> bool {
        self.processed.is_some()
    }

    /// The text handed to the backend compiler: the processed source if there is one,
    /// the raw source otherwise.
    pub fn final_source(&self) -> &str {
        self.processed.as_deref().unwrap_or(&self.source)
    }

    /// Runs `processor` on the shader.
    pub fn process(&mut self, processor: &dyn ShaderProcessor) -> bool {
        processor.process_shader(self)
    }
}

/// Rewrites shader source before compilation (includes, packages, macros).
pub trait ShaderProcessor: Send + Sync {
    /// Processes `shader` in place. Returns `false` on failure.
    fn process_shader(&self, shader: &mut Shader) -> bool;

    /// Makes the package at `path` available under `name`.
    fn load_package(&mut self, path: &Path, name: &str) -> bool;
}

/// A processor that copies the source unchanged. Packages are recorded but never
/// expanded.
#[derive(Debug, Default, Clone)]
pub struct PassThroughProcessor {
    packages: HashMap<String, PathBuf>,
}

impl PassThroughProcessor {
    /// Creates the processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The path a package was loaded from.
    pub fn package(&self, name: &str) -> Option<&Path> {
        self.packages.get(name).map(PathBuf::as_path)
    }
}

impl ShaderProcessor for PassThroughProcessor {
    fn process_shader(&self, shader: &mut Shader) -> bool {
        let source = shader.source().to_string();
        shader.set_processed(source);
        true
    }

    fn load_package(&mut self, path: &Path, name: &str) -> bool {
        if name.is_empty() || self.packages.contains_key(name) {
            return false;
        }
        self.packages.insert(name.to_string(), path.to_path_buf());
        true
    }
}
