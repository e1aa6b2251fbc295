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

use std::fmt;
use std::sync::Mutex;

/// Identifies a render pipeline within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(pub u64);

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline#{}", self.0)
    }
}

/// The pipelines that reference a framebuffer or window.
///
/// Pure bookkeeping: a pipeline registers once per stage that touches the resource
/// and unregisters as many times when it is destroyed. Nothing is blocked by it.
#[derive(Debug, Default)]
pub struct ReferenceList {
    holders: Mutex<Vec<PipelineId>>,
}

impl ReferenceList {
    /// Records one reference held by `pipeline`.
    pub fn add(&self, pipeline: PipelineId) {
        self.holders.lock().unwrap().push(pipeline);
    }

    /// Drops one reference held by `pipeline`. Returns `false` if it held none.
    pub fn remove(&self, pipeline: PipelineId) -> bool {
        let mut holders = self.holders.lock().unwrap();
        match holders.iter().position(|p| *p == pipeline) {
            Some(index) => {
                holders.remove(index);
                true
            }
            None => false,
        }
    }

    /// Total number of references.
    pub fn count(&self) -> usize {
        self.holders.lock().unwrap().len()
    }

    /// Whether `pipeline` holds at least one reference.
    pub fn contains(&self, pipeline: PipelineId) -> bool {
        self.holders.lock().unwrap().contains(&pipeline)
    }

    /// The distinct pipelines holding references.
    pub fn holders(&self) -> Vec<PipelineId> {
        let mut holders = self.holders.lock().unwrap().clone();
        holders.sort();
        holders.dedup();
        holders
    }
}
