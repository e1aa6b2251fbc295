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

//! The instance logger.
//!
//! Every component that can fail reports through a [`Logger`] instead of panicking.
//! The logger queues entries and hands them to a [`LogSink`]; the default sink
//! forwards to the `log` facade so `env_logger` (or any other `log` backend) prints
//! them.

mod logger;

pub use self::logger::{FacadeSink, LogEntry, LogSink, Logger, MemorySink, Severity};
