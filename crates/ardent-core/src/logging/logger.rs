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

use crate::config::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How serious a logged message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Diagnostic output, only kept when debug logging is enabled.
    Debug,
    /// Informational message.
    Info,
    /// A message meant for the user of the engine.
    Message,
    /// Something unexpected that the engine recovered from.
    Warning,
    /// A subsystem degraded to a fallback (e.g. a render pipeline that will do nothing).
    CriticalWarning,
    /// An operation was rejected; the engine continues.
    Error,
    /// A resource is unusable; the engine can not proceed for it.
    FatalError,
}

impl Severity {
    /// The `log` crate level this severity is reported at.
    pub fn level(self) -> log::Level {
        match self {
            Severity::Debug => log::Level::Debug,
            Severity::Info | Severity::Message => log::Level::Info,
            Severity::Warning | Severity::CriticalWarning => log::Level::Warn,
            Severity::Error | Severity::FatalError => log::Level::Error,
        }
    }

    /// Upper-case tag used when formatting entries.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Message => "MESSAGE",
            Severity::Warning => "WARNING",
            Severity::CriticalWarning => "CRITICAL_WARNING",
            Severity::Error => "ERROR",
            Severity::FatalError => "FATAL_ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single queued log message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Severity of the message.
    pub severity: Severity,
    /// The message itself.
    pub message: String,
    /// Time since the logger was created.
    pub at: Duration,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>10.3}] [{}] {}",
            self.at.as_secs_f64(),
            self.severity,
            self.message
        )
    }
}

/// Destination of flushed log entries.
pub trait LogSink: Send + Sync {
    /// Writes one entry.
    fn write(&self, entry: &LogEntry);

    /// Flushes any buffering done by the sink itself.
    fn flush(&self) {}
}

/// Forwards entries to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn write(&self, entry: &LogEntry) {
        log::log!(target: "ardent", entry.severity.level(), "{}", entry.message);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Collects entries in memory. Cloning shares the storage.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every entry written so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The messages written so far, in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Number of written entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

/// A queueing logger owned by an instance.
///
/// Dropping the logger flushes everything still queued, after emitting a final
/// shutdown entry.
pub struct Logger {
    config: LoggerConfig,
    created: Instant,
    queue: Mutex<Vec<LogEntry>>,
    sink: Box<dyn LogSink>,
}

impl Logger {
    /// Creates a logger that forwards to the `log` facade.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_sink(config, Box::new(FacadeSink))
    }

    /// Creates a logger writing into a custom sink.
    pub fn with_sink(config: LoggerConfig, sink: Box<dyn LogSink>) -> Self {
        Self {
            config,
            created: Instant::now(),
            queue: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// Queues a message. Messages below the configured minimum severity are dropped,
    /// debug messages are dropped unless debug logging is enabled.
    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        if severity == Severity::Debug && !self.config.debug {
            return;
        }
        if severity < self.config.min_severity {
            return;
        }
        let entry = LogEntry {
            severity,
            message: message.into(),
            at: self.created.elapsed(),
        };
        match self.queue.lock() {
            Ok(mut queue) => queue.push(entry),
            // The queue is only poisoned if a sink panicked; write straight through.
            Err(_) => self.sink.write(&entry),
        }
        if self.config.auto_flush {
            self.print_all();
        }
    }

    /// Queues a debug message.
    pub fn log_debug(&self, message: impl Into<String>) {
        self.log(message, Severity::Debug);
    }

    /// Writes every queued entry to the sink, in the order they were logged.
    pub fn print_all(&self) {
        let drained = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => return,
        };
        for entry in &drained {
            self.sink.write(entry);
        }
        self.sink.flush();
    }

    /// Number of entries waiting for `print_all`.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// The configuration the logger was created with.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("pending", &self.pending())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.log("Logger shut down.", Severity::Info);
        self.print_all();
    }
}
