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

use super::backend::{NullRenderPipeline, RenderPipelineBackend};
use super::reference::PipelineId;
use super::stage::RenderStage;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use crate::platform::Platform;
use crate::utils::Limiter;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

struct PipelineShared {
    id: PipelineId,
    label: String,
    stages: Vec<RenderStage>,
    delegate: Mutex<Box<dyn RenderPipelineBackend>>,
    running: AtomicBool,
    rate: AtomicU64,
    executions: AtomicU64,
    spawns: AtomicU64,
    platform: Platform,
    instance: InstanceHandle,
}

impl PipelineShared {
    fn rate(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    fn execute(&self) {
        self.delegate.lock().unwrap().on_execute(&self.stages);
        self.executions.fetch_add(1, Ordering::Relaxed);
    }

    fn run(&self) {
        log::debug!("Pipeline '{}' thread started", self.label);
        let mut limiter = Limiter::new(self.rate());
        limiter.start();
        while self.running.load(Ordering::Acquire) {
            self.execute();
            if !self.platform.is_os_active() {
                self.running.store(false, Ordering::Release);
                self.instance.log(
                    format!("Pipeline '{}' stopped: the windowing subsystem is gone.", self.label),
                    Severity::Warning,
                );
                break;
            }
            let rate = self.rate();
            if rate != limiter.rate() {
                limiter.set_rate(rate);
            }
            limiter.end_tick();
        }
        log::debug!("Pipeline '{}' thread exited after {} ticks", self.label, limiter.ticks());
    }
}

/// A fixed sequence of render stages, executed in order on its own thread.
///
/// The pipeline is either stopped or running. `start` spawns the execution thread,
/// `stop` clears the running flag and joins it. Both are no-ops when the pipeline is
/// already in the requested state. The thread also stops on its own once the
/// platform reports the windowing subsystem inactive.
///
/// Every framebuffer and window a stage touches records the pipeline as a reference
/// holder for as long as the pipeline lives.
pub struct RenderPipeline {
    shared: Arc<PipelineShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
    destroyed: AtomicBool,
}

impl RenderPipeline {
    /// Builds a pipeline executed by the instance backend and registers it with the
    /// instance. Starts it right away if `start` is set.
    ///
    /// Without a usable backend the pipeline logs a critical warning and does nothing
    /// when executed.
    pub fn new(
        instance: &InstanceContext,
        label: impl Into<String>,
        stages: &[RenderStage],
        start: bool,
    ) -> Arc<Self> {
        let label = label.into();
        let delegate: Box<dyn RenderPipelineBackend> = match instance.backend() {
            Some(backend) => match backend.create_render_pipeline(&label) {
                Ok(delegate) => delegate,
                Err(e) => {
                    instance.log(
                        format!("Pipeline '{label}' falls back to a no-op delegate: {e}"),
                        Severity::CriticalWarning,
                    );
                    Box::new(NullRenderPipeline)
                }
            },
            None => {
                instance.log(
                    format!(
                        "Pipeline '{label}' falls back to a no-op delegate: the {} API has no backend.",
                        instance.api()
                    ),
                    Severity::CriticalWarning,
                );
                Box::new(NullRenderPipeline)
            }
        };
        Self::with_delegate(instance, label, stages, delegate, start)
    }

    /// Builds a pipeline executed by a caller-supplied delegate.
    pub fn with_delegate(
        instance: &InstanceContext,
        label: impl Into<String>,
        stages: &[RenderStage],
        mut delegate: Box<dyn RenderPipelineBackend>,
        start: bool,
    ) -> Arc<Self> {
        let id = PipelineId(NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed));
        let stages = stages.to_vec();
        for stage in &stages {
            for framebuffer in stage.framebuffers() {
                framebuffer.references().add(id);
            }
            for window in stage.windows() {
                window.references().add(id);
            }
        }
        delegate.on_attach(&stages);

        let pipeline = instance.attach(Self {
            shared: Arc::new(PipelineShared {
                id,
                label: label.into(),
                stages,
                delegate: Mutex::new(delegate),
                running: AtomicBool::new(false),
                rate: AtomicU64::new(instance.config().pipeline_rate.to_bits()),
                executions: AtomicU64::new(0),
                spawns: AtomicU64::new(0),
                platform: instance.platform().clone(),
                instance: instance.handle(),
            }),
            thread: Mutex::new(None),
            destroyed: AtomicBool::new(false),
        });
        if start {
            pipeline.start();
        }
        pipeline
    }

    /// The process-unique id.
    pub fn id(&self) -> PipelineId {
        self.shared.id
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// The stages, in execution order.
    pub fn stages(&self) -> &[RenderStage] {
        &self.shared.stages
    }

    /// Whether the execution thread is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Whether the pipeline fell back to the no-op delegate.
    pub fn is_degraded(&self) -> bool {
        let delegate = self.shared.delegate.lock().unwrap();
        (**delegate).as_any().is::<NullRenderPipeline>()
    }

    /// Spawns the execution thread. Does nothing if it is already running or the
    /// pipeline was destroyed.
    pub fn start(&self) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }
        let mut slot = self.thread.lock().unwrap();
        if self.shared.running.load(Ordering::Acquire) {
            return;
        }
        // A thread that stopped on its own still has to be joined.
        if let Some(finished) = slot.take() {
            if finished.join().is_err() {
                self.shared
                    .instance
                    .log(format!("Pipeline '{}' thread panicked.", self.label()), Severity::Error);
            }
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name(format!("ardent-pipeline-{}", self.shared.id.0))
            .spawn(move || shared.run())
        {
            Ok(handle) => {
                self.shared.spawns.fetch_add(1, Ordering::Relaxed);
                *slot = Some(handle);
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                self.shared.instance.log(
                    format!("Failed to spawn the thread of pipeline '{}': {e}", self.label()),
                    Severity::Error,
                );
            }
        }
    }

    /// Stops the execution thread and waits for it to exit. Does nothing if it is not
    /// running. Called from a stage of this pipeline, it only clears the flag.
    pub fn stop(&self) {
        let handle = {
            let mut slot = self.thread.lock().unwrap();
            self.shared.running.store(false, Ordering::Release);
            slot.take()
        };
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            self.shared
                .instance
                .log(format!("Pipeline '{}' thread panicked.", self.label()), Severity::Error);
        }
    }

    /// Executes every stage once on the calling thread.
    pub fn execute_once(&self) {
        if !self.destroyed.load(Ordering::Acquire) {
            self.shared.execute();
        }
    }

    /// Changes the tick rate. Takes effect on the next tick.
    pub fn set_rate(&self, rate: f64) {
        self.shared
            .rate
            .store(rate.max(0.0).to_bits(), Ordering::Relaxed);
    }

    /// The tick rate, in executions per second.
    pub fn rate(&self) -> f64 {
        self.shared.rate()
    }

    /// How many times the stage list was executed so far.
    pub fn executions(&self) -> u64 {
        self.shared.executions.load(Ordering::Relaxed)
    }

    /// How many execution threads were spawned so far.
    pub fn thread_spawns(&self) -> u64 {
        self.shared.spawns.load(Ordering::Relaxed)
    }

    /// Runs `f` on the delegate.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn RenderPipelineBackend) -> R) -> R {
        let mut delegate = self.shared.delegate.lock().unwrap();
        f(&mut **delegate)
    }

    /// Stops the pipeline, destroys its delegate and drops its resource references.
    /// Only the first call does anything.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stop();
        self.shared.delegate.lock().unwrap().on_destroy();
        for stage in &self.shared.stages {
            for framebuffer in stage.framebuffers() {
                framebuffer.references().remove(self.shared.id);
            }
            for window in stage.windows() {
                window.references().remove(self.shared.id);
            }
        }
        self.shared
            .instance
            .log_debug(format!("Pipeline '{}' destroyed.", self.label()));
    }
}

impl InstAttachable for RenderPipeline {
    fn name(&self) -> &str {
        &self.shared.label
    }

    fn type_name(&self) -> &'static str {
        "RenderPipeline"
    }

    fn on_destroy(&self) {
        self.destroy();
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("id", &self.shared.id)
            .field("label", &self.shared.label)
            .field("stages", &self.shared.stages.len())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GraphicsApi;
    use crate::config::EngineConfig;
    use crate::graphics::{Framebuffer, Texture, TextureDescriptor};
    use crate::instance::Instance;
    use crate::logging::MemorySink;
    use crate::math::Color;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    fn instance(platform: &Platform, sink: &MemorySink) -> Instance {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut instance = Instance::with_log_sink(
            "pipelines",
            GraphicsApi::None,
            platform,
            EngineConfig::default(),
            Box::new(sink.clone()),
        );
        instance.stop_updates();
        instance
    }

    struct Counting(Arc<AtomicUsize>);

    impl RenderPipelineBackend for Counting {
        fn on_execute(&mut self, _stages: &[RenderStage]) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn missing_backend_degrades_to_no_op() {
        let platform = Platform::new();
        let sink = MemorySink::new();
        let instance = instance(&platform, &sink);
        let pipeline = RenderPipeline::new(&instance, "idle", &[], false);
        assert!(pipeline.is_degraded());
        assert_eq!(sink.count(Severity::CriticalWarning), 1);
        pipeline.execute_once();
        assert_eq!(pipeline.executions(), 1);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let platform = Platform::new();
        let sink = MemorySink::new();
        let instance = instance(&platform, &sink);
        let ticks = Arc::new(AtomicUsize::new(0));
        let pipeline = RenderPipeline::with_delegate(
            &instance,
            "counting",
            &[],
            Box::new(Counting(ticks.clone())),
            false,
        );
        pipeline.set_rate(1000.0);

        pipeline.stop();
        pipeline.start();
        pipeline.start();
        assert!(pipeline.is_running());
        assert_eq!(pipeline.thread_spawns(), 1);
        assert!(wait_for(|| ticks.load(Ordering::SeqCst) > 2));

        pipeline.stop();
        pipeline.stop();
        assert!(!pipeline.is_running());
        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn inactive_platform_stops_the_thread() {
        let platform = Platform::new();
        let sink = MemorySink::new();
        let instance = instance(&platform, &sink);
        let ticks = Arc::new(AtomicUsize::new(0));
        let pipeline = RenderPipeline::with_delegate(
            &instance,
            "orphan",
            &[],
            Box::new(Counting(ticks.clone())),
            false,
        );
        platform.shutdown();
        pipeline.start();
        assert!(wait_for(|| !pipeline.is_running()));
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        // A self-terminated thread can be restarted.
        pipeline.start();
        assert!(wait_for(|| !pipeline.is_running()));
        assert_eq!(pipeline.thread_spawns(), 2);
    }

    #[test]
    fn references_live_as_long_as_the_pipeline() {
        let platform = Platform::new();
        let sink = MemorySink::new();
        let instance = instance(&platform, &sink);
        let color = Texture::new(&instance, TextureDescriptor::render_target("color", (4, 4)));
        let framebuffer = Framebuffer::new(&instance, "target", vec![color], None).unwrap();

        let stages = [
            RenderStage::clear(&framebuffer, Color::BLACK, None),
            RenderStage::clear(&framebuffer, Color::WHITE, Some(1.0)),
        ];
        let pipeline = RenderPipeline::new(&instance, "clears", &stages, false);
        assert_eq!(framebuffer.references().count(), 2);
        assert!(framebuffer.references().contains(pipeline.id()));

        pipeline.destroy();
        assert_eq!(framebuffer.references().count(), 0);
        pipeline.start();
        assert!(!pipeline.is_running());
    }
}
