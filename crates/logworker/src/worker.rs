//! LogWorker - owns the active worker, its runtime and the teardown barrier

use std::path::Path;
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use contracts::{
    FatalMessage, LogMessage, MessageSink, PipelineConfig, SinkConfig, SinkOptions, SinkType,
    WorkerConfig,
};

use crate::active::ActiveWorker;
use crate::command::{Command, CommandSender};
use crate::diagnostic::{Diagnostic, StderrDiagnostic};
use crate::dispatcher::Dispatcher;
use crate::error::LogWorkerError;
use crate::handle::SinkRef;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, FileSinkConfig, TracingSink};
use crate::state::{PipelineState, SharedState};
use crate::terminate::{SignalTerminator, Terminator};

/// Builder for creating a LogWorker
pub struct LogWorkerBuilder {
    config: WorkerConfig,
    diagnostic: Arc<dyn Diagnostic>,
    terminator: Arc<dyn Terminator>,
}

impl Default for LogWorkerBuilder {
    fn default() -> Self {
        Self {
            config: WorkerConfig::default(),
            diagnostic: Arc::new(StderrDiagnostic),
            terminator: Arc::new(SignalTerminator),
        }
    }
}

impl LogWorkerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the stderr diagnostic channel
    pub fn diagnostic(mut self, diagnostic: impl Diagnostic) -> Self {
        self.diagnostic = Arc::new(diagnostic);
        self
    }

    /// Replace the signal based process terminator
    pub fn terminator(mut self, terminator: impl Terminator) -> Self {
        self.terminator = Arc::new(terminator);
        self
    }

    /// Start the runtime and the worker thread
    #[instrument(name = "log_worker_builder_build", skip(self), fields(thread = %self.config.thread_name))]
    pub fn build(self) -> Result<LogWorker, LogWorkerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.sink_threads.max(1))
            .thread_name(format!("{}-sink", self.config.thread_name))
            .enable_all()
            .build()
            .map_err(LogWorkerError::Spawn)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let state = SharedState::new();
        let active = ActiveWorker::new(state.clone(), self.diagnostic, self.terminator);

        let worker_thread =
            match active.spawn(rx, runtime.handle().clone(), &self.config.thread_name) {
                Ok(handle) => handle,
                Err(e) => {
                    runtime.shutdown_background();
                    return Err(LogWorkerError::Spawn(e));
                }
            };

        let dispatcher = Dispatcher::new(CommandSender::from(tx), state, runtime.handle().clone());

        Ok(LogWorker {
            dispatcher,
            worker_thread: Some(worker_thread),
            runtime: Some(runtime),
        })
    }
}

/// A running log pipeline
///
/// Dropping it is the clean shutdown path: no more messages are accepted
/// from any [`Dispatcher`] clone, every message submitted earlier reaches
/// every sink, then the sinks are released. Dropping never starts the fatal
/// path, but it does not cancel a fatal event submitted earlier either: the
/// drop then blocks until that event has flushed every sink and ended the
/// process.
pub struct LogWorker {
    dispatcher: Dispatcher,
    worker_thread: Option<thread::JoinHandle<()>>,
    runtime: Option<Runtime>,
}

impl LogWorker {
    /// Create a pipeline with no sinks and default settings
    pub fn new() -> Result<Self, LogWorkerError> {
        LogWorkerBuilder::new().build()
    }

    pub fn builder() -> LogWorkerBuilder {
        LogWorkerBuilder::new()
    }

    /// Cloneable producer handle for other threads
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn save(&self, message: LogMessage) {
        self.dispatcher.save(message);
    }

    pub fn fatal(&self, message: FatalMessage) {
        self.dispatcher.fatal(message);
    }

    pub fn add_sink<S: MessageSink + Send + 'static>(
        &self,
        sink: S,
        options: SinkOptions,
    ) -> Result<SinkRef, LogWorkerError> {
        self.dispatcher.add_sink(sink, options)
    }

    pub fn sink_metrics(&self) -> Result<Vec<(String, MetricsSnapshot)>, LogWorkerError> {
        self.dispatcher.sink_metrics()
    }

    pub fn state(&self) -> PipelineState {
        self.dispatcher.state()
    }

    fn join_worker(&mut self) {
        if let Some(worker_thread) = self.worker_thread.take() {
            if worker_thread.join().is_err() {
                error!("Log worker thread panicked");
            }
        }
    }
}

impl Drop for LogWorker {
    fn drop(&mut self) {
        match self.dispatcher.shared_state().begin_teardown() {
            Ok(()) => {
                // Everything queued before the barrier runs; anything after it never does.
                // A fatal event queued earlier ends the process before the barrier answers.
                if let Err(e) = self.dispatcher.commands().submit_and_wait(Command::Drain) {
                    warn!(error = %e, "Log worker stopped before the drain barrier");
                }
                self.join_worker();
                info!("Log worker shut down");
            }
            Err(PipelineState::Draining) => {
                // The sinks still flush on this runtime; the fatal protocol ends the process
                warn!("Fatal event in progress, waiting for it to end the process");
                self.join_worker();
            }
            Err(_) => {}
        }

        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Build a pipeline and register every configured sink, in order
#[instrument(name = "log_worker_create", skip(config), fields(sinks = config.sinks.len()))]
pub fn create_from_config(config: &PipelineConfig) -> Result<LogWorker, LogWorkerError> {
    let worker = LogWorker::builder().config(config.worker.clone()).build()?;
    for sink_config in &config.sinks {
        add_configured_sink(&worker, sink_config)?;
    }
    Ok(worker)
}

/// Create a SinkRef from configuration
#[instrument(
    name = "log_worker_add_configured_sink",
    skip(worker, config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn add_configured_sink(worker: &LogWorker, config: &SinkConfig) -> Result<SinkRef, LogWorkerError> {
    let options = SinkOptions::from(config);
    match config.sink_type {
        SinkType::Tracing => worker.add_sink(TracingSink::new(&config.name), options),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| LogWorkerError::sink_creation(&config.name, e.to_string()))?;
            worker.add_sink(sink, options)
        }
    }
}

/// Pipeline with a single file sink writing to `directory`
///
/// The file is named `<prefix>.logworker.<timestamp>.log`.
pub fn create_with_default_logger(
    prefix: &str,
    directory: &Path,
) -> Result<(LogWorker, SinkRef), LogWorkerError> {
    let worker = LogWorker::new()?;
    let sink = FileSink::new("default_file", FileSinkConfig::in_directory(prefix, directory))
        .map_err(|e| LogWorkerError::sink_creation("default_file", e.to_string()))?;
    let sink_ref = worker.add_sink(sink, SinkOptions::default())?;
    Ok((worker, sink_ref))
}
