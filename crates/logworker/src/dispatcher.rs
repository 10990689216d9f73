//! Dispatcher - thread-safe front door of the pipeline
//!
//! Every operation becomes a command on the active worker queue. `save` and
//! `fatal` only hand the message over; `add_sink` and `sink_metrics` wait
//! for the worker to answer.

use tokio::runtime::Handle;
use tracing::{debug, instrument};

use contracts::{FatalMessage, LogMessage, MessageSink, SinkOptions};
use observability::DropReason;

use crate::command::{Command, CommandSender};
use crate::error::LogWorkerError;
use crate::handle::{SinkHandle, SinkRef};
use crate::metrics::MetricsSnapshot;
use crate::state::{PipelineState, SharedState};

/// Cloneable producer handle
///
/// Clones share the worker queue and the pipeline state, so a fatal event
/// or a teardown seen by one clone is seen by all of them.
#[derive(Clone)]
pub struct Dispatcher {
    commands: CommandSender,
    state: SharedState,
    runtime: Handle,
}

impl Dispatcher {
    pub(crate) fn new(commands: CommandSender, state: SharedState, runtime: Handle) -> Self {
        Self {
            commands,
            state,
            runtime,
        }
    }

    /// Submit a message for fan-out
    ///
    /// Silently dropped once a fatal event started or the pipeline was torn
    /// down.
    pub fn save(&self, message: LogMessage) {
        match self.state.get() {
            PipelineState::Running => {}
            PipelineState::Draining => {
                observability::record_message_dropped(DropReason::Shutdown);
                return;
            }
            PipelineState::Terminated => {
                observability::record_message_dropped(DropReason::TornDown);
                return;
            }
        }

        if self.commands.submit(Command::Save(message)).is_ok() {
            observability::record_message_saved();
        } else {
            observability::record_message_dropped(DropReason::TornDown);
        }
    }

    /// Submit a fatal event
    ///
    /// Accepted until teardown, even while another fatal event is draining;
    /// the worker runs the shutdown protocol for the first one only.
    pub fn fatal(&self, message: FatalMessage) {
        if self.state.get() == PipelineState::Terminated {
            debug!(signal = %message.signal(), "Fatal event after teardown dropped");
            observability::record_message_dropped(DropReason::TornDown);
            return;
        }
        if self.commands.submit(Command::Fatal(message)).is_err() {
            observability::record_message_dropped(DropReason::TornDown);
        }
    }

    /// Register a sink and wait until it is part of the registry
    ///
    /// Messages saved by this thread after `add_sink` returns are delivered
    /// to the new sink.
    #[instrument(name = "dispatcher_add_sink", skip(self, sink), fields(sink = %sink.name()))]
    pub fn add_sink<S: MessageSink + Send + 'static>(
        &self,
        sink: S,
        options: SinkOptions,
    ) -> Result<SinkRef, LogWorkerError> {
        if !self.state.is_running() {
            return Err(LogWorkerError::ShutDown);
        }

        let handle = SinkHandle::spawn_on(sink, options, &self.runtime);
        let sink_ref = handle.sink_ref();
        self.commands
            .submit_and_wait(|done| Command::AddSink(handle, done))?;
        Ok(sink_ref)
    }

    /// Counters of every registered sink, in registration order
    pub fn sink_metrics(&self) -> Result<Vec<(String, MetricsSnapshot)>, LogWorkerError> {
        if !self.state.is_running() {
            return Err(LogWorkerError::ShutDown);
        }
        self.commands.submit_and_wait(Command::Metrics)
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    pub(crate) fn commands(&self) -> &CommandSender {
        &self.commands
    }

    pub(crate) fn shared_state(&self) -> &SharedState {
        &self.state
    }
}
