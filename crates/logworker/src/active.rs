//! Active worker - the single thread that executes every command

use std::io;
use std::sync::Arc;
use std::thread;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::command::Command;
use crate::diagnostic::Diagnostic;
use crate::fatal::{shutdown_on_fatal, FatalContext};
use crate::registry::SinkRegistry;
use crate::state::SharedState;
use crate::terminate::Terminator;

/// Owns the sink registry and drains the command queue in arrival order
pub(crate) struct ActiveWorker {
    registry: SinkRegistry,
    state: SharedState,
    diagnostic: Arc<dyn Diagnostic>,
    terminator: Arc<dyn Terminator>,
}

impl ActiveWorker {
    pub fn new(
        state: SharedState,
        diagnostic: Arc<dyn Diagnostic>,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            registry: SinkRegistry::new(),
            state,
            diagnostic,
            terminator,
        }
    }

    /// Start the worker on its own named thread
    ///
    /// The thread drives the loop with `runtime`, so sink tasks spawned from
    /// commands land on that runtime.
    pub fn spawn(
        self,
        rx: mpsc::UnboundedReceiver<Command>,
        runtime: Handle,
        thread_name: &str,
    ) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || runtime.block_on(self.run(rx)))
    }

    /// Execute commands one at a time until the drain barrier
    ///
    /// Commands still queued behind the barrier are dropped unexecuted.
    #[instrument(name = "log_worker_loop", skip_all)]
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!("Log worker started");

        let mut executed: u64 = 0;

        while let Some(cmd) = rx.recv().await {
            executed += 1;
            match cmd {
                Command::Save(message) => {
                    self.registry
                        .fan_out(message, self.diagnostic.as_ref())
                        .await;
                }
                Command::Fatal(fatal) => {
                    shutdown_on_fatal(
                        FatalContext {
                            registry: &mut self.registry,
                            state: &self.state,
                            diagnostic: self.diagnostic.as_ref(),
                            terminator: self.terminator.as_ref(),
                        },
                        fatal,
                    )
                    .await;
                }
                Command::AddSink(handle, done) => {
                    self.registry.push(handle);
                    let _ = done.send(());
                }
                Command::Metrics(done) => {
                    let _ = done.send(self.registry.snapshot());
                }
                Command::Drain(done) => {
                    self.registry.clear().await;
                    let _ = done.send(());
                    debug!("Drain barrier reached");
                    break;
                }
            }

            if executed % 10_000 == 0 {
                debug!(commands = executed, "Log worker progress");
            }
        }

        // Queue closed without a barrier: still release the sinks cleanly
        self.registry.clear().await;

        info!(commands = executed, "Log worker stopped");
    }
}
