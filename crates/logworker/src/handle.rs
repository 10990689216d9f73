//! SinkHandle - owns a sink behind its own queue and task

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{LogMessage, MessageSink, OverflowPolicy, SinkOptions};
use observability::DropReason;

use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Registry entry for one running sink
///
/// Fan-out only touches the queue; the sink itself lives in its task, so a
/// slow sink delays nothing but its own queue.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send messages to the sink task
    tx: mpsc::Sender<LogMessage>,
    /// What to do when the queue is full
    overflow: OverflowPolicy,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Sink task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the sink task on `runtime` and return its handle
    pub fn spawn_on<S: MessageSink + Send + 'static>(
        sink: S,
        options: SinkOptions,
        runtime: &Handle,
    ) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = runtime.spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            overflow: options.overflow,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Opaque reference handed back to the caller of `add_sink`
    pub fn sink_ref(&self) -> SinkRef {
        SinkRef {
            name: self.name.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Hand one message to the sink queue
    ///
    /// Returns true if queued, false if dropped.
    pub async fn deliver(&self, message: LogMessage) -> bool {
        let queued = match self.overflow {
            OverflowPolicy::Block => self.send_waiting(message).await,
            OverflowPolicy::Drop => match self.tx.try_send(message) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.metrics.inc_dropped_count();
                    observability::record_message_dropped(DropReason::QueueFull);
                    warn!(sink = %self.name, "Queue full, message dropped");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    error!(sink = %self.name, "Sink worker closed unexpectedly");
                    false
                }
            },
        };

        if queued {
            self.record_queued();
        }
        queued
    }

    /// Hand one message to the sink queue, waiting for space under any policy
    ///
    /// Used for the fatal message, which no sink may discard.
    pub async fn deliver_waiting(&self, message: LogMessage) -> bool {
        let queued = self.send_waiting(message).await;
        if queued {
            self.record_queued();
        }
        queued
    }

    async fn send_waiting(&self, message: LogMessage) -> bool {
        match self.tx.send(message).await {
            Ok(()) => true,
            Err(_) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    fn record_queued(&self) {
        self.metrics.inc_delivered_count();
        self.metrics
            .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
    }

    /// Close the queue and wait until the sink drained, flushed and closed
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Sink task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Handle returned by `add_sink`
///
/// Names a registered sink and exposes its counters. It does not keep the
/// sink alive and gives no access to the sink itself.
#[derive(Debug, Clone)]
pub struct SinkRef {
    name: String,
    metrics: Arc<SinkMetrics>,
}

impl SinkRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Task that consumes messages and writes them to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: MessageSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<LogMessage>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(message) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&message).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_sink_write(&name, true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_sink_write(&name, false);
                error!(
                    sink = %name,
                    level = %message.level(),
                    error = %e,
                    "Write failed"
                );
                // Keep consuming; one bad write must not stall the sink
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
