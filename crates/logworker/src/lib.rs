//! # LogWorker
//!
//! Crash-safe asynchronous log worker.
//!
//! Producers on any thread hand messages to a [`Dispatcher`]; a single
//! active worker thread fans each message out to every registered sink in
//! submission order. A fatal event flushes every sink and then ends the
//! process with the original signal. Dropping the [`LogWorker`] drains
//! everything submitted before the drop.
//!
//! The worker's own runtime logs and metrics go through `observability`;
//! install the subscriber (and optionally the Prometheus endpoint) first so
//! `TracingSink` output and the `logworker_*` counters have somewhere to go.
//!
//! ```no_run
//! use logworker::{LogMessage, LogWorker, SinkOptions, TracingSink};
//!
//! observability::init()?;
//! observability::init_metrics_only(9000)?;
//!
//! let worker = LogWorker::new()?;
//! worker.add_sink(TracingSink::new("console"), SinkOptions::default())?;
//! worker.save(LogMessage::info("hello"));
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

mod active;
mod command;
pub mod diagnostic;
pub mod dispatcher;
pub mod error;
mod fatal;
pub mod handle;
pub mod metrics;
mod registry;
pub mod sinks;
pub mod state;
pub mod terminate;
pub mod worker;

pub use contracts::{
    FatalMessage, FatalSignal, LogLevel, LogMessage, MessageSink, OverflowPolicy, SinkOptions,
};
pub use diagnostic::{Diagnostic, StderrDiagnostic};
pub use dispatcher::Dispatcher;
pub use error::LogWorkerError;
pub use fatal::fatal_trailer;
pub use handle::{SinkHandle, SinkRef};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileFormat, FileSink, FileSinkConfig, TracingSink};
pub use state::PipelineState;
pub use terminate::{SignalTerminator, Terminator};
pub use worker::{create_from_config, create_with_default_logger, LogWorker, LogWorkerBuilder};
