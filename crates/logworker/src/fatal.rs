//! Fatal shutdown protocol
//!
//! Runs at most once, on the active worker, after every earlier command.
//!
//! 1. flip to `Draining` (from `Running`, or from `Terminated` when the
//!    event was queued ahead of the teardown barrier)
//! 2. append the trailer and write it to the diagnostic channel
//! 3. deliver to every sink, waiting for queue space whatever the policy
//! 4. clear the registry, draining and closing each sink
//! 5. end the process with the original signal

use tracing::{debug, error};

use contracts::{FatalMessage, FatalSignal, LogLevel};
use observability::DropReason;

use crate::diagnostic::Diagnostic;
use crate::registry::SinkRegistry;
use crate::state::SharedState;
use crate::terminate::Terminator;

/// Text appended to the fatal message before delivery
pub fn fatal_trailer(level: LogLevel, signal: &FatalSignal) -> String {
    format!(
        "\nExiting after fatal event  ({level}). Exiting with signal: {}\n\
         Log content flushed successfully to sink\n\n",
        signal.name()
    )
}

/// Everything the protocol needs from the worker
pub(crate) struct FatalContext<'a> {
    pub registry: &'a mut SinkRegistry,
    pub state: &'a SharedState,
    pub diagnostic: &'a dyn Diagnostic,
    pub terminator: &'a dyn Terminator,
}

/// Flush every sink and end the process with the message's signal
///
/// Returns only when another fatal event already started, in which case the
/// message is discarded.
pub(crate) async fn shutdown_on_fatal(ctx: FatalContext<'_>, fatal: FatalMessage) {
    if !ctx.state.begin_fatal() {
        debug!(state = ?ctx.state.get(), "Fatal event ignored, another one is in progress");
        observability::record_message_dropped(DropReason::Shutdown);
        return;
    }

    let (message, signal) = fatal.into_parts();
    let trailer = fatal_trailer(message.level(), &signal);
    let message = message.appended(&trailer);

    ctx.diagnostic.emit(&message.to_string());
    observability::record_fatal_event(&signal);
    error!(
        signal = %signal,
        sinks = ctx.registry.len(),
        "Fatal event, flushing sinks before exit"
    );

    // Overflow policies do not apply: no sink may discard the fatal message
    ctx.registry.deliver_all_waiting(message).await;
    // Every sink must have written the fatal message before the process ends
    ctx.registry.clear().await;

    let err = ctx.terminator.terminate(&signal);

    ctx.diagnostic.emit(&format!(
        "logworker exited after receiving FATAL trigger ({}). Flush message status: {err}\n",
        signal.name()
    ));
    std::process::abort();
}
