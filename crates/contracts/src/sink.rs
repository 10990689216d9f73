//! MessageSink trait - worker output interface
//!
//! Defines the abstract interface for sinks.

use crate::{ContractError, LogMessage};

/// Message output trait
///
/// All sink implementations must implement this trait. Each sink is driven by
/// its own task, so a slow `write` only delays that sink.
#[trait_variant::make(MessageSink: Send)]
pub trait LocalMessageSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one log message
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, message: &LogMessage) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
