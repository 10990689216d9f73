//! TracingSink - re-emits log messages as tracing events

use contracts::{ContractError, LogLevel, LogMessage, MessageSink};
use tracing::{debug, error, info, instrument, warn};

/// Sink that forwards every message to the installed tracing subscriber
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    /// Create a new TracingSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn emit(&self, message: &LogMessage) {
        let text = message.text();
        match message.level() {
            LogLevel::Debug => debug!(sink = %self.name, "{text}"),
            LogLevel::Info => info!(sink = %self.name, "{text}"),
            LogLevel::Warning => warn!(sink = %self.name, "{text}"),
            LogLevel::Fatal => error!(sink = %self.name, fatal = true, "{text}"),
        }
    }
}

impl MessageSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, message: &LogMessage) -> Result<(), ContractError> {
        self.emit(message);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        // Subscriber owns its own buffering
        Ok(())
    }

    #[instrument(name = "tracing_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "TracingSink closed");
        Ok(())
    }
}
