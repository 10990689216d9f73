//! LogWorker error types

use thiserror::Error;

/// LogWorker-specific errors
#[derive(Debug, Error)]
pub enum LogWorkerError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Worker thread or runtime could not be started
    #[error("failed to spawn log worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The pipeline no longer accepts this operation
    #[error("log worker is shut down")]
    ShutDown,
}

impl LogWorkerError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
