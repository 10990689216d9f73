//! Log messages handed from producers to the worker.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FatalSignal;

/// Severity of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Fatal,
}

impl LogLevel {
    /// Upper-case name used in rendered messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log record
///
/// Built by a producer, then moved into the pipeline. The worker clones it
/// once per registered sink; nothing mutates it in place afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    level: LogLevel,
    text: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn debug(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, text)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the message and return a copy with `suffix` appended to its text
    pub fn appended(mut self, suffix: &str) -> Self {
        self.text.push_str(suffix);
        self
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.text)
    }
}

/// A log message that ends the process
///
/// Carries the signal whose default disposition the process exits with once
/// every sink has received the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalMessage {
    message: LogMessage,
    signal: FatalSignal,
}

impl FatalMessage {
    /// Create a fatal message at `FATAL` level
    pub fn new(text: impl Into<String>, signal: FatalSignal) -> Self {
        Self {
            message: LogMessage::new(LogLevel::Fatal, text),
            signal,
        }
    }

    /// Wrap an already built message
    pub fn from_message(message: LogMessage, signal: FatalSignal) -> Self {
        Self { message, signal }
    }

    pub fn message(&self) -> &LogMessage {
        &self.message
    }

    pub fn signal(&self) -> &FatalSignal {
        &self.signal
    }

    pub fn into_parts(self) -> (LogMessage, FatalSignal) {
        (self.message, self.signal)
    }
}
