//! Pipeline configuration
//!
//! Deserialized by `config_loader`, consumed by `logworker::create_from_config`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Worker thread and runtime settings
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Sinks in registration order
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Active worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the dedicated worker thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Runtime threads driving the sink tasks
    #[serde(default = "default_sink_threads")]
    pub sink_threads: usize,
}

fn default_thread_name() -> String {
    "logworker".to_string()
}

fn default_sink_threads() -> usize {
    2
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            sink_threads: default_sink_threads(),
        }
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// What fan-out does when the queue is full
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Type specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    1024
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Forward to `tracing`
    Tracing,
    /// Append to a log file
    File,
}

/// Behaviour of fan-out when a sink queue is full
///
/// | Policy | On full queue |
/// |--------|---------------|
/// | `Block` | Worker waits for space; no message is lost |
/// | `Drop` | Message is discarded for that sink and counted |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    Block,
    Drop,
}

/// Per-sink options used when registering a sink directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            overflow: OverflowPolicy::Block,
        }
    }
}

impl From<&SinkConfig> for SinkOptions {
    fn from(config: &SinkConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity,
            overflow: config.overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"sinks":[{"name":"out","sink_type":"tracing"}]}"#).unwrap();
        assert_eq!(config.worker.thread_name, "logworker");
        assert_eq!(config.worker.sink_threads, 2);
        assert_eq!(config.sinks[0].queue_capacity, 1024);
        assert_eq!(config.sinks[0].overflow, OverflowPolicy::Block);
    }

    #[test]
    fn test_sink_options_from_config() {
        let config = SinkConfig {
            name: "f".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            overflow: OverflowPolicy::Drop,
            params: HashMap::new(),
        };
        let options = SinkOptions::from(&config);
        assert_eq!(options.queue_capacity, 8);
        assert_eq!(options.overflow, OverflowPolicy::Drop);
    }
}
