//! Configuration validation
//!
//! Rules:
//! - worker thread name not empty, `sink_threads > 0`
//! - sink names unique and not empty
//! - `queue_capacity > 0`
//! - file sinks name a `path` or a `directory`

use std::collections::HashSet;

use contracts::{ContractError, PipelineConfig, SinkType};

/// Validate a PipelineConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), ContractError> {
    validate_worker(config)?;
    validate_sink_names(config)?;
    validate_sink_queues(config)?;
    validate_file_sinks(config)?;
    Ok(())
}

fn validate_worker(config: &PipelineConfig) -> Result<(), ContractError> {
    if config.worker.thread_name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "worker.thread_name",
            "thread name cannot be empty",
        ));
    }
    if config.worker.sink_threads == 0 {
        return Err(ContractError::config_validation(
            "worker.sink_threads",
            "sink_threads must be > 0",
        ));
    }
    Ok(())
}

/// Sink names identify metrics, so they must be unique
fn validate_sink_names(config: &PipelineConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

fn validate_sink_queues(config: &PipelineConfig) -> Result<(), ContractError> {
    for sink in &config.sinks {
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_file_sinks(config: &PipelineConfig) -> Result<(), ContractError> {
    for sink in config
        .sinks
        .iter()
        .filter(|s| s.sink_type == SinkType::File)
    {
        if !sink.params.contains_key("path") && !sink.params.contains_key("directory") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params", sink.name),
                "file sink requires 'path' or 'directory'",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OverflowPolicy, SinkConfig, WorkerConfig};
    use std::collections::HashMap;

    fn sink(name: &str, sink_type: SinkType) -> SinkConfig {
        SinkConfig {
            name: name.into(),
            sink_type,
            queue_capacity: 16,
            overflow: OverflowPolicy::Block,
            params: HashMap::new(),
        }
    }

    fn minimal_config() -> PipelineConfig {
        PipelineConfig {
            worker: WorkerConfig::default(),
            sinks: vec![sink("console", SinkType::Tracing)],
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_no_sinks_is_valid() {
        let config = PipelineConfig::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut config = minimal_config();
        config.sinks.push(sink("console", SinkType::Tracing));
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate sink name"));
    }

    #[test]
    fn test_empty_sink_name() {
        let mut config = minimal_config();
        config.sinks[0].name.clear();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("sinks[0].name"));
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut config = minimal_config();
        config.sinks[0].queue_capacity = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("queue_capacity"));
    }

    #[test]
    fn test_zero_sink_threads() {
        let mut config = minimal_config();
        config.worker.sink_threads = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_file_sink_needs_location() {
        let mut config = minimal_config();
        config.sinks.push(sink("file", SinkType::File));
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("'path' or 'directory'"));

        config.sinks[1]
            .params
            .insert("directory".into(), "/tmp".into());
        assert!(validate(&config).is_ok());
    }
}
