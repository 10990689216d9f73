//! Sink registry and message fan-out
//!
//! Owned by the active worker; nothing else mutates it.

use tracing::{debug, instrument};

use contracts::LogMessage;

use crate::diagnostic::Diagnostic;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;

/// Ordered sink handles, in registration order
#[derive(Default)]
pub(crate) struct SinkRegistry {
    handles: Vec<SinkHandle>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: SinkHandle) {
        debug!(sink = %handle.name(), position = self.handles.len(), "Sink registered");
        self.handles.push(handle);
        observability::record_sinks_registered(self.handles.len());
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Deliver to every sink, or to the diagnostic channel when there is none
    pub async fn fan_out(&self, message: LogMessage, diagnostic: &dyn Diagnostic) {
        if self.is_empty() {
            diagnostic.emit(&format!("logworker has no sinks. Message: [{message}]\n"));
            observability::record_no_sink_diagnostic();
            return;
        }
        self.deliver_all(message).await;
    }

    /// Hand an independent copy to each sink, in registration order
    pub async fn deliver_all(&self, message: LogMessage) {
        for handle in &self.handles {
            handle.deliver(message.clone()).await;
        }
    }

    /// Like `deliver_all`, but every sink waits for queue space
    pub async fn deliver_all_waiting(&self, message: LogMessage) {
        for handle in &self.handles {
            handle.deliver_waiting(message.clone()).await;
        }
    }

    /// Release every sink, waiting until each has drained its queue
    #[instrument(name = "sink_registry_clear", skip(self), fields(sinks = self.handles.len()))]
    pub async fn clear(&mut self) {
        for handle in self.handles.drain(..) {
            handle.shutdown().await;
        }
        observability::record_sinks_registered(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, MessageSink, SinkOptions};
    use std::sync::{Arc, Mutex};
    use tokio::runtime::Handle;

    struct VecSink {
        name: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl MessageSink for VecSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, message: &LogMessage) -> Result<(), ContractError> {
            self.seen.lock().unwrap().push(message.text().to_string());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDiagnostic(Mutex<Vec<String>>);

    impl Diagnostic for RecordingDiagnostic {
        fn emit(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    fn vec_sink(registry: &mut SinkRegistry, name: &str) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = VecSink {
            name: name.to_string(),
            seen: Arc::clone(&seen),
        };
        registry.push(SinkHandle::spawn_on(
            sink,
            SinkOptions::default(),
            &Handle::current(),
        ));
        seen
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_sink_in_order() {
        let mut registry = SinkRegistry::new();
        let first = vec_sink(&mut registry, "first");
        let second = vec_sink(&mut registry, "second");
        let diagnostic = RecordingDiagnostic::default();

        for text in ["a", "b", "c"] {
            registry.fan_out(LogMessage::info(text), &diagnostic).await;
        }
        registry.clear().await;

        assert_eq!(*first.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(*second.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(diagnostic.0.lock().unwrap().is_empty());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_empty_registry_routes_to_diagnostic() {
        let registry = SinkRegistry::new();
        let diagnostic = RecordingDiagnostic::default();

        registry
            .fan_out(LogMessage::warning("nobody listens"), &diagnostic)
            .await;

        let emitted = diagnostic.0.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(
            emitted[0],
            "logworker has no sinks. Message: [WARNING nobody listens]\n"
        );
    }

    #[tokio::test]
    async fn test_snapshot_keeps_registration_order() {
        let mut registry = SinkRegistry::new();
        vec_sink(&mut registry, "z");
        vec_sink(&mut registry, "a");

        let names: Vec<_> = registry.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(registry.len(), 2);
        registry.clear().await;
    }
}
