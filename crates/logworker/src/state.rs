//! Shared pipeline state (the shutdown flag)

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a pipeline
///
/// `Running -> Draining` when a fatal event starts, `Running -> Terminated`
/// on teardown, `Terminated -> Draining` when a fatal event queued before the
/// teardown barrier reaches the worker. No transition leads back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Draining,
    Terminated,
}

impl PipelineState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            RUNNING => Self::Running,
            DRAINING => Self::Draining,
            _ => Self::Terminated,
        }
    }
}

const RUNNING: u8 = 0;
const DRAINING: u8 = 1;
const TERMINATED: u8 = 2;

/// State handle shared by the worker and every dispatcher clone
#[derive(Debug, Clone)]
pub struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(RUNNING)))
    }

    pub fn get(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.get() == PipelineState::Running
    }

    /// Flip to `Draining`. Only the first caller wins.
    ///
    /// Called by the worker only, and only for commands queued ahead of the
    /// drain barrier, so a teardown that already started (`Terminated`) does
    /// not cancel a fatal event it accepted earlier.
    pub(crate) fn begin_fatal(&self) -> bool {
        match self.transition(RUNNING, DRAINING) {
            Ok(()) => true,
            Err(PipelineState::Terminated) => self.transition(TERMINATED, DRAINING).is_ok(),
            Err(_) => false,
        }
    }

    /// Flip `Running -> Terminated`, returning the state found on failure
    pub(crate) fn begin_teardown(&self) -> Result<(), PipelineState> {
        self.transition(RUNNING, TERMINATED)
    }

    fn transition(&self, from: u8, to: u8) -> Result<(), PipelineState> {
        self.0
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(PipelineState::from_u8)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let state = SharedState::new();
        assert!(state.is_running());
    }

    #[test]
    fn test_fatal_flips_once() {
        let state = SharedState::new();
        let clone = state.clone();
        assert!(state.begin_fatal());
        assert!(!clone.begin_fatal());
        assert_eq!(clone.get(), PipelineState::Draining);
    }

    #[test]
    fn test_teardown_after_fatal_reports_draining() {
        let state = SharedState::new();
        assert!(state.begin_fatal());
        assert_eq!(state.begin_teardown(), Err(PipelineState::Draining));
    }

    #[test]
    fn test_fatal_queued_before_barrier_wins_over_teardown() {
        let state = SharedState::new();
        assert_eq!(state.begin_teardown(), Ok(()));
        assert!(state.begin_fatal());
        assert_eq!(state.get(), PipelineState::Draining);
        assert!(!state.begin_fatal());
    }

    #[test]
    fn test_concurrent_fatal_has_single_winner() {
        let state = SharedState::new();
        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| state.begin_fatal() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(winners, 1);
    }
}
