//! Commands carried from producers to the active worker

use std::thread;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use contracts::{FatalMessage, LogMessage};

use crate::error::LogWorkerError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;

/// One unit of work for the active worker
///
/// Variants holding a `oneshot::Sender` are synchronous: the submitter waits
/// until the worker has executed them.
pub(crate) enum Command {
    Save(LogMessage),
    Fatal(FatalMessage),
    AddSink(SinkHandle, oneshot::Sender<()>),
    Metrics(oneshot::Sender<Vec<(String, MetricsSnapshot)>>),
    /// Barrier: clear the registry, acknowledge, stop the worker loop
    Drain(oneshot::Sender<()>),
}

#[derive(Clone)]
pub(crate) struct CommandSender(mpsc::UnboundedSender<Command>);

impl CommandSender {
    /// Enqueue without waiting
    pub fn submit(&self, cmd: Command) -> Result<(), LogWorkerError> {
        self.0.send(cmd).map_err(|_| LogWorkerError::ShutDown)
    }

    /// Enqueue and block until the worker has executed the command
    ///
    /// Fails with `ShutDown` if the worker stopped before reaching it.
    pub fn submit_and_wait<T: Send>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, LogWorkerError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(make(done_tx))?;
        wait_blocking(done_rx).ok_or(LogWorkerError::ShutDown)
    }
}

impl From<mpsc::UnboundedSender<Command>> for CommandSender {
    fn from(sender: mpsc::UnboundedSender<Command>) -> Self {
        CommandSender(sender)
    }
}

/// Block the current thread on a completion signal
///
/// `blocking_recv` panics on a thread that drives a runtime, so from inside
/// one the wait moves to a scoped helper thread.
fn wait_blocking<T: Send>(done_rx: oneshot::Receiver<T>) -> Option<T> {
    if Handle::try_current().is_ok() {
        thread::scope(|s| s.spawn(move || done_rx.blocking_recv().ok()).join())
            .ok()
            .flatten()
    } else {
        done_rx.blocking_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = CommandSender::from(tx);
        drop(rx);
        assert!(matches!(
            sender.submit(Command::Save(LogMessage::info("late"))),
            Err(LogWorkerError::ShutDown)
        ));
    }

    #[test]
    fn test_submit_and_wait_returns_worker_answer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = CommandSender::from(tx);

        let worker = thread::spawn(move || {
            if let Some(Command::Metrics(done)) = rx.blocking_recv() {
                let _ = done.send(vec![("s1".to_string(), MetricsSnapshot::default())]);
            }
        });

        let answer = sender.submit_and_wait(Command::Metrics).unwrap();
        assert_eq!(answer[0].0, "s1");
        worker.join().unwrap();
    }

    #[test]
    fn test_submit_and_wait_fails_when_command_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = CommandSender::from(tx);

        let worker = thread::spawn(move || {
            // Dequeue and discard without acknowledging
            let _ = rx.blocking_recv();
        });

        assert!(matches!(
            sender.submit_and_wait(Command::Drain),
            Err(LogWorkerError::ShutDown)
        ));
        worker.join().unwrap();
    }

    #[tokio::test]
    async fn test_submit_and_wait_inside_runtime() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = CommandSender::from(tx);

        let worker = thread::spawn(move || {
            if let Some(Command::Drain(done)) = rx.blocking_recv() {
                let _ = done.send(());
            }
        });

        assert!(sender.submit_and_wait(Command::Drain).is_ok());
        worker.join().unwrap();
    }
}
