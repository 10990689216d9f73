//! Process termination with the semantics of the original signal

use std::io;

use contracts::FatalSignal;

/// Ends the process after a fatal event
///
/// `terminate` only returns if it failed to end the process; the caller then
/// aborts.
pub trait Terminator: Send + Sync + 'static {
    fn terminate(&self, signal: &FatalSignal) -> io::Error;
}

/// Restores the default disposition of the signal and raises it
///
/// Crash reporters and parent processes then see the original signal rather
/// than an exit code.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl Terminator for SignalTerminator {
    fn terminate(&self, signal: &FatalSignal) -> io::Error {
        // SAFETY: resetting a disposition and raising a signal touch no Rust
        // owned memory; both report failure through their return value.
        unsafe {
            if libc::signal(signal.id(), libc::SIG_DFL) == libc::SIG_ERR {
                return io::Error::last_os_error();
            }
            if libc::raise(signal.id()) != 0 {
                return io::Error::last_os_error();
            }
        }
        // Raised but still alive: the signal is blocked or ignored by the default action
        io::Error::other(format!("process survived {}", signal.name()))
    }
}
