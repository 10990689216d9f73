//! FatalSignal - the signal a fatal event terminates the process with

use std::fmt;

/// Signal identity carried by a fatal message
///
/// Holds the raw signal number and its printable name. Crash handlers build
/// one from the signal they caught; contract checks use [`FatalSignal::abort`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FatalSignal {
    id: i32,
    name: String,
}

impl FatalSignal {
    /// Resolve a raw signal number, naming the well known crash signals
    pub fn from_raw(id: i32) -> Self {
        let name = match id {
            libc::SIGABRT => "SIGABRT".to_string(),
            libc::SIGFPE => "SIGFPE".to_string(),
            libc::SIGILL => "SIGILL".to_string(),
            libc::SIGSEGV => "SIGSEGV".to_string(),
            libc::SIGTERM => "SIGTERM".to_string(),
            other => format!("UNKNOWN SIGNAL({other})"),
        };
        Self { id, name }
    }

    pub fn abort() -> Self {
        Self::from_raw(libc::SIGABRT)
    }

    pub fn fpe() -> Self {
        Self::from_raw(libc::SIGFPE)
    }

    pub fn ill() -> Self {
        Self::from_raw(libc::SIGILL)
    }

    pub fn segv() -> Self {
        Self::from_raw(libc::SIGSEGV)
    }

    pub fn term() -> Self {
        Self::from_raw(libc::SIGTERM)
    }

    /// Raw signal number
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Human readable name, e.g. `SIGSEGV`
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FatalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signals_resolve_by_name() {
        assert_eq!(FatalSignal::from_raw(libc::SIGSEGV).name(), "SIGSEGV");
        assert_eq!(FatalSignal::abort().id(), libc::SIGABRT);
        assert_eq!(FatalSignal::fpe().to_string(), "SIGFPE");
    }

    #[test]
    fn test_unknown_signal_keeps_number() {
        let signal = FatalSignal::from_raw(4242);
        assert_eq!(signal.id(), 4242);
        assert_eq!(signal.name(), "UNKNOWN SIGNAL(4242)");
    }
}
