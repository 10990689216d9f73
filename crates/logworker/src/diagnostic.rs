//! Always-available raw output used when sinks cannot be relied on

use std::io::Write;

/// Diagnostic escape hatch
///
/// Receives messages that arrive while no sink is registered and the fatal
/// trailer. Implementations must not depend on the pipeline itself.
pub trait Diagnostic: Send + Sync + 'static {
    fn emit(&self, text: &str);
}

/// Writes straight to the process stderr, unbuffered
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrDiagnostic;

impl Diagnostic for StderrDiagnostic {
    fn emit(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nothing sensible is left to report a stderr failure to
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }
}
