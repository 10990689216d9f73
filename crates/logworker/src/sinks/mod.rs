//! Built-in sinks
//!
//! Contains TracingSink and FileSink.

mod file;
mod tracing_sink;

pub use self::file::{FileFormat, FileSink, FileSinkConfig};
pub use self::tracing_sink::TracingSink;
