//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! the message model, the sink trait, the error type and the pipeline
//! configuration. Business crates depend on this crate, never the other way.
//!
//! ## Message model
//! - `LogMessage` is immutable once built; the worker clones it per sink
//! - `FatalMessage` carries the signal the process must exit with

mod config;
mod error;
mod message;
mod signal;
mod sink;

pub use config::*;
pub use error::*;
pub use message::*;
pub use signal::FatalSignal;
pub use sink::*;
