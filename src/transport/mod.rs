//! Transport layer owning the external agent process
//!
//! The supervisor spawns `<program> app-server`, reads its standard output and
//! error streams on background tasks, and serializes writes to its standard
//! input. Every spawned instance is tagged with a monotonically increasing
//! generation token so events from a superseded process can be recognized as
//! stale and discarded.

pub mod process;

pub use process::{AppServerProcess, StreamEvent};
