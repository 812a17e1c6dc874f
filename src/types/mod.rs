//! Core type definitions
//!
//! Newtype identifiers, session snapshots, and transport configuration.

pub mod identifiers;
pub mod options;
pub mod session;

pub use identifiers::{RequestId, SessionId, TurnId};
pub use options::{TransportOptions, TransportOptionsBuilder};
pub use session::{AgentSession, SessionStatus, ToolStatus};
