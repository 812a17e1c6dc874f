//! # Agent process transport and session-state engine
//!
//! This crate lets an interactive host application delegate long-running
//! tasks to an external AI-agent process and observe its progress
//! asynchronously. It spawns and owns `<program> app-server`, speaks a
//! line-delimited JSON-RPC-shaped protocol over its standard streams,
//! correlates outstanding requests with asynchronous responses, routes
//! server-initiated notifications to the in-flight session, derives a coarse
//! status state machine from that traffic, and recovers transparently from
//! process crashes via supervised restart.
//!
//! ## Architecture
//!
//! - [`protocol::codec`]: one-JSON-object-per-line wire codec
//! - [`transport`]: process supervisor with generation-tagged stream readers
//! - [`protocol::correlator`]: pending-request map keyed by caller-generated ids
//! - [`client`]: typed operation surface, IO dispatch, notification routing
//! - [`state`]: session/turn/status state machine
//! - [`host`]: collaborator traits the host supplies (pause policy, rendering)
//!
//! ## Concurrency model
//!
//! Two background tasks read the process's output and error streams. The IO
//! side only decodes, classifies, completes pending requests, and answers
//! server approval requests; everything that touches UI-visible state is
//! queued and applied when the host calls [`AgentClient::tick`] from its own
//! update loop, so state changes are serialized and never torn. Writes to the
//! process's stdin hold a mutex for the whole line, so concurrent requests
//! never interleave partial lines.
//!
//! ## Failure model
//!
//! Malformed wire lines are logged and dropped, never fatal. Stream closure
//! fails all pending requests of the owning process generation, transitions
//! the status to `Disconnected`, and (when enabled) schedules a fixed-delay
//! restart. Events from a superseded process generation are discarded, so a
//! late failure signal from a dead process cannot corrupt its replacement.
//!
//! ## Quick start
//!
//! See the [`client`] module for a full example; in short: build
//! [`TransportOptions`], implement [`PausePolicy`] and [`MessageSink`], call
//! [`AgentClient::connect`], then drive [`AgentClient::tick`] from the host
//! loop and invoke the typed operations (`create_session`, `send_prompt`,
//! `cancel`, ...) as the user acts.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod host;
pub mod protocol;
pub mod state;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use client::AgentClient;
pub use client::router::route_notification;
pub use error::{AgentError, Result};
pub use host::{MessageSink, PausePolicy};
pub use protocol::{AgentNotification, IncomingMessage, RequestCorrelator};
pub use state::SessionState;
pub use transport::{AppServerProcess, StreamEvent};
pub use types::identifiers::{RequestId, SessionId, TurnId};
pub use types::options::{TransportOptions, TransportOptionsBuilder};
pub use types::session::{AgentSession, SessionStatus, ToolStatus};

/// Version reported in the initialize handshake
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
