//! Host collaborator interfaces
//!
//! The host application supplies these when constructing a client. The
//! transport calls into them from `tick()` and from the caller-facing
//! operations only, never from the IO tasks, so implementations can assume
//! single-threaded access from the host's own update loop.
//!
//! Callbacks run while the client's internal state lock is held:
//! implementations must not call back into the client (including snapshot
//! accessors like `status()`), or they will deadlock. Record what was
//! observed and act on it after the callback returns.

use crate::types::session::{SessionStatus, ToolStatus};

/// Pause/overlay policy collaborator
///
/// Receives status changes (only on change, never duplicates) and a poke for
/// every non-empty output delta.
pub trait PausePolicy: Send + Sync {
    /// The derived session status changed
    fn set_status(&self, status: SessionStatus);

    /// A non-empty streaming output delta arrived for the current session
    fn on_output_delta(&self);

    /// Whether the user is currently typing in the host UI
    fn is_user_typing(&self) -> bool;

    /// The host learned whether the user is typing (cleared when a prompt is sent)
    fn set_user_typing(&self, typing: bool);
}

/// Output-rendering collaborator
///
/// Receives streamed agent output and human-readable transport events.
pub trait MessageSink: Send + Sync {
    /// Append a streaming delta to the in-progress agent message
    fn append_delta(&self, text: &str);

    /// A new agent message is starting
    fn start_new_message(&self);

    /// Flush any incrementally-built output
    fn flush_current_message(&self);

    /// Display a human-readable system line
    fn send_system_message(&self, text: &str);

    /// Display a human-readable error line
    fn send_error_message(&self, text: &str);

    /// Report sub-task item activity with a normalized status
    fn send_tool_activity(&self, name: &str, status: ToolStatus);
}
