//! Session snapshots and status
//!
//! `AgentSession` values are immutable snapshots owned by the session state;
//! callers receive clones. `SessionStatus` is the coarse status derived from
//! protocol traffic.

use chrono::{DateTime, Utc};

use super::identifiers::SessionId;

/// Immutable snapshot of a server-side session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSession {
    /// Opaque server-assigned identifier
    pub id: SessionId,
    /// Display title (server preview text, "Untitled" when blank)
    pub title: String,
    /// Working directory the session runs in
    pub working_dir: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Coarse session status derived from protocol traffic
///
/// Exactly one value is current at any time. Transitions are driven by
/// protocol events; callers cannot set arbitrary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No live agent process
    #[default]
    Disconnected,
    /// Connected and waiting for input
    Idle,
    /// A turn is open and the agent is working
    Busy,
    /// Streaming output is arriving
    Generating,
    /// A reconnect attempt is scheduled
    Retry,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Generating => "generating",
            Self::Retry => "retry",
        };
        f.write_str(s)
    }
}

/// Normalized status of a sub-task item (command, file change, tool call)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// The item is in progress
    Running,
    /// The item finished successfully
    Completed,
    /// The item failed or was declined
    Failed,
}

impl ToolStatus {
    /// Map a raw server item status onto the normalized three-state form
    ///
    /// Unknown values map to `Running`.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("completed") => Self::Completed,
            Some("failed") | Some("declined") => Self::Failed,
            _ => Self::Running,
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
