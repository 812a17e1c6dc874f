//! Transport configuration options
//!
//! Configuration consumed read-only by the transport, including a builder
//! pattern for easy setup. Persistence of these values (and of the last-used
//! session id) belongs to the host, not to this crate.

use std::path::PathBuf;
use std::time::Duration;

use super::identifiers::SessionId;

/// Upper bound applied to `page_size`
const MAX_PAGE_SIZE: usize = 200;

/// Default number of sessions requested per `list_sessions` call
const DEFAULT_PAGE_SIZE: usize = 50;

/// Default delay between reconnect attempts
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Configuration for the agent transport
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Agent executable: an absolute path, or a bare name resolved via `PATH`
    pub program: PathBuf,
    /// Working directory passed to session and turn requests
    pub working_dir: Option<PathBuf>,
    /// Answer server approval requests with "accept" instead of "decline"
    pub auto_approve: bool,
    /// Schedule a restart after stream closure or launch failure
    pub auto_reconnect: bool,
    /// Fixed delay before each reconnect attempt
    pub reconnect_delay: Duration,
    /// Session to resume (best-effort) after the initialize handshake
    pub last_session_id: Option<SessionId>,
    /// Page size for `list_sessions` (bounded)
    pub page_size: usize,
    /// Client name reported in the initialize handshake
    pub client_name: String,
    /// Client title reported in the initialize handshake
    pub client_title: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("codex"),
            working_dir: None,
            auto_approve: false,
            auto_reconnect: true,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            last_session_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            client_name: "agent-transport".to_string(),
            client_title: "Agent Transport".to_string(),
        }
    }
}

impl TransportOptions {
    /// Create a new builder for `TransportOptions`
    #[must_use]
    pub fn builder() -> TransportOptionsBuilder {
        TransportOptionsBuilder::default()
    }
}

/// Builder for [`TransportOptions`]
#[derive(Debug, Default)]
pub struct TransportOptionsBuilder {
    options: TransportOptions,
}

impl TransportOptionsBuilder {
    /// Set the agent executable (path or bare name)
    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.options.program = program.into();
        self
    }

    /// Set the working directory for sessions and turns
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.working_dir = Some(dir.into());
        self
    }

    /// Enable or disable auto-approval of server approval requests
    #[must_use]
    pub fn auto_approve(mut self, value: bool) -> Self {
        self.options.auto_approve = value;
        self
    }

    /// Enable or disable automatic reconnection
    #[must_use]
    pub fn auto_reconnect(mut self, value: bool) -> Self {
        self.options.auto_reconnect = value;
        self
    }

    /// Set the fixed delay between reconnect attempts
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.options.reconnect_delay = delay;
        self
    }

    /// Set the session id to resume after connecting
    #[must_use]
    pub fn last_session_id(mut self, id: impl Into<SessionId>) -> Self {
        self.options.last_session_id = Some(id.into());
        self
    }

    /// Set the page size for `list_sessions` (clamped to a sane bound)
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.options.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set the client name reported in the initialize handshake
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.options.client_name = name.into();
        self
    }

    /// Set the client title reported in the initialize handshake
    #[must_use]
    pub fn client_title(mut self, title: impl Into<String>) -> Self {
        self.options.client_title = title.into();
        self
    }

    /// Build the final options
    #[must_use]
    pub fn build(self) -> TransportOptions {
        self.options
    }
}
