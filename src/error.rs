//! Error types for the agent transport

use thiserror::Error;

/// Main error type for the agent transport
#[derive(Error, Debug)]
pub enum AgentError {
    /// Agent executable could not be started (missing binary, permission denied)
    #[error("Failed to launch agent process: {0}")]
    Launch(String),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Stream EOF or I/O failure; fails all pending requests of the owning generation
    #[error("Transport closed")]
    TransportClosed,

    /// Server returned an `error` object for a specific request
    #[error("Remote error: {message}")]
    Remote {
        /// Error message taken from the server's `error` object
        message: String,
    },

    /// JSON decode error when parsing a wire line
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Caller invoked an operation whose preconditions are not met
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for agent transport operations
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create a launch error
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a remote error from a server `error` object message
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote {
            message: msg.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a JSON decode error from a plain message
    pub fn json_decode(msg: impl Into<String>) -> Self {
        Self::JsonDecode(serde_json::Error::io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            msg.into(),
        )))
    }
}
