//! Typed protocol message classification and payload records

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::identifiers::{RequestId, SessionId, TurnId};
use crate::types::session::AgentSession;

/// A decoded wire message, classified by shape
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Response to an outstanding request (`id`, no `method`)
    Response {
        /// Request id this responds to
        id: RequestId,
        /// Result payload, `{}` when absent
        result: Value,
        /// Error message when the server returned an `error` object
        error: Option<String>,
    },
    /// Server-initiated request requiring an answer (`id` and `method`)
    ServerRequest {
        /// Raw id to echo back in the answer
        id: Value,
        /// Method name
        method: String,
        /// Request parameters, `{}` when absent
        params: Value,
    },
    /// Unsolicited notification (`method`, no `id`)
    Notification {
        /// Method name
        method: String,
        /// Notification parameters, `{}` when absent
        params: Value,
    },
}

/// A recognized notification, classified by method family
#[derive(Debug, Clone)]
pub enum AgentNotification {
    /// A session started or was resumed
    SessionStarted {
        /// Session the event refers to
        session_id: SessionId,
    },
    /// A turn opened within a session
    TurnStarted {
        /// Session the turn belongs to
        session_id: SessionId,
        /// Server-assigned turn id, when present
        turn_id: Option<TurnId>,
    },
    /// The open turn completed
    TurnCompleted {
        /// Session the turn belonged to
        session_id: SessionId,
    },
    /// Incremental agent message output
    OutputDelta {
        /// Session the output belongs to
        session_id: SessionId,
        /// Text fragment (may be empty)
        delta: String,
    },
    /// A sub-task item started
    ItemStarted {
        /// Session the item belongs to
        session_id: SessionId,
        /// Item payload
        item: ThreadItem,
    },
    /// A sub-task item completed
    ItemCompleted {
        /// Session the item belonged to
        session_id: SessionId,
        /// Item payload
        item: ThreadItem,
    },
    /// Incremental output from an executing command
    CommandOutputDelta {
        /// Session the output belongs to
        session_id: SessionId,
        /// Text fragment (may be empty)
        delta: String,
    },
    /// Progress message from a tool call
    ToolProgress {
        /// Session the tool call belongs to
        session_id: SessionId,
        /// Human-readable progress text
        message: String,
    },
    /// Bare error notification from the server
    Error {
        /// Error text
        message: String,
    },
}

impl AgentNotification {
    /// Classify a notification by method name
    ///
    /// Returns `None` for unrecognized methods and for recognized methods
    /// missing their session id; callers log and ignore those for forward
    /// compatibility.
    #[must_use]
    pub fn classify(method: &str, params: &Value) -> Option<Self> {
        if method == "error" {
            let message = params.get("message")?.as_str()?.to_string();
            return Some(Self::Error { message });
        }

        let session_id = SessionId::new(params.get("threadId")?.as_str()?);

        match method {
            "thread/started" | "thread/resumed" => Some(Self::SessionStarted { session_id }),
            "turn/started" => {
                let turn_id = params
                    .get("turn")
                    .and_then(|turn| turn.get("id"))
                    .and_then(Value::as_str)
                    .map(TurnId::new);
                Some(Self::TurnStarted {
                    session_id,
                    turn_id,
                })
            }
            "turn/completed" => Some(Self::TurnCompleted { session_id }),
            "item/agentMessage/delta" => Some(Self::OutputDelta {
                session_id,
                delta: params
                    .get("delta")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            "item/started" => Some(Self::ItemStarted {
                session_id,
                item: ThreadItem::from_params(params),
            }),
            "item/completed" => Some(Self::ItemCompleted {
                session_id,
                item: ThreadItem::from_params(params),
            }),
            "item/commandExecution/outputDelta" => Some(Self::CommandOutputDelta {
                session_id,
                delta: params
                    .get("delta")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            "item/mcpToolCall/progress" => Some(Self::ToolProgress {
                session_id,
                message: params
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            _ => None,
        }
    }
}

/// Sub-task item payload from `item/started` and `item/completed`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadItem {
    /// Item kind (`agentMessage`, `commandExecution`, `fileChange`,
    /// `mcpToolCall`, `webSearch`, or something newer)
    #[serde(rename = "type")]
    pub kind: String,
    /// Command line, for command execution items
    pub command: Option<String>,
    /// Tool name, for tool call items
    pub tool: Option<String>,
    /// Search query, for web search items
    pub query: Option<String>,
    /// Raw server status, normalized via [`ToolStatus::normalize`](crate::types::ToolStatus::normalize)
    pub status: Option<String>,
}

impl ThreadItem {
    /// Extract the `item` object from notification params
    ///
    /// Missing or malformed items yield a default (unrecognized) item, which
    /// downstream routing ignores.
    #[must_use]
    pub fn from_params(params: &Value) -> Self {
        params
            .get("item")
            .cloned()
            .and_then(|item| serde_json::from_value(item).ok())
            .unwrap_or_default()
    }
}

/// Session record as the server describes it in `thread/*` results
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadRecord {
    /// Server-assigned id
    pub id: Option<String>,
    /// Preview text used as the display title
    pub preview: Option<String>,
    /// Working directory
    pub cwd: Option<String>,
    /// Creation time, epoch milliseconds
    pub created_at: Option<i64>,
}

impl ThreadRecord {
    /// Build a record from the `thread` object of a result payload
    #[must_use]
    pub fn from_result(result: &Value) -> Self {
        result
            .get("thread")
            .cloned()
            .and_then(|thread| serde_json::from_value(thread).ok())
            .unwrap_or_default()
    }

    /// Convert into a session snapshot, with fallbacks for absent fields
    #[must_use]
    pub fn into_session(self) -> AgentSession {
        let created_at = self
            .created_at
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(DateTime::UNIX_EPOCH);
        let title = match self.preview {
            Some(preview) if !preview.trim().is_empty() => preview,
            _ => "Untitled".to_string(),
        };
        AgentSession {
            id: SessionId::new(self.id.unwrap_or_else(|| "unknown".to_string())),
            title,
            working_dir: self.cwd.unwrap_or_default(),
            created_at,
            updated_at: created_at,
        }
    }
}
