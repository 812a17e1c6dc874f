//! Wire codec: encode and decode single-line protocol messages
//!
//! Framing is newline-delimited; the codec itself never emits or expects a
//! trailing newline (the writer appends one). Malformed lines surface as
//! errors the reader loop logs and drops; they are never fatal.

use serde_json::{Value, json};

use crate::error::{AgentError, Result};
use crate::types::identifiers::RequestId;

use super::messages::IncomingMessage;

/// Decision sent in answer to a server approval request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Allow the requested action
    Accept,
    /// Refuse the requested action
    Decline,
}

impl ApprovalDecision {
    /// Wire representation of the decision
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
        }
    }
}

/// Encode an outgoing request as a single JSON line
///
/// The `params` key is omitted entirely (rather than serialized as `null`)
/// when no parameters exist.
#[must_use]
pub fn encode_request(id: &RequestId, method: &str, params: Option<&Value>) -> String {
    let message = match params {
        Some(params) => json!({
            "id": id.as_str(),
            "method": method,
            "params": params,
        }),
        None => json!({
            "id": id.as_str(),
            "method": method,
        }),
    };
    message.to_string()
}

/// Encode the answer to a server-initiated request
///
/// The server's `id` is echoed back verbatim, whatever its JSON type.
#[must_use]
pub fn encode_decision(id: &Value, decision: ApprovalDecision) -> String {
    json!({
        "id": id,
        "result": { "decision": decision.as_str() },
    })
    .to_string()
}

/// Decode one wire line into a classified message
///
/// Classification: `id` and `method` present is a server-initiated request,
/// `id` alone is a response, `method` alone is a notification.
///
/// # Errors
/// Returns `AgentError::JsonDecode` for non-JSON lines, non-object values,
/// and objects carrying neither `id` nor `method`.
pub fn decode(line: &str) -> Result<IncomingMessage> {
    let value: Value = serde_json::from_str(line.trim())?;
    let Value::Object(ref object) = value else {
        return Err(AgentError::json_decode("wire message is not a JSON object"));
    };

    let has_id = object.contains_key("id");
    let has_method = object.contains_key("method");

    if has_id && has_method {
        let method = object
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::json_decode("server request method is not a string"))?
            .to_string();
        return Ok(IncomingMessage::ServerRequest {
            id: object.get("id").cloned().unwrap_or(Value::Null),
            method,
            params: object.get("params").cloned().unwrap_or_else(|| json!({})),
        });
    }

    if has_id {
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::json_decode("response id is not a string"))?;
        let error = object.get("error").map(|error| {
            error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string()
        });
        // Non-object results collapse to an empty object, same as absence.
        let result = match object.get("result") {
            Some(result) if result.is_object() => result.clone(),
            _ => json!({}),
        };
        return Ok(IncomingMessage::Response {
            id: RequestId::new(id),
            result,
            error,
        });
    }

    if has_method {
        let method = object
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::json_decode("notification method is not a string"))?
            .to_string();
        return Ok(IncomingMessage::Notification {
            method,
            params: object.get("params").cloned().unwrap_or_else(|| json!({})),
        });
    }

    Err(AgentError::json_decode(
        "wire message has neither id nor method",
    ))
}
