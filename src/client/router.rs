//! Notification routing on the main execution context
//!
//! The IO dispatch task only decodes and classifies; everything that touches
//! session state or host collaborators goes through [`apply_event`], called
//! from `tick()` on the host's own update loop.

use crate::host::{MessageSink, PausePolicy};
use crate::protocol::messages::{AgentNotification, ThreadItem};
use crate::state::SessionState;
use crate::types::session::{AgentSession, SessionStatus, ToolStatus};

/// Event queued by the IO side for the main context
#[derive(Debug)]
pub(crate) enum MainEvent {
    /// The initialize handshake succeeded, optionally with a resumed session
    Connected { resumed: Option<AgentSession> },
    /// The owning generation's stream closed
    Disconnected,
    /// A reconnect attempt has been scheduled
    RetryScheduled,
    /// A server approval request was declined because auto-approve is off
    ApprovalDeclined { method: String },
    /// A classified notification
    Notification(AgentNotification),
}

/// Apply one queued event to the state machine and collaborators
pub(crate) fn apply_event(
    state: &mut SessionState,
    event: MainEvent,
    pause: &dyn PausePolicy,
    sink: &dyn MessageSink,
) {
    match event {
        MainEvent::Connected { resumed } => {
            if let Some(session) = resumed {
                state.set_session(session);
            }
            state.set_status(SessionStatus::Idle, pause);
            sink.send_system_message("Agent connected");
        }
        MainEvent::Disconnected => {
            state.set_status(SessionStatus::Disconnected, pause);
        }
        MainEvent::RetryScheduled => {
            state.set_status(SessionStatus::Retry, pause);
        }
        MainEvent::ApprovalDeclined { method } => {
            sink.send_error_message(&format!(
                "{method}: approval requested; auto-approve is disabled"
            ));
        }
        MainEvent::Notification(note) => route_notification(state, &note, pause, sink),
    }
}

/// Route one classified notification
///
/// Notifications referencing a session other than the current one are ignored
/// outright; they are stale events from a previous session.
pub fn route_notification(
    state: &mut SessionState,
    note: &AgentNotification,
    pause: &dyn PausePolicy,
    sink: &dyn MessageSink,
) {
    match note {
        AgentNotification::SessionStarted { session_id } => {
            if state.is_current(session_id) {
                state.set_status(SessionStatus::Idle, pause);
            }
        }
        AgentNotification::TurnStarted {
            session_id,
            turn_id,
        } => {
            if state.is_current(session_id) {
                state.set_turn(turn_id.clone());
                state.set_status(SessionStatus::Busy, pause);
            }
        }
        AgentNotification::TurnCompleted { session_id } => {
            if state.is_current(session_id) {
                sink.flush_current_message();
                state.set_status(SessionStatus::Idle, pause);
                state.set_turn(None);
                sink.send_system_message("Ready for input");
            }
        }
        AgentNotification::OutputDelta { session_id, delta } => {
            if state.is_current(session_id) && !delta.is_empty() {
                state.set_status(SessionStatus::Generating, pause);
                pause.on_output_delta();
                sink.append_delta(delta);
            }
        }
        AgentNotification::ItemStarted { session_id, item } => {
            if state.is_current(session_id) {
                route_item_started(item, sink);
            }
        }
        AgentNotification::ItemCompleted { session_id, item } => {
            if state.is_current(session_id) {
                route_item_completed(item, sink);
            }
        }
        AgentNotification::CommandOutputDelta { session_id, delta } => {
            if state.is_current(session_id) && !delta.trim().is_empty() {
                sink.send_system_message(delta.trim());
            }
        }
        AgentNotification::ToolProgress {
            session_id,
            message,
        } => {
            if state.is_current(session_id) && !message.is_empty() {
                sink.send_system_message(message);
            }
        }
        AgentNotification::Error { message } => {
            sink.send_error_message(message);
        }
    }
}

fn route_item_started(item: &ThreadItem, sink: &dyn MessageSink) {
    match item.kind.as_str() {
        "agentMessage" => sink.start_new_message(),
        "commandExecution" => {
            if let Some(command) = item.command.as_deref()
                && !command.is_empty()
            {
                sink.send_system_message(&format!("Command: {command}"));
            }
            sink.send_tool_activity("commandExecution", ToolStatus::Running);
        }
        "fileChange" => sink.send_tool_activity("fileChange", ToolStatus::Running),
        "mcpToolCall" => {
            sink.send_tool_activity(
                item.tool.as_deref().unwrap_or("mcpToolCall"),
                ToolStatus::Running,
            );
        }
        "webSearch" => {
            if let Some(query) = item.query.as_deref()
                && !query.is_empty()
            {
                sink.send_system_message(&format!("Search: {query}"));
            }
        }
        // Unrecognized item kinds are ignored.
        _ => {}
    }
}

fn route_item_completed(item: &ThreadItem, sink: &dyn MessageSink) {
    match item.kind.as_str() {
        "commandExecution" => {
            sink.send_tool_activity(
                "commandExecution",
                ToolStatus::normalize(item.status.as_deref()),
            );
        }
        "fileChange" => sink.send_tool_activity("fileChange", ToolStatus::Completed),
        "mcpToolCall" => {
            sink.send_tool_activity(
                item.tool.as_deref().unwrap_or("mcpToolCall"),
                ToolStatus::normalize(item.status.as_deref()),
            );
        }
        _ => {}
    }
}
