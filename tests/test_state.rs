mod common;

use agent_transport::{
    AgentSession, SessionId, SessionState, SessionStatus, ToolStatus, TurnId,
};
use chrono::DateTime;
use common::Recording;

fn session(id: &str) -> AgentSession {
    AgentSession {
        id: SessionId::new(id),
        title: "Untitled".to_string(),
        working_dir: String::new(),
        created_at: DateTime::UNIX_EPOCH,
        updated_at: DateTime::UNIX_EPOCH,
    }
}

#[test]
fn test_initial_state() {
    let state = SessionState::new();
    assert_eq!(state.status(), SessionStatus::Disconnected);
    assert!(state.current_session().is_none());
    assert!(state.turn_id().is_none());
}

#[test]
fn test_status_change_notifies_pause_policy_once() {
    let pause = Recording::new();
    let mut state = SessionState::new();

    assert!(state.set_status(SessionStatus::Idle, &pause));
    assert!(!state.set_status(SessionStatus::Idle, &pause));
    assert!(!state.set_status(SessionStatus::Idle, &pause));

    assert_eq!(pause.statuses(), vec![SessionStatus::Idle]);
}

#[test]
fn test_is_current_checks_session_identity() {
    let mut state = SessionState::new();
    assert!(!state.is_current(&SessionId::new("a")));

    state.set_session(session("a"));
    assert!(state.is_current(&SessionId::new("a")));
    assert!(!state.is_current(&SessionId::new("b")));
}

#[test]
fn test_reset_clears_everything() {
    let pause = Recording::new();
    let mut state = SessionState::new();
    state.set_session(session("a"));
    state.set_turn(Some(TurnId::new("turn-1")));
    state.set_status(SessionStatus::Busy, &pause);

    state.reset();

    assert_eq!(state.status(), SessionStatus::Disconnected);
    assert!(state.current_session().is_none());
    assert!(state.turn_id().is_none());
}

#[test]
fn test_tool_status_normalization() {
    assert_eq!(ToolStatus::normalize(Some("inProgress")), ToolStatus::Running);
    assert_eq!(ToolStatus::normalize(Some("completed")), ToolStatus::Completed);
    assert_eq!(ToolStatus::normalize(Some("failed")), ToolStatus::Failed);
    assert_eq!(ToolStatus::normalize(Some("declined")), ToolStatus::Failed);
    assert_eq!(ToolStatus::normalize(Some("anything")), ToolStatus::Running);
    assert_eq!(ToolStatus::normalize(None), ToolStatus::Running);
}
