//! Session state machine
//!
//! Tracks the current session identity, the open turn (if any), and the
//! coarse status derived from protocol traffic. Status transitions fire the
//! pause-policy collaborator exactly once per change; setting the current
//! value again is a no-op and fires nothing.

use crate::host::PausePolicy;
use crate::types::identifiers::{SessionId, TurnId};
use crate::types::session::{AgentSession, SessionStatus};

/// Mutable session/turn/status state owned by the client
///
/// Mutated only through the single-threaded re-dispatch boundary (the host's
/// `tick()` drain) and the caller-facing operations; the IO tasks never touch
/// it directly.
#[derive(Default)]
pub struct SessionState {
    current_session: Option<AgentSession>,
    turn_id: Option<TurnId>,
    status: SessionStatus,
}

impl SessionState {
    /// Create a fresh state: no session, no turn, `Disconnected`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current coarse status
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Current session snapshot, if any
    #[must_use]
    pub fn current_session(&self) -> Option<&AgentSession> {
        self.current_session.as_ref()
    }

    /// Open turn id, present only while the agent is actively working
    #[must_use]
    pub fn turn_id(&self) -> Option<&TurnId> {
        self.turn_id.as_ref()
    }

    /// Whether `id` refers to the currently-active session
    ///
    /// Guards against stale events from a previous session.
    #[must_use]
    pub fn is_current(&self, id: &SessionId) -> bool {
        self.current_session
            .as_ref()
            .is_some_and(|session| session.id == *id)
    }

    /// Replace the current session reference
    pub fn set_session(&mut self, session: AgentSession) {
        self.current_session = Some(session);
    }

    /// Record or clear the open turn id
    pub fn set_turn(&mut self, turn: Option<TurnId>) {
        self.turn_id = turn;
    }

    /// Transition the status, notifying the pause policy only on change
    ///
    /// Returns whether the status actually changed.
    pub fn set_status(&mut self, status: SessionStatus, pause: &dyn PausePolicy) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        pause.set_status(status);
        true
    }

    /// Reset to the initial state (backend-switch path)
    ///
    /// The one narrow path where status is set outside protocol traffic: the
    /// host switches to a different backend and discards this one's state.
    pub fn reset(&mut self) {
        self.current_session = None;
        self.turn_id = None;
        self.status = SessionStatus::Disconnected;
    }
}
