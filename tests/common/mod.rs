//! Recording collaborator doubles shared by the integration tests
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use agent_transport::{MessageSink, PausePolicy, SessionStatus, ToolStatus};

/// Route crate logging to the test harness (idempotent across tests)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every collaborator call for assertion
#[derive(Default)]
pub struct Recording {
    pub statuses: Mutex<Vec<SessionStatus>>,
    pub delta_pokes: AtomicUsize,
    pub typing: AtomicBool,
    pub log: Mutex<Vec<String>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<SessionStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl PausePolicy for Recording {
    fn set_status(&self, status: SessionStatus) {
        self.statuses.lock().unwrap().push(status);
    }

    fn on_output_delta(&self) {
        self.delta_pokes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_user_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    fn set_user_typing(&self, typing: bool) {
        self.typing.store(typing, Ordering::SeqCst);
    }
}

impl MessageSink for Recording {
    fn append_delta(&self, text: &str) {
        self.log.lock().unwrap().push(format!("delta:{text}"));
    }

    fn start_new_message(&self) {
        self.log.lock().unwrap().push("start".to_string());
    }

    fn flush_current_message(&self) {
        self.log.lock().unwrap().push("flush".to_string());
    }

    fn send_system_message(&self, text: &str) {
        self.log.lock().unwrap().push(format!("system:{text}"));
    }

    fn send_error_message(&self, text: &str) {
        self.log.lock().unwrap().push(format!("error:{text}"));
    }

    fn send_tool_activity(&self, name: &str, status: ToolStatus) {
        self.log.lock().unwrap().push(format!("tool:{name}:{status}"));
    }
}
