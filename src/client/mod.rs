//! `AgentClient`: typed operation surface over the agent transport
//!
//! The client owns the process supervisor, the request correlator, the
//! session state machine, and the reconnection policy. Two background tasks
//! read the process's output and error streams; a dispatch task completes
//! pending requests and queues everything that touches shared state for the
//! host. The host drives the main-context side by calling [`AgentClient::tick`]
//! from its own update loop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_transport::{AgentClient, TransportOptions};
//! # use agent_transport::{MessageSink, PausePolicy, SessionStatus, ToolStatus};
//! # struct Quiet;
//! # impl PausePolicy for Quiet {
//! #     fn set_status(&self, _: SessionStatus) {}
//! #     fn on_output_delta(&self) {}
//! #     fn is_user_typing(&self) -> bool { false }
//! #     fn set_user_typing(&self, _: bool) {}
//! # }
//! # impl MessageSink for Quiet {
//! #     fn append_delta(&self, _: &str) {}
//! #     fn start_new_message(&self) {}
//! #     fn flush_current_message(&self) {}
//! #     fn send_system_message(&self, _: &str) {}
//! #     fn send_error_message(&self, _: &str) {}
//! #     fn send_tool_activity(&self, _: &str, _: ToolStatus) {}
//! # }
//!
//! # async fn example() -> agent_transport::Result<()> {
//! let options = TransportOptions::builder().program("codex").build();
//! let collaborators = Arc::new(Quiet);
//! let client = AgentClient::connect(options, collaborators.clone(), collaborators).await;
//!
//! let session = client.create_session().await?;
//! client.send_prompt("Summarize the repo").await?;
//! loop {
//!     client.tick();
//!     // ... host frame work ...
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

mod dispatch;
pub mod router;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::error::{AgentError, Result};
use crate::host::{MessageSink, PausePolicy};
use crate::protocol::codec;
use crate::protocol::correlator::RequestCorrelator;
use crate::protocol::messages::ThreadRecord;
use crate::state::SessionState;
use crate::transport::{AppServerProcess, StreamEvent};
use crate::types::identifiers::{RequestId, SessionId, TurnId};
use crate::types::options::TransportOptions;
use crate::types::session::{AgentSession, SessionStatus};

use router::MainEvent;

/// State shared between the client handle and its background tasks
pub(crate) struct ClientShared {
    pub(crate) options: TransportOptions,
    pub(crate) process: AppServerProcess,
    pub(crate) correlator: RequestCorrelator,
    pub(crate) state: parking_lot::Mutex<SessionState>,
    pub(crate) main_tx: mpsc::UnboundedSender<MainEvent>,
    pub(crate) stream_tx: mpsc::UnboundedSender<StreamEvent>,
    pub(crate) shutting_down: AtomicBool,
    pub(crate) initialized: AtomicBool,
    pub(crate) reconnect_scheduled: AtomicBool,
    pub(crate) pause: Arc<dyn PausePolicy>,
    pub(crate) sink: Arc<dyn MessageSink>,
}

impl ClientShared {
    /// Send a request and await its correlated response
    ///
    /// Non-blocking on the wire side: the request id is registered before the
    /// line is written, and suspension happens only on the completion handle.
    /// No timeout is imposed here; callers guard with their own if desired.
    pub(crate) async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = RequestId::generate();
        let rx = self
            .correlator
            .register(id.clone(), self.process.current_generation());
        let line = codec::encode_request(&id, method, params.as_ref());
        self.process.write_line(&line).await;
        rx.await.map_err(|_| AgentError::TransportClosed)?
    }

    /// Resume a server-side session by id
    pub(crate) async fn resume_session(&self, id: &SessionId) -> Result<AgentSession> {
        let params = json!({ "threadId": id.as_str() });
        let result = self.request("thread/resume", Some(params)).await?;
        Ok(ThreadRecord::from_result(&result).into_session())
    }
}

/// Client for delegating long-running tasks to an external agent process
pub struct AgentClient {
    shared: Arc<ClientShared>,
    main_rx: parking_lot::Mutex<mpsc::UnboundedReceiver<MainEvent>>,
}

impl AgentClient {
    /// Spawn the agent process and return a connected client
    ///
    /// A launch failure does not surface as a construction error: the failure
    /// is logged and, when auto-reconnect is enabled, a restart is scheduled
    /// after the configured delay.
    pub async fn connect(
        options: TransportOptions,
        pause: Arc<dyn PausePolicy>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        let (stream_tx, stream_rx) = mpsc::unbounded_channel();
        let (main_tx, main_rx) = mpsc::unbounded_channel();

        let process =
            AppServerProcess::new(options.program.clone(), options.working_dir.clone());
        let shared = Arc::new(ClientShared {
            options,
            process,
            correlator: RequestCorrelator::new(),
            state: parking_lot::Mutex::new(SessionState::new()),
            main_tx,
            stream_tx,
            shutting_down: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            reconnect_scheduled: AtomicBool::new(false),
            pause,
            sink,
        });

        tokio::spawn(dispatch::run(Arc::clone(&shared), stream_rx));

        match shared.process.start(shared.stream_tx.clone()).await {
            Ok(_) => dispatch::spawn_initialize(&shared),
            Err(e) => {
                log::warn!("failed to start agent process: {e}");
                dispatch::schedule_reconnect(&shared);
            }
        }

        Self {
            shared,
            main_rx: parking_lot::Mutex::new(main_rx),
        }
    }

    /// Start a new session and make it current
    ///
    /// The returned snapshot carries the server-assigned id; persisting it
    /// for later resume is the caller's job.
    pub async fn create_session(&self) -> Result<AgentSession> {
        let mut params = json!({});
        if let Some(ref dir) = self.shared.options.working_dir {
            params["cwd"] = json!(dir.to_string_lossy());
        }
        let result = self.shared.request("thread/start", Some(params)).await?;
        let session = ThreadRecord::from_result(&result).into_session();

        let mut state = self.shared.state.lock();
        state.set_session(session.clone());
        state.set_status(SessionStatus::Idle, &*self.shared.pause);
        Ok(session)
    }

    /// List existing sessions, bounded by the configured page size
    pub async fn list_sessions(&self) -> Result<Vec<AgentSession>> {
        let params = json!({ "limit": self.shared.options.page_size });
        let result = self.shared.request("thread/list", Some(params)).await?;

        let sessions = result
            .get("data")
            .and_then(Value::as_array)
            .map(|data| {
                data.iter()
                    .filter_map(|entry| {
                        serde_json::from_value::<ThreadRecord>(entry.clone()).ok()
                    })
                    .map(ThreadRecord::into_session)
                    .collect()
            })
            .unwrap_or_default();
        Ok(sessions)
    }

    /// Resume an existing session and make it current
    pub async fn switch_to_session(&self, id: &SessionId) -> Result<AgentSession> {
        let session = self.shared.resume_session(id).await?;

        let mut state = self.shared.state.lock();
        state.set_session(session.clone());
        state.set_status(SessionStatus::Idle, &*self.shared.pause);
        Ok(session)
    }

    /// Send a prompt on the current session
    ///
    /// Fails immediately with `InvalidState` when no session is active; the
    /// transport does not queue prompts.
    pub async fn send_prompt(&self, text: &str) -> Result<()> {
        let session_id = {
            let state = self.shared.state.lock();
            state.current_session().map(|session| session.id.clone())
        };
        let Some(session_id) = session_id else {
            return Err(AgentError::invalid_state("no active session"));
        };

        self.shared.pause.set_user_typing(false);
        self.shared
            .state
            .lock()
            .set_status(SessionStatus::Busy, &*self.shared.pause);

        let mut params = json!({
            "threadId": session_id.as_str(),
            "input": [{ "type": "text", "text": text }],
        });
        if let Some(ref dir) = self.shared.options.working_dir {
            params["cwd"] = json!(dir.to_string_lossy());
        }

        match self.shared.request("turn/start", Some(params)).await {
            Ok(result) => {
                let turn_id = result
                    .get("turn")
                    .and_then(|turn| turn.get("id"))
                    .and_then(Value::as_str)
                    .map(TurnId::new);
                self.shared.state.lock().set_turn(turn_id);
                Ok(())
            }
            Err(e) => {
                self.shared.sink.send_error_message(&format!("Failed: {e}"));
                self.shared
                    .state
                    .lock()
                    .set_status(SessionStatus::Idle, &*self.shared.pause);
                Err(e)
            }
        }
    }

    /// Interrupt the open turn
    ///
    /// A no-op success when no turn is open; no wire message is sent.
    pub async fn cancel(&self) -> Result<()> {
        let (session_id, turn_id) = {
            let state = self.shared.state.lock();
            (
                state.current_session().map(|session| session.id.clone()),
                state.turn_id().cloned(),
            )
        };
        let (Some(session_id), Some(turn_id)) = (session_id, turn_id) else {
            return Ok(());
        };

        let params = json!({
            "threadId": session_id.as_str(),
            "turnId": turn_id.as_str(),
        });
        self.shared.request("turn/interrupt", Some(params)).await?;

        let mut state = self.shared.state.lock();
        state.set_status(SessionStatus::Idle, &*self.shared.pause);
        state.set_turn(None);
        Ok(())
    }

    /// Snapshot of the current session, if any
    #[must_use]
    pub fn current_session(&self) -> Option<AgentSession> {
        self.shared.state.lock().current_session().cloned()
    }

    /// Id of the open turn, if any
    #[must_use]
    pub fn current_turn(&self) -> Option<TurnId> {
        self.shared.state.lock().turn_id().cloned()
    }

    /// Current coarse status
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.shared.state.lock().status()
    }

    /// Whether the process is live and the initialize handshake completed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.process.is_running() && self.shared.initialized.load(Ordering::SeqCst)
    }

    /// Drain queued protocol events onto the host's execution context
    ///
    /// This is the single place where protocol traffic mutates UI-visible
    /// state and reaches the collaborators; call it from the host's update
    /// loop. Cheap when the queue is empty. Collaborator callbacks run with
    /// the state lock held; see the [`crate::host`] module docs for the
    /// re-entrancy rule.
    pub fn tick(&self) {
        let mut rx = self.main_rx.lock();
        while let Ok(event) = rx.try_recv() {
            let mut state = self.shared.state.lock();
            router::apply_event(&mut state, event, &*self.shared.pause, &*self.shared.sink);
        }
    }

    /// Cooperative shutdown
    ///
    /// Flips the shutdown flag first so disconnect detection does not trigger
    /// a reconnect, then tears down the process and fails every pending
    /// request. Idempotent.
    pub async fn shutdown(&self) {
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        self.shared.initialized.store(false, Ordering::SeqCst);
        self.shared.process.stop().await;
        self.shared.correlator.fail_all(|| AgentError::TransportClosed);

        let mut state = self.shared.state.lock();
        state.set_status(SessionStatus::Disconnected, &*self.shared.pause);
    }
}
