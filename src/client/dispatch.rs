//! IO-side dispatch and reconnection scheduling
//!
//! One task consumes decoded stream events: responses complete pending
//! requests, server-initiated requests are answered immediately, and
//! notifications are queued for the main context. Events whose generation is
//! not the current one come from a superseded process and are discarded.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::protocol::codec::{self, ApprovalDecision};
use crate::protocol::messages::{AgentNotification, IncomingMessage};
use crate::transport::StreamEvent;

use super::ClientShared;
use super::router::MainEvent;

/// Server request methods answered with an approval decision
const APPROVAL_METHODS: &[&str] = &[
    "item/commandExecution/requestApproval",
    "item/fileChange/requestApproval",
];

/// Dispatch loop: runs until the stream-event channel closes
pub(crate) async fn run(shared: Arc<ClientShared>, mut rx: mpsc::UnboundedReceiver<StreamEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Message {
                generation,
                message,
            } => {
                if generation != shared.process.current_generation() {
                    log::debug!("discarding message from stale generation {generation}");
                    continue;
                }
                handle_message(&shared, message).await;
            }
            StreamEvent::Closed { generation } => handle_closed(&shared, generation),
        }
    }
}

async fn handle_message(shared: &Arc<ClientShared>, message: IncomingMessage) {
    match message {
        IncomingMessage::Response { id, result, error } => match error {
            Some(message) => shared.correlator.fail(&id, AgentError::remote(message)),
            None => shared.correlator.resolve(&id, result),
        },
        IncomingMessage::ServerRequest { id, method, .. } => {
            answer_server_request(shared, &id, &method).await;
        }
        IncomingMessage::Notification { method, params } => {
            match AgentNotification::classify(&method, &params) {
                Some(note) => {
                    let _ = shared.main_tx.send(MainEvent::Notification(note));
                }
                None => log::debug!("ignoring unhandled notification: {method}"),
            }
        }
    }
}

/// Answer a server-initiated request immediately
///
/// An unanswered server request would stall the agent indefinitely, so when
/// auto-approve is disabled the request is still answered (declined) and a
/// warning is queued for the host.
async fn answer_server_request(shared: &Arc<ClientShared>, id: &Value, method: &str) {
    if !APPROVAL_METHODS.contains(&method) {
        log::debug!("unhandled server request: {method}");
        return;
    }
    let decision = if shared.options.auto_approve {
        ApprovalDecision::Accept
    } else {
        let _ = shared.main_tx.send(MainEvent::ApprovalDeclined {
            method: method.to_string(),
        });
        ApprovalDecision::Decline
    };
    shared
        .process
        .write_line(&codec::encode_decision(id, decision))
        .await;
}

/// React to stream closure of the owning generation
///
/// Stale generations are ignored outright: a delayed failure signal from a
/// replaced process must not tear down the live one.
fn handle_closed(shared: &Arc<ClientShared>, generation: u64) {
    if shared.shutting_down.load(Ordering::SeqCst) {
        return;
    }
    if generation != shared.process.current_generation() {
        log::debug!("ignoring stream closure from stale generation {generation}");
        return;
    }

    shared.initialized.store(false, Ordering::SeqCst);
    shared
        .correlator
        .fail_generation(generation, || AgentError::TransportClosed);
    let _ = shared.main_tx.send(MainEvent::Disconnected);
    schedule_reconnect(shared);
}

/// Schedule a delayed full restart (stop-then-start)
///
/// Fixed interval, no backoff growth, no retry cap: the agent is assumed to
/// be locally available and transient crashes to self-resolve. At most one
/// restart task is in flight at a time; a crash mid-handshake reaches this
/// from both the closure path and the failed initialize request, and the
/// second call must not spawn a competing restart loop.
pub(crate) fn schedule_reconnect(shared: &Arc<ClientShared>) {
    if !shared.options.auto_reconnect || shared.shutting_down.load(Ordering::SeqCst) {
        return;
    }
    if shared.reconnect_scheduled.swap(true, Ordering::SeqCst) {
        return;
    }
    let _ = shared.main_tx.send(MainEvent::RetryScheduled);

    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        tokio::time::sleep(shared.options.reconnect_delay).await;
        shared.reconnect_scheduled.store(false, Ordering::SeqCst);
        if shared.shutting_down.load(Ordering::SeqCst) {
            return;
        }
        // The restart abandons the old instance: stop() aborts its reader
        // before an EOF can be observed, so no closure event will fail the
        // old generation's pending requests. Fail them here instead.
        shared
            .correlator
            .fail_generation(shared.process.current_generation(), || {
                AgentError::TransportClosed
            });
        shared.process.stop().await;
        match shared.process.start(shared.stream_tx.clone()).await {
            Ok(_) => spawn_initialize(&shared),
            Err(e) => {
                log::warn!("agent restart failed: {e}");
                schedule_reconnect(&shared);
            }
        }
    });
}

/// Run the initialize handshake and best-effort session resume
pub(crate) fn spawn_initialize(shared: &Arc<ClientShared>) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let params = json!({
            "clientInfo": {
                "name": shared.options.client_name,
                "title": shared.options.client_title,
                "version": crate::VERSION,
            }
        });
        match shared.request("initialize", Some(params)).await {
            Ok(_) => {
                shared.initialized.store(true, Ordering::SeqCst);
                let resumed = match shared.options.last_session_id.clone() {
                    Some(last) => match shared.resume_session(&last).await {
                        Ok(session) => Some(session),
                        Err(e) => {
                            log::debug!("could not resume session {last}: {e}");
                            None
                        }
                    },
                    None => None,
                };
                let _ = shared.main_tx.send(MainEvent::Connected { resumed });
            }
            Err(e) => {
                log::warn!("agent initialization failed: {e}");
                schedule_reconnect(&shared);
            }
        }
    });
}
