mod common;

use std::sync::Arc;
use std::time::Duration;

use agent_transport::{AgentClient, AgentError, SessionStatus, TransportOptions};
use common::Recording;

/// Write an executable stand-in for the agent binary
#[cfg(unix)]
fn write_agent_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-agent");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn unlaunchable_options() -> TransportOptions {
    TransportOptions::builder()
        .program("/nonexistent/agent-binary-for-tests")
        .auto_reconnect(false)
        .build()
}

#[tokio::test]
async fn test_connect_survives_launch_failure() {
    let collab = Arc::new(Recording::new());
    let client =
        AgentClient::connect(unlaunchable_options(), collab.clone(), collab.clone()).await;

    assert!(!client.is_ready());
    assert_eq!(client.status(), SessionStatus::Disconnected);
    assert!(client.current_session().is_none());

    // Nothing queued, nothing rendered: with auto-reconnect disabled the
    // failed launch leaves the client quietly disconnected.
    client.tick();
    assert!(collab.log().is_empty());
}

#[tokio::test]
async fn test_send_prompt_without_session_is_invalid_state() {
    let collab = Arc::new(Recording::new());
    let client =
        AgentClient::connect(unlaunchable_options(), collab.clone(), collab.clone()).await;

    match client.send_prompt("hello").await {
        Err(AgentError::InvalidState(_)) => {}
        other => panic!("expected invalid state, got {other:?}"),
    }
    // The prompt was rejected before any status bookkeeping happened.
    assert_eq!(client.status(), SessionStatus::Disconnected);
}

#[tokio::test]
async fn test_cancel_without_open_turn_succeeds() {
    let collab = Arc::new(Recording::new());
    let client =
        AgentClient::connect(unlaunchable_options(), collab.clone(), collab.clone()).await;

    assert!(client.current_turn().is_none());
    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let collab = Arc::new(Recording::new());
    let client =
        AgentClient::connect(unlaunchable_options(), collab.clone(), collab.clone()).await;

    client.shutdown().await;
    client.shutdown().await;
    assert!(!client.is_ready());
    assert_eq!(client.status(), SessionStatus::Disconnected);
}

#[cfg(unix)]
#[tokio::test]
async fn test_restart_fails_pending_requests_of_replaced_process() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    // Rejects the handshake and swallows everything else, so every restart
    // cycle leaves any in-flight request unanswered on the wire.
    let script = write_agent_script(
        dir.path(),
        r##"#!/bin/sh
while read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      id=${line#*'"id":"'}
      id=${id%%'"'*}
      printf '{"id":"%s","error":{"message":"unavailable"}}\n' "$id"
      ;;
  esac
done
"##,
    );

    let collab = Arc::new(Recording::new());
    let options = TransportOptions::builder()
        .program(script)
        .auto_reconnect(true)
        .reconnect_delay(Duration::from_millis(200))
        .build();
    let client = AgentClient::connect(options, collab.clone(), collab.clone()).await;

    // In flight while the failed handshake forces a restart; the restart must
    // fail it rather than leave it dangling until shutdown.
    let result = tokio::time::timeout(Duration::from_secs(5), client.create_session()).await;
    match result {
        Ok(Err(AgentError::TransportClosed)) => {}
        other => panic!("expected the pending request to fail, got {other:?}"),
    }

    client.shutdown().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_stream_closure_schedules_restart_and_recovers() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    // First incarnation dies immediately; every later one serves the
    // handshake and stays up.
    let script = write_agent_script(
        dir.path(),
        r##"#!/bin/sh
marker="${0%/*}/first-run-done"
if [ ! -f "$marker" ]; then
  : > "$marker"
  exit 0
fi
while read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      id=${line#*'"id":"'}
      id=${id%%'"'*}
      printf '{"id":"%s","result":{}}\n' "$id"
      ;;
  esac
done
"##,
    );

    let collab = Arc::new(Recording::new());
    let options = TransportOptions::builder()
        .program(script)
        .auto_reconnect(true)
        .reconnect_delay(Duration::from_millis(100))
        .build();
    let client = AgentClient::connect(options, collab.clone(), collab.clone()).await;

    for _ in 0..100 {
        client.tick();
        if client.is_ready() && client.status() == SessionStatus::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert!(client.is_ready());
    assert_eq!(client.status(), SessionStatus::Idle);
    // Exactly one retry announced for the dead instance, then the
    // replacement connected; the dead instance left no other trace.
    assert_eq!(
        collab.statuses(),
        vec![SessionStatus::Retry, SessionStatus::Idle]
    );
    assert!(collab.log().contains(&"system:Agent connected".to_string()));

    client.shutdown().await;
}

#[tokio::test]
async fn test_options_builder_defaults_and_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let options = TransportOptions::builder()
        .working_dir(dir.path())
        .page_size(10_000)
        .last_session_id("t-42")
        .build();

    assert_eq!(options.page_size, 200);
    assert_eq!(options.working_dir.as_deref(), Some(dir.path()));
    assert!(options.auto_reconnect);
    assert!(!options.auto_approve);

    let defaults = TransportOptions::default();
    assert_eq!(defaults.page_size, 50);
    assert!(defaults.last_session_id.is_none());
}
