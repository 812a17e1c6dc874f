use std::path::{Path, PathBuf};

use agent_transport::{AgentError, AppServerProcess};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_start_with_missing_binary_is_a_launch_error() {
    let process = AppServerProcess::new(
        PathBuf::from("/nonexistent/agent-binary-for-tests"),
        None,
    );
    let (tx, _rx) = mpsc::unbounded_channel();

    match process.start(tx).await {
        Err(AgentError::Launch(_)) => {}
        other => panic!("expected launch error, got {other:?}"),
    }
    assert!(!process.is_running());
}

#[tokio::test]
async fn test_write_line_without_writer_is_a_noop() {
    let process = AppServerProcess::new(PathBuf::from("/nonexistent/agent"), None);
    // Must log and return, never panic or block.
    process.write_line(r#"{"id":"x","method":"initialize"}"#).await;
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let process = AppServerProcess::new(PathBuf::from("/nonexistent/agent"), None);
    process.stop().await;
    process.stop().await;
    assert!(!process.is_running());
    assert_eq!(process.current_generation(), 0);
}

#[test]
fn test_resolve_program_keeps_explicit_paths() {
    let explicit = Path::new("/usr/local/bin/some-agent");
    assert_eq!(
        AppServerProcess::resolve_program(explicit).unwrap(),
        explicit.to_path_buf()
    );
}

#[test]
fn test_resolve_program_fails_for_unknown_bare_name() {
    let missing = Path::new("definitely-not-an-installed-agent-binary");
    match AppServerProcess::resolve_program(missing) {
        Err(AgentError::Launch(_)) => {}
        other => panic!("expected launch error, got {other:?}"),
    }
}
