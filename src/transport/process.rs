//! Process supervisor for the agent app-server

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{AgentError, Result};
use crate::protocol::codec;
use crate::protocol::messages::IncomingMessage;

/// Fixed argument list passed to the agent executable
const APP_SERVER_ARGS: &[&str] = &["app-server"];

/// Event emitted by the stream reader tasks
///
/// Every event carries the generation that was current when its reader task
/// started; consumers must discard events from superseded generations.
#[derive(Debug)]
pub enum StreamEvent {
    /// A decoded protocol message arrived on standard output
    Message {
        /// Owning process generation
        generation: u64,
        /// The decoded message
        message: IncomingMessage,
    },
    /// Standard output reached EOF or failed
    Closed {
        /// Owning process generation
        generation: u64,
    },
}

/// Owns the agent process handle, its stdio streams, and the generation token
pub struct AppServerProcess {
    program: PathBuf,
    working_dir: Option<PathBuf>,
    child: parking_lot::Mutex<Option<Child>>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    generation: AtomicU64,
    running: AtomicBool,
    reader_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
    stderr_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl AppServerProcess {
    /// Create a supervisor for the given executable
    ///
    /// The process is not spawned until [`start`](Self::start).
    #[must_use]
    pub fn new(program: PathBuf, working_dir: Option<PathBuf>) -> Self {
        Self {
            program,
            working_dir,
            child: parking_lot::Mutex::new(None),
            stdin: tokio::sync::Mutex::new(None),
            generation: AtomicU64::new(0),
            running: AtomicBool::new(false),
            reader_task: parking_lot::Mutex::new(None),
            stderr_task: parking_lot::Mutex::new(None),
        }
    }

    /// Resolve a bare program name through `PATH`
    ///
    /// # Errors
    /// Returns `AgentError::Launch` when the executable cannot be found.
    pub fn resolve_program(program: &Path) -> Result<PathBuf> {
        if program.components().count() > 1 {
            return Ok(program.to_path_buf());
        }
        which::which(program)
            .map_err(|e| AgentError::launch(format!("{} not found: {e}", program.display())))
    }

    /// Spawn the agent process and begin its read loops
    ///
    /// Increments the generation token; the new value tags both reader tasks
    /// and is returned so callers can stamp their own bookkeeping.
    ///
    /// # Errors
    /// Returns `AgentError::Launch` when the executable cannot be started.
    pub async fn start(&self, events: mpsc::UnboundedSender<StreamEvent>) -> Result<u64> {
        let program = Self::resolve_program(&self.program)?;

        let mut cmd = Command::new(&program);
        cmd.args(APP_SERVER_ARGS);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        // Pipe stderr instead of inheriting so the child cannot touch the
        // host terminal; the stderr task forwards lines to diagnostics only.
        cmd.stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::launch(format!("{}: {e}", program.display())))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AgentError::launch("failed to get stdin handle"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::launch("failed to get stdout handle"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::launch("failed to get stderr handle"))?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        *self.stdin.lock().await = Some(stdin);
        *self.child.lock() = Some(child);

        let reader = tokio::spawn(read_stdout(stdout, generation, events));
        if let Some(old) = self.reader_task.lock().replace(reader) {
            old.abort();
        }
        let stderr_reader = tokio::spawn(read_stderr(stderr, generation));
        if let Some(old) = self.stderr_task.lock().replace(stderr_reader) {
            old.abort();
        }

        self.running.store(true, Ordering::SeqCst);
        Ok(generation)
    }

    /// Write one line to the process's standard input
    ///
    /// The stdin mutex is held for the whole line so concurrent writers never
    /// interleave partial lines. Loss of a line while no writer is attached
    /// (reconnect window) is tolerated: the call logs and returns, and the
    /// owning request simply never resolves.
    pub async fn write_line(&self, line: &str) {
        let mut guard = self.stdin.lock().await;
        let Some(stdin) = guard.as_mut() else {
            log::warn!("no agent stdin attached, dropping outbound line");
            return;
        };
        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');
        if let Err(e) = stdin.write_all(&payload).await {
            log::warn!("failed to write to agent stdin: {e}");
            return;
        }
        if let Err(e) = stdin.flush().await {
            log::warn!("failed to flush agent stdin: {e}");
        }
    }

    /// Stop the process and release its handles
    ///
    /// Idempotent; safe to call when already stopped. Pending-request cleanup
    /// for the dead generation is the caller's responsibility.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(mut stdin) = self.stdin.lock().await.take() {
            let _ = stdin.shutdown().await;
        }
        if let Some(task) = self.reader_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.stderr_task.lock().take() {
            task.abort();
        }

        let child = self.child.lock().take();
        if let Some(mut child) = child {
            let _ = child.start_kill();
        }
    }

    /// Generation token of the most recently spawned instance
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a live instance is attached
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for AppServerProcess {
    fn drop(&mut self) {
        if let Some(task) = self.reader_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.stderr_task.lock().take() {
            task.abort();
        }
        if let Some(mut child) = self.child.lock().take() {
            let _ = child.start_kill();
        }
    }
}

/// Standard output loop: decode each line and forward it with its generation
async fn read_stdout(
    stdout: ChildStdout,
    generation: u64,
    events: mpsc::UnboundedSender<StreamEvent>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match codec::decode(trimmed) {
                    Ok(message) => {
                        if events
                            .send(StreamEvent::Message {
                                generation,
                                message,
                            })
                            .is_err()
                        {
                            // Receiver dropped, stop reading.
                            return;
                        }
                    }
                    Err(e) => log::debug!("dropping malformed wire line: {e}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("agent stdout read error: {e}");
                break;
            }
        }
    }
    let _ = events.send(StreamEvent::Closed { generation });
}

/// Standard error loop: forward lines to diagnostics, never to the protocol
async fn read_stderr(stderr: ChildStderr, generation: u64) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log::debug!("agent stderr [gen {generation}]: {line}");
    }
}
