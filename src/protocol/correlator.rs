//! Request correlator: pending outbound calls awaiting responses by id

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{AgentError, Result};
use crate::types::identifiers::RequestId;

/// Pending request awaiting a response
struct Pending {
    /// Process generation that was current when the request was sent
    generation: u64,
    /// Completion handle
    tx: oneshot::Sender<Result<Value>>,
}

/// Correlates outgoing requests with asynchronous responses by id
///
/// Each entry completes exactly once: resolved with a result payload, failed
/// with an error, or failed in bulk when its owning process generation dies.
/// Completion for an unknown id is a silent no-op, since duplicate and late
/// frames are possible.
#[derive(Default)]
pub struct RequestCorrelator {
    pending: Mutex<HashMap<RequestId, Pending>>,
}

impl RequestCorrelator {
    /// Create an empty correlator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending entry and return its completion handle
    ///
    /// The receiver yields the decoded result payload, or the failure. When
    /// the entry is dropped without completion (shutdown), the receiver sees
    /// a channel error the caller maps to `TransportClosed`.
    pub fn register(&self, id: RequestId, generation: u64) -> oneshot::Receiver<Result<Value>> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .insert(id, Pending { generation, tx });
        rx
    }

    /// Resolve the pending entry for `id` with a result payload
    pub fn resolve(&self, id: &RequestId, result: Value) {
        if let Some(pending) = self.pending.lock().remove(id) {
            let _ = pending.tx.send(Ok(result));
        }
    }

    /// Fail the pending entry for `id`
    pub fn fail(&self, id: &RequestId, error: AgentError) {
        if let Some(pending) = self.pending.lock().remove(id) {
            let _ = pending.tx.send(Err(error));
        }
    }

    /// Fail every pending entry belonging to a dead process generation
    ///
    /// Entries of other generations are left untouched.
    pub fn fail_generation(&self, generation: u64, error: impl Fn() -> AgentError) {
        let drained: Vec<Pending> = {
            let mut pending = self.pending.lock();
            let ids: Vec<RequestId> = pending
                .iter()
                .filter(|(_, entry)| entry.generation == generation)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| pending.remove(&id))
                .collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Err(error()));
        }
    }

    /// Fail every pending entry (shutdown path)
    pub fn fail_all(&self, error: impl Fn() -> AgentError) {
        let drained: Vec<Pending> = {
            let mut pending = self.pending.lock();
            pending.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Err(error()));
        }
    }

    /// Number of outstanding entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether no entries are outstanding
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
