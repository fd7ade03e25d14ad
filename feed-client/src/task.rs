//! Spawned request tasks.
//!
//! Each request runs in its own task so it completes (and releases its gate)
//! even if the caller stops waiting. The service keeps the task's
//! [`AbortHandle`] in a [`TaskSlot`] so a superseding request or a reset can
//! cancel it.

use tokio::task::{AbortHandle, JoinHandle};

use crate::error::NetworkError;
use crate::transport::TransportError;

/// Holds the abort handle of at most one running task.
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    handle: Option<AbortHandle>,
}

impl TaskSlot {
    /// Store `handle`, aborting the task it replaces.
    pub(crate) fn replace(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.handle.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the stored task, if any.
    pub(crate) fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// The error reported for a request that was superseded or reset.
pub(crate) fn cancelled() -> NetworkError {
    NetworkError::Transport(TransportError::Cancelled)
}

/// Wait for a request task.
///
/// An aborted task reports [`TransportError::Cancelled`]; a panic in the task
/// is resumed on the caller.
pub(crate) async fn join<T>(handle: JoinHandle<Result<T, NetworkError>>) -> Result<T, NetworkError> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(cancelled()),
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
