//! Background dispatch for model calls.
//!
//! Work runs on a [`Dispatcher`]; its result comes back through a channel
//! that the UI thread drains with [`PendingReply::try_take`]. Nothing the UI
//! owns is touched from the background side.

use providers::ProviderError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

pub type Reply = Result<String, ProviderError>;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs somewhere other than the caller's frame.
pub trait Dispatcher: Send {
    fn dispatch(&self, job: Job);
}

/// One OS thread per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDispatcher;

impl Dispatcher for ThreadDispatcher {
    fn dispatch(&self, job: Job) {
        let spawned = std::thread::Builder::new()
            .name("gemini-request".into())
            .spawn(job);
        if let Err(e) = spawned {
            // The job (and its sender) is dropped; the receiver sees a disconnect.
            tracing::error!("failed to spawn request thread: {}", e);
        }
    }
}

/// Runs the job immediately on the calling thread. The reply still waits
/// in the channel until polled.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// A reply that has been submitted but not yet collected.
pub struct PendingReply {
    rx: Receiver<Reply>,
}

impl PendingReply {
    /// Non-blocking check. `None` while the work is still running.
    pub fn try_take(&self) -> Option<Reply> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ProviderError::Runtime(
                "The request ended without a reply. Please try again.".to_string(),
            ))),
        }
    }
}

/// Submit `work` to `dispatcher` and return a handle for its reply.
///
/// A panic inside `work` is turned into an error reply.
pub fn submit<F>(dispatcher: &dyn Dispatcher, work: F) -> PendingReply
where
    F: FnOnce() -> Reply + Send + 'static,
{
    let (tx, rx) = channel::<Reply>();
    dispatcher.dispatch(Box::new(move || {
        let reply = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
            Err(ProviderError::Runtime(
                "Something went wrong while processing that request.".to_string(),
            ))
        });
        let _ = tx.send(reply);
    }));
    PendingReply { rx }
}
