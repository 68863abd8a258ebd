//! Ordered hand-off from the producer to a consumer context.
//!
//! [`consumer_context`] returns a cloneable [`ContextHandle`] used to post
//! jobs and the [`ConsumerPump`] that runs them. Jobs run exactly once, on
//! whichever thread drives the pump, in the order they were posted. Posting
//! never blocks, so the producer can hand work off from inside a read loop.
//!
//! The pump supports two driving styles:
//!
//! - [`ConsumerPump::pump`] drains the queue synchronously, suiting a
//!   single-threaded tick loop that polls once per frame.
//! - [`ConsumerPump::run`] awaits jobs as they arrive until every handle has
//!   been dropped.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::panic::format_panic;

/// Work item executed on the consumer context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Returned when posting to a consumer context whose pump has been dropped.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("consumer context closed")]
pub struct PostError;

/// Producer-side handle for scheduling jobs on a consumer context.
#[derive(Clone, Debug)]
pub struct ContextHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl ContextHandle {
    /// Schedule `job` to run once on the consumer context.
    ///
    /// Jobs posted through any clone of the same handle run in submission
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`] if the [`ConsumerPump`] has been dropped. The job
    /// is discarded.
    pub fn post<F>(&self, job: F) -> Result<(), PostError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(job)).map_err(|_| PostError)
    }

    /// Returns true once the pump has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Consumer-side queue of posted jobs.
#[derive(Debug)]
pub struct ConsumerPump {
    rx: mpsc::UnboundedReceiver<Job>,
}

/// Create a linked handle and pump.
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use reframe::context::consumer_context;
///
/// let (handle, mut pump) = consumer_context();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// for i in 0..3 {
///     let seen = Arc::clone(&seen);
///     handle.post(move || seen.lock().unwrap().push(i)).unwrap();
/// }
///
/// assert_eq!(pump.pump(), 3);
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
/// ```
#[must_use]
pub fn consumer_context() -> (ContextHandle, ConsumerPump) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ContextHandle { tx }, ConsumerPump { rx })
}

impl ConsumerPump {
    /// Run the jobs queued at call time on the calling thread.
    ///
    /// Returns the number of jobs executed. Jobs posted while the pump is
    /// running wait for the next call.
    pub fn pump(&mut self) -> usize {
        let queued = self.rx.len();
        self.pump_at_most(queued)
    }

    /// Run at most `limit` queued jobs, returning how many ran.
    ///
    /// Useful for bounding the work done in one tick of a frame loop.
    pub fn pump_at_most(&mut self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit {
            let Ok(job) = self.rx.try_recv() else { break };
            run_job(job);
            ran += 1;
        }
        ran
    }

    /// Run jobs as they arrive until every [`ContextHandle`] is dropped and
    /// the queue is drained.
    pub async fn run(mut self) {
        let mut ran = 0usize;
        while let Some(job) = self.rx.recv().await {
            run_job(job);
            ran += 1;
        }
        debug!(jobs = ran, "consumer context finished");
    }

    /// Number of jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize { self.rx.len() }
}

fn run_job(job: Job) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
        error!(panic = %format_panic(panic.as_ref()), "consumer job panicked");
    }
}
