//! Delivery of frames to consumer sinks.
//!
//! A [`Dispatcher`] holds up to two sinks. The immediate sink runs inline on
//! the producer for every frame; the deferred sink is posted to a consumer
//! context through a [`ContextHandle`] and runs there later, in emission
//! order.
//!
//! Sinks are user code. A sink that returns an error or panics is logged and
//! counted at this boundary and never affects delivery of later frames.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use tracing::{error, warn};

use crate::{
    context::ContextHandle,
    error::SinkResult,
    frame::Frame,
    metrics::{self, Sink},
    panic::format_panic,
};

/// Sink invoked synchronously on the producer.
pub type ImmediateSink = Box<dyn FnMut(Frame) -> SinkResult + Send + 'static>;

/// Sink invoked on the consumer context.
pub type DeferredSink = Arc<dyn Fn(Frame) -> SinkResult + Send + Sync + 'static>;

/// Counters kept by a [`Dispatcher`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Frames passed to [`Dispatcher::deliver`].
    pub delivered: u64,
    /// Immediate sink invocations that failed or panicked.
    pub immediate_failures: u64,
    /// Deferred deliveries lost because the consumer context was closed.
    pub dropped_posts: u64,
}

struct Deferred {
    handle: ContextHandle,
    sink: DeferredSink,
}

/// Fans each frame out to the configured sinks.
#[derive(Default)]
pub struct Dispatcher {
    immediate: Option<ImmediateSink>,
    deferred: Option<Deferred>,
    stats: DeliveryStats,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("immediate", &self.immediate.is_some())
            .field("deferred", &self.deferred.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher with no sinks.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Install the immediate sink, replacing any previous one.
    #[must_use]
    pub fn with_immediate<F>(mut self, sink: F) -> Self
    where
        F: FnMut(Frame) -> SinkResult + Send + 'static,
    {
        self.immediate = Some(Box::new(sink));
        self
    }

    /// Install the deferred sink and the context it runs on, replacing any
    /// previous one.
    #[must_use]
    pub fn with_deferred<F>(mut self, handle: ContextHandle, sink: F) -> Self
    where
        F: Fn(Frame) -> SinkResult + Send + Sync + 'static,
    {
        self.deferred = Some(Deferred {
            handle,
            sink: Arc::new(sink),
        });
        self
    }

    /// Hand `frame` to the immediate sink, then post it to the deferred sink.
    pub fn deliver(&mut self, frame: Frame) {
        self.stats.delivered += 1;

        if let Some(immediate) = self.immediate.as_mut() {
            let now = frame.clone();
            if !invoke(Sink::Immediate, || immediate(now)) {
                self.stats.immediate_failures += 1;
            }
        }

        if let Some(deferred) = &self.deferred {
            let sink = Arc::clone(&deferred.sink);
            let size = frame.len();
            if deferred
                .handle
                .post(move || {
                    invoke(Sink::Deferred, || sink(frame));
                })
                .is_err()
            {
                self.stats.dropped_posts += 1;
                warn!(size, "consumer context closed; deferred frame dropped");
            }
        }
    }

    /// Returns true if at least one sink is installed.
    #[must_use]
    pub fn has_sinks(&self) -> bool { self.immediate.is_some() || self.deferred.is_some() }

    /// Counters accumulated since creation.
    #[must_use]
    pub const fn stats(&self) -> DeliveryStats { self.stats }
}

/// Run a sink call, logging failures. Returns false if the sink failed.
fn invoke<F>(sink: Sink, call: F) -> bool
where
    F: FnOnce() -> SinkResult,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            metrics::inc_callback_failures(sink);
            warn!(sink = sink.as_str(), error = %e, "frame sink returned an error");
            false
        }
        Err(panic) => {
            metrics::inc_callback_failures(sink);
            error!(
                sink = sink.as_str(),
                panic = %format_panic(panic.as_ref()),
                "frame sink panicked"
            );
            false
        }
    }
}
