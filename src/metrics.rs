//! Metric helpers for `reframe`.
//!
//! This module defines metric names and helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking emitted frames.
pub const FRAMES_EMITTED: &str = "reframe_frames_emitted_total";
/// Name of the counter tracking bytes discarded while resynchronising.
pub const RESYNC_BYTES: &str = "reframe_resync_bytes_total";
/// Name of the counter tracking failed or panicking sinks.
pub const CALLBACK_FAILURES: &str = "reframe_callback_failures_total";
/// Name of the counter tracking pending buffer overflows.
pub const BUFFER_OVERFLOWS: &str = "reframe_buffer_overflows_total";

/// Which sink a delivery failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sink {
    /// Callback run inline on the producer.
    Immediate,
    /// Callback run later on the consumer context.
    Deferred,
}

impl Sink {
    /// Label value used for this sink.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Sink::Immediate => "immediate",
            Sink::Deferred => "deferred",
        }
    }
}

/// Record an emitted frame for the given strategy.
#[cfg(feature = "metrics")]
pub fn inc_frames(strategy: &'static str) {
    counter!(FRAMES_EMITTED, "strategy" => strategy).increment(1);
}

/// Record bytes dropped while searching for a frame header.
#[cfg(feature = "metrics")]
pub fn add_resync_bytes(count: u64) { counter!(RESYNC_BYTES).increment(count); }

/// Record a sink failure.
#[cfg(feature = "metrics")]
pub fn inc_callback_failures(sink: Sink) {
    counter!(CALLBACK_FAILURES, "sink" => sink.as_str()).increment(1);
}

/// Record a pending buffer overflow.
#[cfg(feature = "metrics")]
pub fn inc_buffer_overflows() { counter!(BUFFER_OVERFLOWS).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_frames(_strategy: &'static str) {}

#[cfg(not(feature = "metrics"))]
pub fn add_resync_bytes(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn inc_callback_failures(_sink: Sink) {}

#[cfg(not(feature = "metrics"))]
pub fn inc_buffer_overflows() {}
