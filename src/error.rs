//! Error types for the ingestion path.
//!
//! Framing problems are never surfaced as errors: malformed input under
//! [`FramingStrategy::FixedLength`](crate::strategy::FramingStrategy::FixedLength)
//! is resynchronised and a missing delimiter simply keeps bytes buffered.
//! The variants here cover the conditions that end a stream.

use std::io;

use thiserror::Error;

/// Fatal conditions raised while ingesting a byte stream.
///
/// Every variant leaves the owning engine closed. Callers should treat the
/// transport as desynchronised and tear the connection down.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The pending buffer grew beyond the configured maximum without
    /// yielding a frame.
    #[error("pending buffer overflow: {buffered} bytes buffered, limit is {max}")]
    BufferOverflow {
        /// Bytes held when the limit was checked.
        buffered: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The engine no longer accepts chunks.
    #[error("stream closed")]
    Closed,

    /// The transport failed while reading.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of `"overflow"`, `"closed"`, or `"io"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::BufferOverflow { .. } => "overflow",
            Self::Closed => "closed",
            Self::Io(_) => "io",
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            e @ StreamError::BufferOverflow { .. } => io::Error::new(io::ErrorKind::InvalidData, e),
            e @ StreamError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, e),
        }
    }
}

/// Error type returned by frame sinks.
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by frame sinks.
pub type SinkResult = Result<(), SinkError>;
