//! Per-connection composition of reassembly and delivery.
//!
//! A [`StreamEngine`] is created when a transport connection opens and
//! dropped when it closes. It owns one [`FrameReassembler`] and one
//! [`Dispatcher`]; nothing is shared between connections, so engines for
//! different transports never observe each other's pending bytes.

use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    context::ContextHandle,
    dispatch::{DeliveryStats, Dispatcher},
    error::{SinkResult, StreamError},
    frame::Frame,
    hex::HexDisplay,
    reassembler::{FrameReassembler, ReassemblyStats},
};

/// Builder for [`StreamEngine`].
#[derive(Debug)]
pub struct StreamEngineBuilder {
    config: EngineConfig,
    dispatcher: Dispatcher,
}

impl StreamEngineBuilder {
    /// Register the sink run inline on the producer for every frame.
    ///
    /// Keep it fast: it runs between transport reads.
    #[must_use]
    pub fn on_frame_immediate<F>(mut self, sink: F) -> Self
    where
        F: FnMut(Frame) -> SinkResult + Send + 'static,
    {
        self.dispatcher = self.dispatcher.with_immediate(sink);
        self
    }

    /// Register the sink posted to the consumer context behind `handle`.
    #[must_use]
    pub fn on_frame_deferred<F>(mut self, handle: ContextHandle, sink: F) -> Self
    where
        F: Fn(Frame) -> SinkResult + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.with_deferred(handle, sink);
        self
    }

    /// Finish building the engine.
    #[must_use]
    pub fn build(self) -> StreamEngine { StreamEngine::new(self.config, self.dispatcher) }
}

/// Turns chunks from one transport into delivered frames.
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use reframe::{EngineConfig, FramingStrategy, StreamEngine, context::consumer_context};
///
/// let (handle, mut pump) = consumer_context();
/// let received = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&received);
///
/// let mut engine = StreamEngine::builder(EngineConfig::new(FramingStrategy::Delimiter {
///     marker: b'\n',
/// }))
/// .on_frame_deferred(handle, move |frame| {
///     sink.lock().unwrap().push(frame);
///     Ok(())
/// })
/// .build();
///
/// engine.ingest(b"ping\npo").unwrap();
/// engine.ingest(b"ng\n").unwrap();
/// pump.pump();
///
/// assert_eq!(received.lock().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct StreamEngine {
    config: EngineConfig,
    reassembler: FrameReassembler,
    dispatcher: Dispatcher,
    closed: bool,
}

impl StreamEngine {
    /// Start building an engine for `config`.
    #[must_use]
    pub fn builder(config: EngineConfig) -> StreamEngineBuilder {
        StreamEngineBuilder {
            config,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Create an engine from a configuration and a prepared dispatcher.
    #[must_use]
    pub fn new(config: EngineConfig, dispatcher: Dispatcher) -> Self {
        let reassembler = FrameReassembler::with_max_buffer(config.strategy, config.max_buffer);
        debug!(
            source = %config.source,
            strategy = config.strategy.as_str(),
            diagnostics = config.diagnostics,
            "stream engine created"
        );
        Self {
            config,
            reassembler,
            dispatcher,
            closed: false,
        }
    }

    /// Ingest one chunk received from the transport.
    ///
    /// Every frame completed by the chunk is delivered before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Closed`] after [`StreamEngine::close`] or a
    /// previous fatal error, and [`StreamError::BufferOverflow`] when the
    /// pending buffer exceeds the configured maximum. An overflow closes the
    /// engine.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }

        let Self {
            config,
            reassembler,
            dispatcher,
            ..
        } = self;
        let result = reassembler.ingest(chunk, |frame| {
            if config.diagnostics {
                info!(
                    source = %config.source,
                    size = frame.len(),
                    frame = %HexDisplay(&frame),
                    "frame received"
                );
            }
            dispatcher.deliver(frame);
        });

        if result.is_err() {
            self.closed = true;
        }
        result
    }

    /// Stop accepting chunks and discard any partial frame.
    ///
    /// Deferred deliveries already posted still run. Calling `close` more
    /// than once has no further effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let discarded = self.reassembler.reset();
        debug!(source = %self.config.source, discarded, "stream engine closed");
    }

    /// Returns true once the engine no longer accepts chunks.
    #[must_use]
    pub const fn is_closed(&self) -> bool { self.closed }

    /// Bytes held waiting for the rest of a frame.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.reassembler.buffered_len() }

    /// Configuration the engine was created with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig { &self.config }

    /// Reassembly counters.
    #[must_use]
    pub const fn reassembly_stats(&self) -> ReassemblyStats { self.reassembler.stats() }

    /// Delivery counters.
    #[must_use]
    pub const fn delivery_stats(&self) -> DeliveryStats { self.dispatcher.stats() }
}
