//! Shared utilities for integration tests.
//!
//! Provides strategy constructors and an engine wired to recording sinks.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::num::NonZeroUsize;

use reframe::{
    ConsumerPump,
    EngineConfig,
    FramingStrategy,
    StreamEngine,
    consumer_context,
};
use reframe_testing::FrameRecorder;

/// Result type used by fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Fixed-length strategy with a non-zero length.
#[expect(
    clippy::expect_used,
    reason = "a zero length is a bug in the test itself"
)]
pub fn fixed(header: u8, length: usize) -> FramingStrategy {
    FramingStrategy::FixedLength {
        header,
        length: NonZeroUsize::new(length).expect("fixed length must be non-zero"),
    }
}

/// Delimiter strategy splitting on `\n`.
pub fn newline() -> FramingStrategy { FramingStrategy::Delimiter { marker: 0x0A } }

/// Engine, consumer pump and the recorders behind both sinks.
pub struct Harness {
    pub engine: StreamEngine,
    pub pump: ConsumerPump,
    pub immediate: FrameRecorder,
    pub deferred: FrameRecorder,
}

impl Harness {
    /// Build an engine with recording sinks on both delivery paths.
    pub fn new(config: EngineConfig) -> Self {
        let immediate = FrameRecorder::new();
        let deferred = FrameRecorder::new();
        let (handle, pump) = consumer_context();
        let engine = StreamEngine::builder(config)
            .on_frame_immediate(immediate.sink())
            .on_frame_deferred(handle, deferred.sink())
            .build();
        Self {
            engine,
            pump,
            immediate,
            deferred,
        }
    }

    /// Build a harness for `strategy` with default settings.
    pub fn for_strategy(strategy: FramingStrategy) -> Self { Self::new(EngineConfig::new(strategy)) }

    /// Ingest every chunk, panicking on a stream error.
    #[expect(
        clippy::expect_used,
        reason = "ingest failures must abort the test immediately"
    )]
    pub fn feed<I, C>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        for chunk in chunks {
            self.engine.ingest(chunk.as_ref()).expect("ingest failed");
        }
    }

    /// Drain the consumer context, returning frames seen by the deferred sink.
    pub fn pump_deferred(&mut self) -> Vec<Vec<u8>> {
        self.pump.pump();
        self.deferred.payloads()
    }
}
