//! Test utilities for exercising a [`StreamEngine`](reframe::StreamEngine).
//!
//! Provides recording sinks, helpers for chunking input as a transport
//! would, and a serialised log capture fixture.
//!
//! ```rust
//! use reframe::{EngineConfig, FramingStrategy, StreamEngine};
//! use reframe_testing::{FrameRecorder, one_byte_chunks};
//!
//! let recorder = FrameRecorder::new();
//! let mut engine = StreamEngine::builder(EngineConfig::new(FramingStrategy::Delimiter {
//!     marker: b'\n',
//! }))
//! .on_frame_immediate(recorder.sink())
//! .build();
//!
//! for chunk in one_byte_chunks(b"a\nb\n") {
//!     engine.ingest(&chunk).unwrap();
//! }
//! assert_eq!(recorder.payloads(), vec![b"a\n".to_vec(), b"b\n".to_vec()]);
//! ```

pub mod chunks;
pub mod logging;
pub mod recorder;

pub use chunks::{one_byte_chunks, split_at_offsets, split_every};
pub use logging::{LoggerHandle, logger};
pub use recorder::{Delivery, FrameRecorder};
