#![doc(html_root_url = "https://docs.rs/reframe/latest")]
//! Public API for the `reframe` library.
//!
//! `reframe` turns an arbitrarily chunked byte stream from a serial link,
//! socket or pipe into discrete, ordered frames and delivers each frame to
//! an immediate sink on the producer and a deferred sink on a consumer
//! context.
//!
//! The pieces, leaves first:
//!
//! - [`strategy`]: where frames begin and end.
//! - [`reassembler`]: the per-connection pending buffer.
//! - [`context`] and [`dispatch`]: ordered delivery across execution contexts.
//! - [`engine`]: one [`StreamEngine`] per transport connection.
//! - [`codec`] and [`transport`]: adapters for `tokio` byte streams.

pub mod codec;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod frame;
pub mod hex;
pub mod metrics;
pub mod panic;
pub mod reassembler;
pub mod strategy;
pub mod transport;

pub use config::{ConfigError, EngineConfig, FramingConfig};
pub use context::{ConsumerPump, ContextHandle, consumer_context};
pub use engine::{StreamEngine, StreamEngineBuilder};
pub use error::{SinkError, SinkResult, StreamError};
pub use frame::Frame;
pub use reassembler::FrameReassembler;
pub use strategy::FramingStrategy;
