//! `tokio_util` codec built on the framing strategies.
//!
//! [`FramingCodec`] lets a [`FramingStrategy`] drive
//! [`FramedRead`](tokio_util::codec::FramedRead) directly, for applications
//! that prefer a `Stream` of frames over callbacks. The extraction rules are
//! the ones used by [`FrameReassembler`](crate::reassembler::FrameReassembler).
//!
//! Encoding is a pass-through: outbound bytes are written unchanged.
//!
//! # EOF
//!
//! When the transport closes, leftover bytes that do not form a complete frame
//! are discarded rather than emitted as a truncated frame.

use std::{io, num::NonZeroUsize};

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::{error::StreamError, frame::Frame, metrics, strategy::FramingStrategy};

/// Decoder and pass-through encoder for a [`FramingStrategy`].
///
/// ```
/// use bytes::BytesMut;
/// use reframe::{FramingStrategy, codec::FramingCodec};
/// use tokio_util::codec::Decoder;
///
/// let mut codec = FramingCodec::new(FramingStrategy::Delimiter { marker: b'\n' });
/// let mut src = BytesMut::from(&b"a\nb"[..]);
///
/// assert_eq!(codec.decode(&mut src).unwrap().unwrap().as_bytes(), b"a\n");
/// assert!(codec.decode(&mut src).unwrap().is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramingCodec {
    strategy: FramingStrategy,
    max_buffer: Option<NonZeroUsize>,
}

impl FramingCodec {
    /// Create a codec with no buffer limit.
    #[must_use]
    pub const fn new(strategy: FramingStrategy) -> Self {
        Self {
            strategy,
            max_buffer: None,
        }
    }

    /// Reject streams that leave more than `limit` bytes buffered without
    /// completing a frame.
    #[must_use]
    pub const fn with_max_buffer(mut self, limit: NonZeroUsize) -> Self {
        self.max_buffer = Some(limit);
        self
    }

    /// Active framing strategy.
    #[must_use]
    pub const fn strategy(&self) -> FramingStrategy { self.strategy }
}

impl Decoder for FramingCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let step = self.strategy.extract(src);
        if step.skipped > 0 {
            trace!(skipped = step.skipped, "resynchronising on frame header");
            metrics::add_resync_bytes(step.skipped as u64);
        }
        if let Some(bytes) = step.frame {
            metrics::inc_frames(self.strategy.as_str());
            return Ok(Some(Frame::new(bytes)));
        }

        if let Some(max) = self.max_buffer
            && src.len() > max.get()
        {
            let buffered = src.len();
            src.clear();
            metrics::inc_buffer_overflows();
            return Err(StreamError::BufferOverflow {
                buffered,
                max: max.get(),
            }
            .into());
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            debug!(
                discarded = src.len(),
                strategy = self.strategy.as_str(),
                "discarding partial frame at end of stream"
            );
            src.clear();
        }
        Ok(None)
    }
}

impl Encoder<Bytes> for FramingCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

impl Encoder<Frame> for FramingCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.put(item.into_bytes());
        Ok(())
    }
}
