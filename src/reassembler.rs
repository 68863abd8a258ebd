//! Producer-side reassembly of chunked byte streams into frames.
//!
//! [`FrameReassembler`] owns the pending buffer for one connection. Each call
//! to [`FrameReassembler::ingest`] appends a chunk and then extracts frames
//! until the active [`FramingStrategy`] finds no further complete frame, so the
//! buffer never holds a frame that could already have been emitted.
//!
//! The reassembler takes `&mut self` and performs no locking; the transport
//! that owns it feeds chunks serially.

use std::num::NonZeroUsize;

use bytes::BytesMut;
use tracing::{error, trace};

use crate::{
    error::StreamError,
    frame::Frame,
    metrics,
    strategy::FramingStrategy,
};

/// Initial pending buffer capacity, matching a typical serial read size.
const INITIAL_CAPACITY: usize = 1024;

/// Running counters kept by a [`FrameReassembler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    /// Bytes received through `ingest`.
    pub bytes_in: u64,
    /// Frames emitted.
    pub frames: u64,
    /// Bytes discarded while searching for a fixed-length header.
    pub resync_bytes: u64,
}

/// Stateful frame extractor for a single byte stream.
#[derive(Debug)]
pub struct FrameReassembler {
    strategy: FramingStrategy,
    pending: BytesMut,
    max_buffer: Option<NonZeroUsize>,
    stats: ReassemblyStats,
}

impl FrameReassembler {
    /// Create a reassembler with an unbounded pending buffer.
    #[must_use]
    pub fn new(strategy: FramingStrategy) -> Self { Self::with_max_buffer(strategy, None) }

    /// Create a reassembler that fails once more than `max_buffer` bytes stay
    /// pending after extraction.
    #[must_use]
    pub fn with_max_buffer(strategy: FramingStrategy, max_buffer: Option<NonZeroUsize>) -> Self {
        let capacity = if strategy.is_passthrough() {
            0
        } else {
            INITIAL_CAPACITY
        };
        Self {
            strategy,
            pending: BytesMut::with_capacity(capacity),
            max_buffer,
            stats: ReassemblyStats::default(),
        }
    }

    /// Append `chunk` and hand every completed frame to `emit`, in order.
    ///
    /// Empty chunks are ignored. Under [`FramingStrategy::None`] the chunk is
    /// emitted as-is without touching the pending buffer.
    ///
    /// ```
    /// use reframe::{FrameReassembler, FramingStrategy};
    ///
    /// let mut reassembler = FrameReassembler::new(FramingStrategy::Delimiter { marker: b'\n' });
    /// let mut frames = Vec::new();
    /// reassembler.ingest(b"Hello\nWor", |f| frames.push(f)).unwrap();
    /// reassembler.ingest(b"ld\n", |f| frames.push(f)).unwrap();
    ///
    /// assert_eq!(frames.len(), 2);
    /// assert_eq!(&frames[1][..], b"World\n");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::BufferOverflow`] when a configured maximum is
    /// exceeded after extraction. The pending buffer is discarded in that
    /// case; frames completed by the same chunk have already been emitted.
    pub fn ingest<F>(&mut self, chunk: &[u8], mut emit: F) -> Result<(), StreamError>
    where
        F: FnMut(Frame),
    {
        if chunk.is_empty() {
            return Ok(());
        }
        self.stats.bytes_in += chunk.len() as u64;

        if self.strategy.is_passthrough() {
            self.record_frame();
            emit(Frame::copy_from_slice(chunk));
            return Ok(());
        }

        self.pending.extend_from_slice(chunk);
        loop {
            let step = self.strategy.extract(&mut self.pending);
            if step.skipped > 0 {
                trace!(skipped = step.skipped, "resynchronising on frame header");
                self.stats.resync_bytes += step.skipped as u64;
                metrics::add_resync_bytes(step.skipped as u64);
            }
            let Some(bytes) = step.frame else { break };
            self.record_frame();
            emit(Frame::new(bytes));
        }

        self.enforce_limit()
    }

    /// Ingest a chunk and collect the completed frames.
    ///
    /// # Errors
    ///
    /// See [`FrameReassembler::ingest`].
    pub fn ingest_collect(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, StreamError> {
        let mut frames = Vec::new();
        self.ingest(chunk, |frame| frames.push(frame))?;
        Ok(frames)
    }

    fn record_frame(&mut self) {
        self.stats.frames += 1;
        metrics::inc_frames(self.strategy.as_str());
    }

    fn enforce_limit(&mut self) -> Result<(), StreamError> {
        let Some(max) = self.max_buffer else {
            return Ok(());
        };
        let buffered = self.pending.len();
        if buffered <= max.get() {
            return Ok(());
        }
        self.pending.clear();
        metrics::inc_buffer_overflows();
        error!(
            buffered,
            max = max.get(),
            strategy = self.strategy.as_str(),
            "pending buffer overflow; stream is desynchronised"
        );
        Err(StreamError::BufferOverflow {
            buffered,
            max: max.get(),
        })
    }

    /// Discard any pending bytes, returning how many were dropped.
    pub fn reset(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Number of bytes waiting for more input.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.pending.len() }

    /// Borrow the bytes waiting for more input.
    #[must_use]
    pub fn buffered(&self) -> &[u8] { &self.pending }

    /// Active framing strategy.
    #[must_use]
    pub const fn strategy(&self) -> FramingStrategy { self.strategy }

    /// Counters accumulated since creation.
    #[must_use]
    pub const fn stats(&self) -> ReassemblyStats { self.stats }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn lines() -> FrameReassembler { FrameReassembler::new(FramingStrategy::Delimiter { marker: 0x0A }) }

    fn fixed(header: u8, length: usize) -> FrameReassembler {
        FrameReassembler::new(FramingStrategy::FixedLength {
            header,
            length: NonZeroUsize::new(length).expect("non-zero length"),
        })
    }

    #[rstest]
    fn splits_two_lines_from_one_chunk(mut lines: FrameReassembler) {
        let frames = lines.ingest_collect(b"Hello\nWorld\n").expect("ingest");
        assert_eq!(frames, vec![Frame::from_static(b"Hello\n"), Frame::from_static(b"World\n")]);
        assert_eq!(lines.buffered_len(), 0);
    }

    #[rstest]
    fn retains_partial_line_until_marker_arrives(mut lines: FrameReassembler) {
        let frames = lines.ingest_collect(b"Hello\nWor").expect("ingest");
        assert_eq!(frames, vec![Frame::from_static(b"Hello\n")]);
        assert_eq!(lines.buffered(), b"Wor");

        let frames = lines.ingest_collect(b"ld\n").expect("ingest");
        assert_eq!(frames, vec![Frame::from_static(b"World\n")]);
        assert!(lines.buffered().is_empty());
    }

    #[test]
    fn fixed_length_resync_drops_stray_byte() {
        let mut reassembler = fixed(0xAA, 9);
        let input = [0x01, 0xAA, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17];

        let frames = reassembler.ingest_collect(&input).expect("ingest");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &input[1..]);
        assert_eq!(reassembler.stats().resync_bytes, 1);
        assert_eq!(reassembler.buffered_len(), 0);
    }

    #[test]
    fn minimum_length_flushes_on_second_chunk() {
        let mut reassembler = FrameReassembler::new(FramingStrategy::MinimumLength { length: 5 });

        assert!(reassembler.ingest_collect(&[1, 2, 3]).expect("ingest").is_empty());
        let frames = reassembler.ingest_collect(&[4, 5, 6]).expect("ingest");

        assert_eq!(frames, vec![Frame::from(vec![1, 2, 3, 4, 5, 6])]);
        assert_eq!(reassembler.buffered_len(), 0);
    }

    #[test]
    fn passthrough_emits_each_chunk() {
        let mut reassembler = FrameReassembler::new(FramingStrategy::None);
        let frames = reassembler.ingest_collect(b"abc").expect("ingest");
        assert_eq!(frames, vec![Frame::from_static(b"abc")]);
        assert_eq!(reassembler.buffered_len(), 0);
    }

    #[rstest]
    #[case(FramingStrategy::None)]
    #[case(FramingStrategy::MinimumLength { length: 0 })]
    #[case(FramingStrategy::Delimiter { marker: 0 })]
    fn empty_chunks_are_ignored(#[case] strategy: FramingStrategy) {
        let mut reassembler = FrameReassembler::new(strategy);
        assert!(reassembler.ingest_collect(&[]).expect("ingest").is_empty());
        assert_eq!(reassembler.stats(), ReassemblyStats::default());
    }

    #[test]
    fn overflow_discards_buffer_after_emitting_complete_frames() {
        let mut reassembler = FrameReassembler::with_max_buffer(
            FramingStrategy::Delimiter { marker: b'\n' },
            NonZeroUsize::new(4),
        );

        let mut frames = Vec::new();
        let result = reassembler.ingest(b"ok\nno-marker-here", |f| frames.push(f));

        assert_eq!(frames, vec![Frame::from_static(b"ok\n")]);
        assert!(matches!(
            result,
            Err(StreamError::BufferOverflow { buffered: 14, max: 4 })
        ));
        assert_eq!(reassembler.buffered_len(), 0);
    }

    #[test]
    fn buffer_at_limit_is_accepted() {
        let mut reassembler = FrameReassembler::with_max_buffer(
            FramingStrategy::Delimiter { marker: b'\n' },
            NonZeroUsize::new(4),
        );
        assert!(reassembler.ingest_collect(b"abcd").is_ok());
        assert_eq!(reassembler.buffered_len(), 4);
    }

    #[rstest]
    fn reset_reports_dropped_bytes(mut lines: FrameReassembler) {
        lines.ingest_collect(b"partial").expect("ingest");
        assert_eq!(lines.reset(), 7);
        assert_eq!(lines.buffered_len(), 0);
    }

    #[test]
    fn stats_count_bytes_and_frames() {
        let mut reassembler = fixed(0xAA, 2);
        reassembler
            .ingest_collect(&[0x00, 0xAA, 0x01, 0xAA, 0x02, 0xAA])
            .expect("ingest");

        assert_eq!(
            reassembler.stats(),
            ReassemblyStats {
                bytes_in: 6,
                frames: 2,
                resync_bytes: 1,
            }
        );
        assert_eq!(reassembler.buffered(), &[0xAA]);
    }
}
