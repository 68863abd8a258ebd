//! Framing strategies and the extraction rules behind them.
//!
//! A [`FramingStrategy`] decides where one frame ends and the next begins.
//! [`FramingStrategy::extract`] removes at most one complete frame from the
//! front of a pending buffer; callers loop on it until it yields `None`,
//! which leaves the buffer holding only an incomplete remainder.

use std::num::NonZeroUsize;

use bytes::{Buf, Bytes, BytesMut};

/// How an unaligned byte stream is cut into frames.
///
/// Parameters live inside the variant that uses them, so a marker can never be
/// configured alongside a fixed-length strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramingStrategy {
    /// Every ingested chunk is forwarded as one frame.
    #[default]
    None,

    /// Frames are exactly `length` bytes and begin with `header`.
    ///
    /// Leading bytes that do not match `header` are discarded one at a time
    /// until the buffer realigns.
    FixedLength {
        /// Byte every frame starts with.
        header: u8,
        /// Total frame size, header included.
        length: NonZeroUsize,
    },

    /// Once at least `length` bytes are buffered, the whole buffer is emitted
    /// as a single frame.
    ///
    /// Frames are not sliced to `length`; their size depends on how the
    /// transport chunked the stream.
    MinimumLength {
        /// Flush threshold in bytes.
        length: usize,
    },

    /// A frame is every byte up to and including the first `marker`.
    Delimiter {
        /// Terminating byte, kept at the end of each frame.
        marker: u8,
    },
}

/// Result of a single extraction attempt.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    /// The completed frame, if one was available.
    pub frame: Option<Bytes>,
    /// Bytes discarded while searching for a header.
    pub skipped: usize,
}

impl FramingStrategy {
    /// Short lowercase name used in logs, metrics and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FixedLength { .. } => "fixed-length",
            Self::MinimumLength { .. } => "minimum-length",
            Self::Delimiter { .. } => "delimiter",
        }
    }

    /// Returns true when chunks are forwarded without buffering.
    #[must_use]
    pub const fn is_passthrough(self) -> bool { matches!(self, Self::None) }

    /// Remove the next complete frame from the front of `pending`.
    ///
    /// With [`FramingStrategy::None`] the entire buffer is one frame.
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use reframe::FramingStrategy;
    ///
    /// let strategy = FramingStrategy::Delimiter { marker: b'\n' };
    /// let mut pending = BytesMut::from(&b"Hello\nWor"[..]);
    ///
    /// let first = strategy.extract(&mut pending);
    /// assert_eq!(first.frame.as_deref(), Some(&b"Hello\n"[..]));
    /// assert!(strategy.extract(&mut pending).frame.is_none());
    /// assert_eq!(&pending[..], b"Wor");
    /// ```
    pub fn extract(self, pending: &mut BytesMut) -> Extraction {
        match self {
            Self::None => Extraction {
                frame: (!pending.is_empty()).then(|| pending.split().freeze()),
                skipped: 0,
            },
            Self::FixedLength { header, length } => extract_fixed(pending, header, length.get()),
            Self::MinimumLength { length } => Extraction {
                frame: (!pending.is_empty() && pending.len() >= length)
                    .then(|| pending.split().freeze()),
                skipped: 0,
            },
            Self::Delimiter { marker } => Extraction {
                frame: pending
                    .iter()
                    .position(|&b| b == marker)
                    .map(|i| pending.split_to(i + 1).freeze()),
                skipped: 0,
            },
        }
    }
}

fn extract_fixed(pending: &mut BytesMut, header: u8, length: usize) -> Extraction {
    let mut skipped = 0;
    while pending.len() >= length {
        if pending[0] == header {
            return Extraction {
                frame: Some(pending.split_to(length).freeze()),
                skipped,
            };
        }
        pending.advance(1);
        skipped += 1;
    }
    Extraction {
        frame: None,
        skipped,
    }
}
