//! The unit handed to consumers.
//!
//! A [`Frame`] wraps [`bytes::Bytes`], so cloning is a reference-count bump
//! and the same frame can be shared between the producer-side and
//! consumer-side sinks without copying.

use std::ops::Deref;

use bytes::Bytes;

/// One complete application-level message extracted from a byte stream.
///
/// Frames are immutable once created.
///
/// ```
/// use reframe::Frame;
///
/// let frame = Frame::from_static(b"Hello\n");
/// assert_eq!(frame.len(), 6);
/// assert_eq!(&frame[..], b"Hello\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame(Bytes);

impl Frame {
    /// Wrap an owned buffer.
    #[must_use]
    pub fn new(bytes: Bytes) -> Self { Self(bytes) }

    /// Copy a byte slice into a new frame.
    #[must_use]
    pub fn copy_from_slice(bytes: &[u8]) -> Self { Self(Bytes::copy_from_slice(bytes)) }

    /// Create a frame from static data without copying.
    #[must_use]
    pub const fn from_static(bytes: &'static [u8]) -> Self { Self(Bytes::from_static(bytes)) }

    /// Borrow the frame contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    /// Cheap clone of the underlying buffer.
    #[must_use]
    pub fn bytes(&self) -> Bytes { self.0.clone() }

    /// Consume the frame, returning the underlying buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.0 }

    /// Frame size in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Returns true if the frame holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl From<Bytes> for Frame {
    fn from(bytes: Bytes) -> Self { Self(bytes) }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self { Self(Bytes::from(bytes)) }
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self { frame.0 }
}

impl PartialEq<[u8]> for Frame {
    fn eq(&self, other: &[u8]) -> bool { self.0 == other }
}

impl PartialEq<&[u8]> for Frame {
    fn eq(&self, other: &&[u8]) -> bool { self.0 == *other }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let frame = Frame::from(vec![1, 2, 3]);
        let clone = frame.clone();
        assert_eq!(frame.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }

    #[test]
    fn compares_against_slices() {
        let frame = Frame::copy_from_slice(b"abc");
        assert!(frame == b"abc"[..]);
        assert!(frame == &b"abc"[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn frames_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Frame>();
    }
}
