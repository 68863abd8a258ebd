//! Helpers for slicing test input the way a transport might deliver it.

/// Split `input` into chunks of at most `size` bytes.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn split_every(input: &[u8], size: usize) -> Vec<Vec<u8>> {
    assert!(size > 0, "chunk size must be non-zero");
    input.chunks(size).map(<[u8]>::to_vec).collect()
}

/// Split `input` into one-byte chunks.
pub fn one_byte_chunks(input: &[u8]) -> Vec<Vec<u8>> { split_every(input, 1) }

/// Split `input` at the given ascending offsets.
///
/// Offsets outside the input or out of order are ignored, and empty chunks
/// are never produced.
pub fn split_at_offsets(input: &[u8], offsets: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &offset in offsets {
        if offset > start && offset < input.len() {
            chunks.push(input[start..offset].to_vec());
            start = offset;
        }
    }
    if start < input.len() {
        chunks.push(input[start..].to_vec());
    }
    chunks
}
