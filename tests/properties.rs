//! Property tests for chunk-boundary independence.

mod common;

use common::{fixed, newline};
use proptest::prelude::*;
use reframe::{FrameReassembler, FramingStrategy};
use reframe_testing::split_at_offsets;

fn reassemble(strategy: FramingStrategy, chunks: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let mut reassembler = FrameReassembler::new(strategy);
    let mut out = Vec::new();
    for chunk in chunks {
        reassembler
            .ingest(chunk, |frame| out.push(frame.as_bytes().to_vec()))
            .expect("no buffer limit configured");
    }
    out
}

fn offsets() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..256, 0..16).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

proptest! {
    #[test]
    fn fixed_length_ignores_chunk_boundaries(
        input in prop::collection::vec(any::<u8>(), 0..256),
        cuts in offsets(),
        length in 1usize..12,
    ) {
        let strategy = fixed(0xAA, length);
        let whole = reassemble(strategy, &[input.clone()]);
        let split = reassemble(strategy, &split_at_offsets(&input, &cuts));
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn delimiter_ignores_chunk_boundaries(
        input in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'\n']), 0..256),
        cuts in offsets(),
    ) {
        let whole = reassemble(newline(), &[input.clone()]);
        let split = reassemble(newline(), &split_at_offsets(&input, &cuts));
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn fixed_length_frames_are_well_formed(
        input in prop::collection::vec(any::<u8>(), 0..256),
        length in 1usize..12,
    ) {
        for frame in reassemble(fixed(0xAA, length), &[input]) {
            prop_assert_eq!(frame.len(), length);
            prop_assert_eq!(frame[0], 0xAA);
        }
    }

    #[test]
    fn delimiter_frames_end_with_single_marker(
        input in prop::collection::vec(prop::sample::select(vec![b'x', b'\n']), 0..128),
    ) {
        for frame in reassemble(newline(), &[input]) {
            prop_assert_eq!(frame.last(), Some(&b'\n'));
            prop_assert_eq!(frame.iter().filter(|&&b| b == b'\n').count(), 1);
        }
    }

    #[test]
    fn minimum_length_loses_no_bytes(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 0..16),
        length in 0usize..64,
    ) {
        let strategy = FramingStrategy::MinimumLength { length };
        let mut reassembler = FrameReassembler::new(strategy);
        let mut emitted = Vec::new();
        for chunk in &chunks {
            reassembler
                .ingest(chunk, |frame| emitted.extend_from_slice(frame.as_bytes()))
                .expect("no buffer limit configured");
        }
        emitted.extend_from_slice(reassembler.buffered());
        prop_assert_eq!(emitted, chunks.concat());
        prop_assert!(reassembler.buffered_len() < length.max(1));
    }
}
