//! `FramingCodec` driving `FramedRead` and `FramedWrite`.

mod common;

use std::{io, num::NonZeroUsize};

use bytes::Bytes;
use common::{TestResult, fixed, newline};
use futures::{SinkExt, StreamExt, TryStreamExt};
use reframe::{Frame, FramingStrategy, codec::FramingCodec};
use rstest::rstest;
use tokio_util::codec::{FramedRead, FramedWrite};

async fn decode_all(strategy: FramingStrategy, input: &'static [u8]) -> io::Result<Vec<Frame>> {
    FramedRead::new(input, FramingCodec::new(strategy))
        .try_collect()
        .await
}

#[rstest]
#[case::delimiter(newline(), b"a\nbb\nccc", vec![b"a\n".to_vec(), b"bb\n".to_vec()])]
#[case::fixed(fixed(0xAA, 3), b"\x01\xAA\x02\x03\xAA\x04", vec![vec![0xAA, 2, 3]])]
#[tokio::test]
async fn partial_tail_is_discarded_at_eof(
    #[case] strategy: FramingStrategy,
    #[case] input: &'static [u8],
    #[case] expected: Vec<Vec<u8>>,
) -> TestResult {
    let frames = decode_all(strategy, input).await?;
    let payloads: Vec<Vec<u8>> = frames.iter().map(|f| f.as_bytes().to_vec()).collect();
    assert_eq!(payloads, expected);
    Ok(())
}

#[tokio::test]
async fn overflow_surfaces_as_invalid_data() {
    let codec = FramingCodec::new(newline()).with_max_buffer(NonZeroUsize::new(4).expect("non-zero"));
    let mut framed = FramedRead::new(&b"abcdefgh"[..], codec);

    let err = framed
        .next()
        .await
        .expect("stream yields an item")
        .expect_err("limit exceeded");
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn encoder_writes_bytes_unchanged() -> TestResult {
    let mut framed = FramedWrite::new(Vec::new(), FramingCodec::new(newline()));

    framed.send(Bytes::from_static(b"no marker")).await?;
    framed.send(Frame::from_static(b"!\n")).await?;

    assert_eq!(framed.get_ref().as_slice(), b"no marker!\n");
    Ok(())
}
