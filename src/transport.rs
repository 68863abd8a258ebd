//! Thin glue between async byte transports and a [`StreamEngine`].
//!
//! Opening and configuring the transport (serial port, socket, pipe) happens
//! elsewhere; these helpers only move bytes. Inbound chunks flow through
//! [`read_transport`] into the engine, while outbound bytes go straight to
//! the writer through [`Outbound`] and are never reframed.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{config::ConfigError, engine::StreamEngine, error::StreamError, hex::parse_hex_bytes};

/// Read size used by [`read_transport`] callers that have no preference.
pub const DEFAULT_READ_BUFFER: usize = 1024;

/// Feed `reader` into `engine` until the transport closes.
///
/// Each successful read becomes one ingested chunk. `Interrupted` and
/// `TimedOut` reads are retried. The engine is closed on every exit path,
/// discarding any partial frame.
///
/// # Errors
///
/// Returns [`StreamError::Io`] for a failed read and propagates fatal engine
/// errors such as [`StreamError::BufferOverflow`]. A clean end of stream
/// returns `Ok(())`.
pub async fn read_transport<R>(
    mut reader: R,
    engine: &mut StreamEngine,
    read_buffer: usize,
) -> Result<(), StreamError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; read_buffer.max(1)];
    let result = loop {
        match reader.read(&mut buf).await {
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(e) = engine.ingest(&buf[..n]) {
                    break Err(e);
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::TimedOut) => {}
            Err(e) => {
                warn!(source = %engine.config().source, error = %e, "transport read failed");
                break Err(StreamError::Io(e));
            }
        }
    };
    engine.close();
    debug!(source = %engine.config().source, ok = result.is_ok(), "transport reader finished");
    result
}

/// Outbound half of a transport.
///
/// Bytes are written as given; reframing applies to the inbound direction
/// only.
#[derive(Debug)]
pub struct Outbound<W> {
    writer: W,
}

impl<W> Outbound<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wrap a writer.
    pub fn new(writer: W) -> Self { Self { writer } }

    /// Write `bytes` and flush.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the writer.
    pub async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    /// Parse a hex command such as `"AA 01 FF"` and send the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] wrapping a [`ConfigError`] when
    /// the string is not valid hex, or any I/O error raised by the writer.
    pub async fn send_hex(&mut self, command: &str) -> io::Result<()> {
        let bytes = parse_hex_bytes(command)
            .map_err(|e: ConfigError| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.send(&bytes).await
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W { &self.writer }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W { self.writer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, FramingStrategy};

    #[tokio::test]
    async fn send_hex_writes_parsed_bytes() {
        let mut out = Outbound::new(Vec::new());
        out.send_hex("AA 01 ff").await.expect("send");
        out.send(b"\n").await.expect("send");
        assert_eq!(out.into_inner(), vec![0xAA, 0x01, 0xFF, b'\n']);
    }

    #[tokio::test]
    async fn send_hex_rejects_bad_input() {
        let mut out = Outbound::new(Vec::new());
        let err = out.send_hex("AZ").await.expect_err("invalid hex");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.get_ref().is_empty());
    }

    #[tokio::test]
    async fn clean_eof_closes_engine() {
        let mut engine = StreamEngine::builder(EngineConfig::new(FramingStrategy::Delimiter {
            marker: b'\n',
        }))
        .build();

        read_transport(&b"line\npartial"[..], &mut engine, 4)
            .await
            .expect("clean eof");

        assert!(engine.is_closed());
        assert_eq!(engine.buffered_len(), 0);
        assert_eq!(engine.reassembly_stats().frames, 1);
    }
}
