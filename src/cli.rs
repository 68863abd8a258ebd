//! Command line interface for the `reframe` binary.
//!
//! The binary reads a byte stream from stdin or a TCP peer, reframes it with
//! the selected strategy and prints each frame as hex.

use std::{net::SocketAddr, num::NonZeroUsize};

use clap::{Parser, ValueEnum};

/// Framing strategy names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Each read becomes one frame.
    None,
    /// Fixed-size frames starting with `--header`.
    FixedLength,
    /// Flush everything once `--length` bytes are buffered.
    MinimumLength,
    /// Frames end with `--marker`.
    Delimiter,
}

/// Command line arguments for the `reframe` binary.
#[derive(Debug, Parser)]
#[command(name = "reframe", version, about = "Reframe a byte stream and print frames as hex")]
pub struct Cli {
    /// Framing strategy.
    #[arg(short, long, value_enum, default_value_t = StrategyArg::None)]
    pub strategy: StrategyArg,

    /// Header byte in hex, for fixed-length framing.
    #[arg(long)]
    pub header: Option<String>,

    /// Frame length (fixed-length) or flush threshold (minimum-length).
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Delimiter byte in hex, for delimiter framing.
    #[arg(short, long)]
    pub marker: Option<String>,

    /// Fail once this many bytes are buffered without completing a frame.
    #[arg(long)]
    pub max_buffer: Option<NonZeroUsize>,

    /// Log every frame with its source and size.
    #[arg(short, long)]
    pub diagnostics: bool,

    /// Read from a TCP peer instead of stdin.
    #[arg(short, long)]
    pub connect: Option<SocketAddr>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}
