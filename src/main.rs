//! `reframe` binary: reframe stdin or a TCP stream and print frames.
//!
//! Frames are reassembled on a reader task and printed from the main task,
//! which acts as the consumer context.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use reframe::{
    FramingConfig,
    StreamEngine,
    config::FramingMode,
    consumer_context,
    hex::HexDisplay,
    transport::{DEFAULT_READ_BUFFER, read_transport},
};
use tokio::net::TcpStream;
use tracing::error;

use crate::cli::{Cli, StrategyArg};

fn framing_config(cli: &Cli) -> FramingConfig {
    let mode = match cli.strategy {
        StrategyArg::None => FramingMode::None,
        StrategyArg::FixedLength => FramingMode::FixedLength,
        StrategyArg::MinimumLength => FramingMode::MinimumLength,
        StrategyArg::Delimiter => FramingMode::Delimiter,
    };
    let source = cli
        .connect
        .map_or_else(|| "stdin".to_owned(), |addr| addr.to_string());
    FramingConfig {
        mode,
        header: cli.header.clone(),
        length: cli.length,
        marker: cli.marker.clone(),
        diagnostics: cli.diagnostics,
        source: Some(source),
        max_buffer: cli.max_buffer,
    }
}

#[cfg(feature = "metrics")]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.metrics_addr.is_some() {
        tracing::warn!("built without the `metrics` feature; --metrics-addr ignored");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = install_metrics(&cli) {
        error!(error = %e, "failed to install metrics exporter");
        return ExitCode::FAILURE;
    }
    let config = match framing_config(&cli).into_engine_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid framing configuration");
            return ExitCode::FAILURE;
        }
    };

    let (handle, pump) = consumer_context();
    let mut engine = StreamEngine::builder(config)
        .on_frame_deferred(handle, |frame| {
            println!("{}", HexDisplay(&frame));
            Ok(())
        })
        .build();

    let reader = tokio::spawn(async move {
        match cli.connect {
            Some(addr) => {
                let stream = TcpStream::connect(addr).await?;
                read_transport(stream, &mut engine, DEFAULT_READ_BUFFER).await
            }
            None => read_transport(tokio::io::stdin(), &mut engine, DEFAULT_READ_BUFFER).await,
        }
    });

    tokio::select! {
        () = pump.run() => {}
        _ = tokio::signal::ctrl_c() => return ExitCode::SUCCESS,
    }

    match reader.await {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!(error = %e, "stream failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "reader task failed");
            ExitCode::FAILURE
        }
    }
}
