//! Engine configuration.
//!
//! [`EngineConfig`] is chosen once when a connection is opened and is never
//! mutated while the engine runs. [`FramingConfig`] is the flat, serde-friendly
//! form used by configuration files, where header and marker bytes are written
//! as hex strings.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{hex::parse_hex_byte, strategy::FramingStrategy};

/// Default identifier attached to diagnostics.
pub const DEFAULT_SOURCE: &str = "stream";

/// Errors raised while building a configuration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A header, marker or command was not valid hexadecimal.
    #[error("invalid hex byte string: {input:?}")]
    InvalidHex {
        /// Offending input.
        input: String,
    },

    /// The selected mode needs a field that was not supplied.
    #[error("{mode} framing requires `{field}`")]
    MissingField {
        /// Framing mode being configured.
        mode: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Fixed-length frames must hold at least the header byte.
    #[error("fixed-length frames must be at least one byte long")]
    ZeroLength,

    /// The pending buffer cap is smaller than one frame of the selected mode.
    #[error("{mode} framing needs max_buffer of at least {length} bytes, got {max_buffer}")]
    BufferBelowFrameLength {
        /// Framing mode being configured.
        mode: &'static str,
        /// Configured cap.
        max_buffer: usize,
        /// Frame length or flush threshold of the mode.
        length: usize,
    },
}

/// Immutable settings for one [`StreamEngine`](crate::engine::StreamEngine).
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use reframe::{EngineConfig, FramingStrategy};
///
/// let config = EngineConfig::new(FramingStrategy::Delimiter { marker: b'\n' })
///     .source("COM3")
///     .diagnostics(true)
///     .max_buffer(NonZeroUsize::new(4096))
///     .unwrap();
///
/// assert_eq!(config.source_name(), "COM3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// How the stream is cut into frames.
    pub strategy: FramingStrategy,
    /// Log every emitted frame with its source and size.
    pub diagnostics: bool,
    /// Identifier of the transport, used only in diagnostics.
    pub source: String,
    /// Largest pending buffer tolerated after extraction.
    ///
    /// `None` leaves the buffer unbounded.
    pub max_buffer: Option<NonZeroUsize>,
}

impl Default for EngineConfig {
    fn default() -> Self { Self::new(FramingStrategy::None) }
}

impl EngineConfig {
    /// Create a configuration for `strategy` with diagnostics off and no
    /// buffer limit.
    #[must_use]
    pub fn new(strategy: FramingStrategy) -> Self {
        Self {
            strategy,
            diagnostics: false,
            source: DEFAULT_SOURCE.to_owned(),
            max_buffer: None,
        }
    }

    /// Set the source identifier.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Enable or disable per-frame diagnostics.
    #[must_use]
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Cap the pending buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BufferBelowFrameLength`] when `limit` is below
    /// the frame length of a fixed-length strategy or the flush threshold of
    /// a minimum-length one.
    pub fn max_buffer(mut self, limit: Option<NonZeroUsize>) -> Result<Self, ConfigError> {
        check_max_buffer(self.strategy, limit)?;
        self.max_buffer = limit;
        Ok(self)
    }

    /// Borrow the source identifier.
    #[must_use]
    pub fn source_name(&self) -> &str { &self.source }
}

/// Framing mode selector used by [`FramingConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingMode {
    /// `"none"`
    #[default]
    None,
    /// `"fixed-length"`
    FixedLength,
    /// `"minimum-length"`
    MinimumLength,
    /// `"delimiter"`
    Delimiter,
}

/// Flat configuration record as written in configuration files.
///
/// Fields unused by the selected mode are ignored.
///
/// ```
/// use reframe::{FramingStrategy, config::{FramingConfig, FramingMode}};
///
/// let raw = FramingConfig {
///     mode: FramingMode::Delimiter,
///     marker: Some("0A".into()),
///     ..FramingConfig::default()
/// };
/// let config = raw.into_engine_config().unwrap();
/// assert_eq!(config.strategy, FramingStrategy::Delimiter { marker: 0x0A });
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramingConfig {
    /// Framing mode.
    pub mode: FramingMode,
    /// Header byte in hex, for `fixed-length`.
    pub header: Option<String>,
    /// Frame length for `fixed-length`, threshold for `minimum-length`.
    pub length: Option<usize>,
    /// Delimiter byte in hex, for `delimiter`.
    pub marker: Option<String>,
    /// Log every emitted frame.
    pub diagnostics: bool,
    /// Source identifier for diagnostics.
    pub source: Option<String>,
    /// Pending buffer limit in bytes.
    pub max_buffer: Option<NonZeroUsize>,
}

impl FramingConfig {
    /// Resolve the selected mode and its parameters into a strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the mode's parameters are
    /// absent, [`ConfigError::InvalidHex`] for malformed header or marker
    /// strings, [`ConfigError::ZeroLength`] for a zero fixed length and
    /// [`ConfigError::BufferBelowFrameLength`] when `max_buffer` cannot hold
    /// one frame.
    pub fn strategy(&self) -> Result<FramingStrategy, ConfigError> {
        let strategy = self.mode_strategy()?;
        check_max_buffer(strategy, self.max_buffer)?;
        Ok(strategy)
    }

    fn mode_strategy(&self) -> Result<FramingStrategy, ConfigError> {
        match self.mode {
            FramingMode::None => Ok(FramingStrategy::None),
            FramingMode::FixedLength => {
                let header = required(self.header.as_deref(), "fixed-length", "header")?;
                let length = required(self.length, "fixed-length", "length")?;
                Ok(FramingStrategy::FixedLength {
                    header: parse_hex_byte(header)?,
                    length: NonZeroUsize::new(length).ok_or(ConfigError::ZeroLength)?,
                })
            }
            FramingMode::MinimumLength => Ok(FramingStrategy::MinimumLength {
                length: required(self.length, "minimum-length", "length")?,
            }),
            FramingMode::Delimiter => {
                let marker = required(self.marker.as_deref(), "delimiter", "marker")?;
                Ok(FramingStrategy::Delimiter {
                    marker: parse_hex_byte(marker)?,
                })
            }
        }
    }

    /// Validate the record and build an [`EngineConfig`].
    ///
    /// # Errors
    ///
    /// Propagates any error from [`FramingConfig::strategy`].
    pub fn into_engine_config(self) -> Result<EngineConfig, ConfigError> {
        let strategy = self.strategy()?;
        let mut config = EngineConfig::new(strategy)
            .diagnostics(self.diagnostics)
            .max_buffer(self.max_buffer)?;
        if let Some(source) = self.source {
            config = config.source(source);
        }
        Ok(config)
    }
}

impl TryFrom<FramingConfig> for EngineConfig {
    type Error = ConfigError;

    fn try_from(raw: FramingConfig) -> Result<Self, Self::Error> { raw.into_engine_config() }
}

fn check_max_buffer(strategy: FramingStrategy, limit: Option<NonZeroUsize>) -> Result<(), ConfigError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let length = match strategy {
        FramingStrategy::FixedLength { length, .. } => length.get(),
        FramingStrategy::MinimumLength { length } => length,
        FramingStrategy::None | FramingStrategy::Delimiter { .. } => return Ok(()),
    };
    if limit.get() < length {
        return Err(ConfigError::BufferBelowFrameLength {
            mode: strategy.as_str(),
            max_buffer: limit.get(),
            length,
        });
    }
    Ok(())
}

fn required<T>(value: Option<T>, mode: &'static str, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField { mode, field })
}
