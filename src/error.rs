//! Crate error type.
//!
//! Most conditions this crate deals with are not errors at all: unsupported
//! devices, short/long packets and data for vanished devices are all silently
//! ignored. What remains is listed here.

use thiserror::Error;

/// Errors produced while decoding fields, loading definitions or reading transports.
#[derive(Debug, Error)]
pub enum Error {
    /// A field read would run past the end of the buffer.
    #[error("read of {width} byte(s) at offset {offset} exceeds buffer of {len} byte(s)")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A device definition is internally inconsistent.
    #[error("invalid definition `{name}`: {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// A numeric type tag string was not recognised.
    #[error("unknown numeric type `{0}`")]
    UnknownType(String),

    /// Definition file could not be parsed.
    #[error("definition config: {0}")]
    Config(#[from] toml::de::Error),

    /// Definition file could not be read.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A transport failed to deliver a report.
    #[error("transport: {0}")]
    Transport(String),

    #[cfg(feature = "hid")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
    #[error("hid: {0}")]
    Hid(#[from] hidapi::HidError),
}

pub type Result<T> = std::result::Result<T, Error>;
