//! Error types for framebuffer access
//!
//! Every failure surfaces immediately as one of these kinds; there is no
//! retry logic anywhere in the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by framebuffer devices and screen info records
#[derive(Debug, Error)]
pub enum FbError {
    /// The device node could not be opened
    #[error("framebuffer device unavailable: {}: {source}", path.display())]
    DeviceUnavailable { path: PathBuf, source: io::Error },

    /// The kernel rejected an ioctl request
    #[error("ioctl 0x{request:04x} failed: {source}")]
    Ioctl { request: u32, source: io::Error },

    /// No screen info field with the given name exists
    #[error("unknown screen info field: {name}")]
    InvalidField { name: String },

    /// The value does not fit the field it was written to
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// The record or device does not support the requested operation
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Mapping the framebuffer memory failed
    #[error("framebuffer mapping failed: {source}")]
    Mapping { source: io::Error },
}

/// Result type for framebuffer operations
pub type FbResult<T> = std::result::Result<T, FbError>;
