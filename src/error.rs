//! Error types for elfscope.
//!
//! Decoder failures keep their own taxonomy (`FormatError`); this type
//! gathers them together with the I/O and configuration failures of the
//! outer layers.

use crate::formats::elf::FormatError;
use crate::io::error::IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for elfscope operations.
#[derive(Debug, Error)]
pub enum ElfscopeError {
    /// The image is not a supported or well-formed ELF64 x86-64 file
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The input file could not be opened or mapped
    #[error(transparent)]
    Io(#[from] IoError),

    /// The configuration file could not be read
    #[error("cannot read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `ElfscopeConfig`
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type alias for elfscope operations
pub type Result<T> = std::result::Result<T, ElfscopeError>;
