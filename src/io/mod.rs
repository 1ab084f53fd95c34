//! Bounded, read-only file mapping.
//!
//! `MappedImage` owns the memory map for the whole analysis pass and lends
//! the decoder a plain byte slice. Files larger than the configured limit are
//! refused before mapping.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defines the resource limits for file mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// A read-only memory map of a file on disk.
pub struct MappedImage {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    file_size: u64,
}

impl MappedImage {
    /// Opens and memory-maps a file.
    ///
    /// This function will fail if the file size exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening file for mapping"
        );

        if file_size > limits.max_file_size {
            debug!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the map is never
            // written through and lives as long as this value.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// The mapped bytes; empty for an empty file.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}
