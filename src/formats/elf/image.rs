//! Bounds-checked view over the raw bytes of an ELF image
//!
//! Every read validates `offset + len <= image.len()` with checked
//! arithmetic before touching the buffer. Records are copied out into
//! fixed-size arrays, so decoding never depends on the alignment of the
//! underlying mapping.

use crate::formats::elf::types::{FormatError, Region, Result};
use memchr::memchr;

/// Immutable view over an image's bytes
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    data: &'a [u8],
}

impl<'a> RawImage<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn slice(&self, offset: u64, len: u64, region: Region) -> Result<&'a [u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() as u64 => {
                Ok(&self.data[offset as usize..end as usize])
            }
            end => Err(self.truncated(region, offset, end.unwrap_or(u64::MAX))),
        }
    }

    /// Copy a fixed-size record out of the image.
    pub fn record<const N: usize>(&self, offset: u64, region: Region) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N as u64, region)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Bytes of the NUL-terminated string at `offset`, without the terminator.
    ///
    /// A string that reaches the end of the image without a NUL is an
    /// out-of-bounds read, not a short string.
    pub fn cstr(&self, offset: u64, region: Region) -> Result<&'a [u8]> {
        let len = self.data.len() as u64;
        if offset >= len {
            return Err(self.truncated(region, offset, offset.saturating_add(1)));
        }
        let tail = &self.data[offset as usize..];
        match memchr(0, tail) {
            Some(nul) => Ok(&tail[..nul]),
            None => Err(self.truncated(region, offset, len + 1)),
        }
    }

    fn truncated(&self, region: Region, offset: u64, end: u64) -> FormatError {
        FormatError::TruncatedFile {
            region,
            offset,
            end,
            file_len: self.data.len(),
        }
    }
}

/// Little-endian field access within a copied record.
///
/// Offsets are the fixed ELF64 field positions, always inside the record.
pub(crate) trait LeFields {
    fn le_u16(&self, offset: usize) -> u16;
    fn le_u32(&self, offset: usize) -> u32;
    fn le_u64(&self, offset: usize) -> u64;
}

impl<const N: usize> LeFields for [u8; N] {
    fn le_u16(&self, offset: usize) -> u16 {
        let mut bytes = [0u8; 2];
        bytes.copy_from_slice(&self[offset..offset + 2]);
        u16::from_le_bytes(bytes)
    }

    fn le_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self[offset..offset + 4]);
        u32::from_le_bytes(bytes)
    }

    fn le_u64(&self, offset: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self[offset..offset + 8]);
        u64::from_le_bytes(bytes)
    }
}
