//! Dynamic symbol table decoding

use crate::formats::elf::image::{LeFields, RawImage};
use crate::formats::elf::types::*;
use std::borrow::Cow;
use tracing::trace;

/// Lazy, restartable decoder over the located dynamic symbol table.
///
/// Names are read from the string table's file offset plus `st_name`, bounded
/// only by the image.
#[derive(Debug, Clone, Copy)]
pub struct DynamicSymbols<'a> {
    image: RawImage<'a>,
    table: DynSymRef,
    strings: StringTableRef,
}

impl<'a> DynamicSymbols<'a> {
    pub fn new(image: RawImage<'a>, table: DynSymRef, strings: StringTableRef) -> Self {
        Self {
            image,
            table,
            strings,
        }
    }

    /// Number of whole records in the table.
    pub fn len(&self) -> u64 {
        self.table.size / SYM_SIZE as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u64) -> Option<Result<SymbolEntry<'a>>> {
        (index < self.len()).then(|| self.decode(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<SymbolEntry<'a>>> + 'a {
        let table = *self;
        (0..self.len()).map(move |j| table.decode(j))
    }

    pub fn collect_all(&self) -> Result<Vec<SymbolEntry<'a>>> {
        self.iter().collect()
    }

    fn decode(&self, index: u64) -> Result<SymbolEntry<'a>> {
        let region = Region::Symbol(index);
        let offset = index
            .checked_mul(SYM_SIZE as u64)
            .and_then(|rel| self.table.offset.checked_add(rel))
            .ok_or(FormatError::TruncatedFile {
                region,
                offset: self.table.offset,
                end: u64::MAX,
                file_len: self.image.len(),
            })?;
        let raw: [u8; SYM_SIZE] = self.image.record(offset, region)?;

        let st_name = raw.le_u32(0);
        let name = if st_name == 0 {
            None
        } else {
            Some(self.resolve_name(index, st_name)?)
        };

        trace!(index, st_name, name = ?name, "Decoded symbol");
        Ok(SymbolEntry {
            index,
            st_name,
            name,
            st_info: raw[4],
            st_other: raw[5],
            st_shndx: raw.le_u16(6),
            st_value: raw.le_u64(8),
            st_size: raw.le_u64(16),
        })
    }

    fn resolve_name(&self, index: u64, st_name: u32) -> Result<Cow<'a, str>> {
        let region = Region::SymbolName(index);
        let start = self
            .strings
            .offset
            .checked_add(st_name as u64)
            .ok_or(FormatError::TruncatedFile {
                region,
                offset: self.strings.offset,
                end: u64::MAX,
                file_len: self.image.len(),
            })?;
        let bytes = self.image.cstr(start, region)?;
        Ok(String::from_utf8_lossy(bytes))
    }
}
