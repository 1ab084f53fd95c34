//! Program header table walking

use crate::formats::elf::image::{LeFields, RawImage};
use crate::formats::elf::types::*;
use tracing::trace;

/// Lazy, restartable view over the program header table.
///
/// Entry `i` lives at `e_phoff + i * e_phentsize`; the declared entry size is
/// the stride, while each record is decoded with the fixed ELF64 layout.
#[derive(Debug, Clone, Copy)]
pub struct ProgramHeaders<'a> {
    image: RawImage<'a>,
    offset: u64,
    entsize: u16,
    count: u16,
}

impl<'a> ProgramHeaders<'a> {
    pub fn new(image: RawImage<'a>, header: &FileHeader) -> Self {
        Self {
            image,
            offset: header.e_phoff,
            entsize: header.e_phentsize,
            count: header.e_phnum,
        }
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decode entry `index`. Indices past `e_phnum` yield `None`.
    pub fn get(&self, index: u16) -> Option<Result<ProgramHeaderEntry>> {
        (index < self.count).then(|| self.decode(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<ProgramHeaderEntry>> + 'a {
        let table = *self;
        (0..self.count).map(move |i| table.decode(i))
    }

    /// Decode every entry, stopping at the first failure.
    pub fn collect_all(&self) -> Result<Vec<ProgramHeaderEntry>> {
        self.iter().collect()
    }

    fn decode(&self, index: u16) -> Result<ProgramHeaderEntry> {
        let region = Region::ProgramHeader(index);
        let header_offset = entry_offset(self.offset, self.entsize, index).ok_or(
            FormatError::TruncatedFile {
                region,
                offset: self.offset,
                end: u64::MAX,
                file_len: self.image.len(),
            },
        )?;
        let raw: [u8; PHDR_SIZE] = self.image.record(header_offset, region)?;

        let entry = ProgramHeaderEntry {
            index,
            header_offset,
            p_type: SegmentType::from(raw.le_u32(0)),
            p_flags: raw.le_u32(4),
            p_offset: raw.le_u64(8),
            p_vaddr: raw.le_u64(16),
            p_paddr: raw.le_u64(24),
            p_filesz: raw.le_u64(32),
            p_memsz: raw.le_u64(40),
            p_align: raw.le_u64(48),
        };
        trace!(index, header_offset, p_type = ?entry.p_type, "Decoded program header");
        Ok(entry)
    }
}

/// `table + index * entsize`, or `None` on overflow
pub(crate) fn entry_offset(table: u64, entsize: u16, index: u16) -> Option<u64> {
    (index as u64)
        .checked_mul(entsize as u64)
        .and_then(|rel| table.checked_add(rel))
}
