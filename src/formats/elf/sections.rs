//! Section header table walking and table discovery

use crate::config::{DynSymPolicy, StringTablePolicy, TableConfig};
use crate::formats::elf::image::{LeFields, RawImage};
use crate::formats::elf::segments::entry_offset;
use crate::formats::elf::types::*;
use memchr::memchr;
use tracing::{debug, trace, warn};

/// Lazy, restartable view over the section header table
#[derive(Debug, Clone, Copy)]
pub struct SectionHeaders<'a> {
    image: RawImage<'a>,
    offset: u64,
    entsize: u16,
    count: u16,
    shstrndx: u16,
}

/// Result of a full section header walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionScan {
    pub sections: Vec<SectionHeaderEntry>,
    pub string_table: Option<StringTableRef>,
    pub dynsym: Option<DynSymRef>,
}

impl SectionScan {
    /// Both tables the symbol decoder needs, or the first one missing.
    pub fn require(&self) -> Result<(StringTableRef, DynSymRef)> {
        let strtab = self
            .string_table
            .ok_or(FormatError::MissingRequiredSection(RequiredSection::StringTable))?;
        let dynsym = self.dynsym.ok_or(FormatError::MissingRequiredSection(
            RequiredSection::DynamicSymbolTable,
        ))?;
        Ok((strtab, dynsym))
    }
}

impl<'a> SectionHeaders<'a> {
    pub fn new(image: RawImage<'a>, header: &FileHeader) -> Self {
        Self {
            image,
            offset: header.e_shoff,
            entsize: header.e_shentsize,
            count: header.e_shnum,
            shstrndx: header.e_shstrndx,
        }
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decode entry `index` without resolving its name.
    pub fn get(&self, index: u16) -> Option<Result<SectionHeaderEntry>> {
        (index < self.count).then(|| self.decode(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<SectionHeaderEntry>> + 'a {
        let table = *self;
        (0..self.count).map(move |i| table.decode(i))
    }

    /// Decode every entry and attach names from the section-name table.
    pub fn collect_all(&self) -> Result<Vec<SectionHeaderEntry>> {
        let mut sections = self.iter().collect::<Result<Vec<_>>>()?;
        if let Some(names) = self.name_table(&sections) {
            for section in &mut sections {
                section.name = lookup_name(names, section.sh_name);
            }
        }
        Ok(sections)
    }

    /// Walk the whole table and locate the string and dynamic symbol tables.
    pub fn scan(&self, config: &TableConfig) -> Result<SectionScan> {
        let sections = self.collect_all()?;
        let mut string_table: Option<StringTableRef> = None;
        let mut dynsym: Option<DynSymRef> = None;

        for section in &sections {
            match section.sh_type {
                SectionType::Strtab | SectionType::Symtab => {
                    if section.sh_type == SectionType::Symtab
                        && config.string_table == StringTablePolicy::StrtabOnly
                    {
                        continue;
                    }
                    if string_table.is_none() {
                        debug!(
                            index = section.index,
                            offset = section.sh_offset,
                            "Found string table"
                        );
                        string_table = Some(StringTableRef {
                            section_index: section.index,
                            offset: section.sh_offset,
                        });
                    } else {
                        trace!(index = section.index, "Ignoring additional string table");
                    }
                }
                SectionType::Dynsym => {
                    if dynsym.is_some() && config.dynsym == DynSymPolicy::FirstWins {
                        trace!(index = section.index, "Ignoring additional dynsym table");
                        continue;
                    }
                    debug!(
                        index = section.index,
                        offset = section.sh_offset,
                        size = section.sh_size,
                        "Found dynsym table"
                    );
                    dynsym = Some(DynSymRef {
                        section_index: section.index,
                        offset: section.sh_offset,
                        size: section.sh_size,
                    });
                }
                _ => {}
            }
        }

        Ok(SectionScan {
            sections,
            string_table,
            dynsym,
        })
    }

    /// Bytes of the `e_shstrndx` section, if it is present and in bounds.
    fn name_table(&self, sections: &[SectionHeaderEntry]) -> Option<&'a [u8]> {
        if self.shstrndx == SHN_UNDEF {
            return None;
        }
        let Some(section) = sections.get(self.shstrndx as usize) else {
            warn!(shstrndx = self.shstrndx, "Section name table index out of range");
            return None;
        };
        match self.image.slice(
            section.sh_offset,
            section.sh_size,
            Region::SectionHeader(section.index),
        ) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Section name table is out of bounds; names unavailable");
                None
            }
        }
    }

    fn decode(&self, index: u16) -> Result<SectionHeaderEntry> {
        let region = Region::SectionHeader(index);
        let header_offset = entry_offset(self.offset, self.entsize, index).ok_or(
            FormatError::TruncatedFile {
                region,
                offset: self.offset,
                end: u64::MAX,
                file_len: self.image.len(),
            },
        )?;
        let raw: [u8; SHDR_SIZE] = self.image.record(header_offset, region)?;

        Ok(SectionHeaderEntry {
            index,
            header_offset,
            name: None,
            sh_name: raw.le_u32(0),
            sh_type: SectionType::from(raw.le_u32(4)),
            sh_flags: raw.le_u64(8),
            sh_addr: raw.le_u64(16),
            sh_offset: raw.le_u64(24),
            sh_size: raw.le_u64(32),
            sh_link: raw.le_u32(40),
            sh_info: raw.le_u32(44),
            sh_addralign: raw.le_u64(48),
            sh_entsize: raw.le_u64(56),
        })
    }
}

/// Name at `offset` within the section-name table; must be NUL-terminated
/// inside the table.
fn lookup_name(names: &[u8], offset: u32) -> Option<String> {
    let tail = names.get(offset as usize..)?;
    let nul = memchr(0, tail)?;
    Some(String::from_utf8_lossy(&tail[..nul]).into_owned())
}
