//! ELF64 (x86-64) structural decoder
//!
//! A zero-copy decoder over a borrowed byte buffer. Every offset read from
//! the file is validated against the buffer before use; anything that would
//! read past the end surfaces as [`FormatError::TruncatedFile`].
//!
//! The analysis is a single linear pass: header validation, program header
//! walk, section header walk (locating the string and dynamic symbol
//! tables), then dynamic symbol decoding. The first error aborts the pass.

pub mod headers;
pub mod image;
pub mod sections;
pub mod segments;
pub mod symbols;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::config::TableConfig;
use headers::parse_header;
pub use image::RawImage;
use sections::{SectionHeaders, SectionScan};
use segments::ProgramHeaders;
use serde::Serialize;
use symbols::DynamicSymbols;
use tracing::{debug, instrument};
pub use types::*;

/// A validated ELF64 x86-64 image
#[derive(Debug, Clone, Copy)]
pub struct ElfImage<'data> {
    image: RawImage<'data>,
    header: FileHeader,
}

impl<'data> ElfImage<'data> {
    /// Validate the file header; nothing else is decoded yet.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let image = RawImage::new(data);
        let header = parse_header(image)?;
        Ok(Self { image, header })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn data(&self) -> &'data [u8] {
        self.image.as_bytes()
    }

    pub fn program_headers(&self) -> ProgramHeaders<'data> {
        ProgramHeaders::new(self.image, &self.header)
    }

    pub fn section_headers(&self) -> SectionHeaders<'data> {
        SectionHeaders::new(self.image, &self.header)
    }

    /// Symbol decoder over the tables located by a section scan.
    pub fn dynamic_symbols(&self, scan: &SectionScan) -> Result<DynamicSymbols<'data>> {
        let (strings, table) = scan.require()?;
        Ok(DynamicSymbols::new(self.image, table, strings))
    }

    /// Run the remaining stages and materialize every record.
    #[instrument(level = "debug", skip_all, fields(file_size = self.image.len()))]
    pub fn analyze(&self, config: &TableConfig) -> Result<Analysis<'data>> {
        let program_headers = self.program_headers().collect_all()?;
        debug!(count = program_headers.len(), "Walked program headers");

        let scan = self.section_headers().scan(config)?;
        let (string_table, dynsym) = scan.require()?;
        let symbols = DynamicSymbols::new(self.image, dynsym, string_table).collect_all()?;
        debug!(count = symbols.len(), "Decoded dynamic symbols");

        Ok(Analysis {
            file_size: self.image.len(),
            header: self.header,
            program_headers,
            sections: scan.sections,
            string_table,
            dynsym,
            symbols,
        })
    }
}

/// Everything one pass over an image produces, in report order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis<'data> {
    pub file_size: usize,
    pub header: FileHeader,
    pub program_headers: Vec<ProgramHeaderEntry>,
    pub sections: Vec<SectionHeaderEntry>,
    pub string_table: StringTableRef,
    pub dynsym: DynSymRef,
    pub symbols: Vec<SymbolEntry<'data>>,
}

/// Validate and fully decode `data`.
pub fn analyze<'data>(data: &'data [u8], config: &TableConfig) -> Result<Analysis<'data>> {
    ElfImage::parse(data)?.analyze(config)
}
