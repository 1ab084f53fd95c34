//! ELF header parsing and validation

use crate::formats::elf::image::{LeFields, RawImage};
use crate::formats::elf::types::*;
use tracing::debug;

/// Decode and validate the ELF64 file header.
///
/// Checks run in a fixed order and the first failure wins: magic, class,
/// data encoding, machine. OS/ABI is accepted as-is.
pub fn parse_header(image: RawImage<'_>) -> Result<FileHeader> {
    let bytes = image.as_bytes();
    let prefix = &bytes[..bytes.len().min(ELF_MAGIC.len())];
    if !ELF_MAGIC.starts_with(prefix) || prefix.is_empty() {
        return Err(FormatError::NotElf {
            found: prefix.to_vec(),
        });
    }

    let raw: [u8; EHDR_SIZE] = image.record(0, Region::FileHeader)?;

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&raw[0..4]);
    let ident = ElfIdent {
        magic,
        class: raw[4],
        data: raw[5],
        version: raw[6],
        osabi: raw[7],
        abiversion: raw[8],
    };

    if ident.class != ELFCLASS64 {
        return Err(FormatError::UnsupportedClass(ident.class));
    }
    if ident.data != ELFDATA2LSB {
        return Err(FormatError::UnsupportedEncoding(ident.data));
    }

    let e_machine = raw.le_u16(18);
    if e_machine != EM_X86_64 {
        return Err(FormatError::UnsupportedArch(e_machine));
    }

    let header = FileHeader {
        ident,
        e_type: raw.le_u16(16),
        e_machine,
        e_version: raw.le_u32(20),
        e_entry: raw.le_u64(24),
        e_phoff: raw.le_u64(32),
        e_shoff: raw.le_u64(40),
        e_flags: raw.le_u32(48),
        e_ehsize: raw.le_u16(52),
        e_phentsize: raw.le_u16(54),
        e_phnum: raw.le_u16(56),
        e_shentsize: raw.le_u16(58),
        e_shnum: raw.le_u16(60),
        e_shstrndx: raw.le_u16(62),
    };

    debug!(
        file_size = image.len(),
        phoff = header.e_phoff,
        phnum = header.e_phnum,
        shoff = header.e_shoff,
        shnum = header.e_shnum,
        shstrndx = header.e_shstrndx,
        "Validated ELF header"
    );

    Ok(header)
}
