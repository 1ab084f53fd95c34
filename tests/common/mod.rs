//! Common test utilities and helpers.
//!
//! Builds synthetic little-endian ELF64 images so integration tests do not
//! depend on binaries being present on the host.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const EHDR_SIZE: usize = 64;
pub const PHDR_SIZE: usize = 56;
pub const SHDR_SIZE: usize = 64;
pub const SYM_SIZE: usize = 24;

pub const PT_LOAD: u32 = 1;
pub const PT_INTERP: u32 = 3;
pub const PT_GNU_STACK: u32 = 0x6474e551;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_DYNSYM: u32 = 11;

pub const EM_X86_64: u16 = 62;
pub const EM_AARCH64: u16 = 183;

/// Program header as written into the image
#[derive(Debug, Clone, Copy, Default)]
pub struct Phdr {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl Phdr {
    fn encode(&self) -> [u8; PHDR_SIZE] {
        let mut rec = [0u8; PHDR_SIZE];
        rec[0..4].copy_from_slice(&self.p_type.to_le_bytes());
        rec[4..8].copy_from_slice(&self.p_flags.to_le_bytes());
        rec[8..16].copy_from_slice(&self.p_offset.to_le_bytes());
        rec[16..24].copy_from_slice(&self.p_vaddr.to_le_bytes());
        rec[24..32].copy_from_slice(&self.p_paddr.to_le_bytes());
        rec[32..40].copy_from_slice(&self.p_filesz.to_le_bytes());
        rec[40..48].copy_from_slice(&self.p_memsz.to_le_bytes());
        rec[48..56].copy_from_slice(&self.p_align.to_le_bytes());
        rec
    }
}

struct Section {
    sh_type: u32,
    sh_name: u32,
    payload: Vec<u8>,
}

/// Image layout: header, program headers, section payloads (8-aligned),
/// section header table. Section 0 is always SHT_NULL.
pub struct ElfBuilder {
    pub class: u8,
    pub data: u8,
    pub osabi: u8,
    pub machine: u16,
    pub e_type: u16,
    pub entry: u64,
    pub phentsize: u16,
    pub shstrndx: u16,
    phdrs: Vec<Phdr>,
    sections: Vec<Section>,
}

pub struct Built {
    pub bytes: Vec<u8>,
    pub phoff: u64,
    pub shoff: u64,
    pub section_offsets: Vec<u64>,
}

impl Default for ElfBuilder {
    fn default() -> Self {
        Self {
            class: 2,
            data: 1,
            osabi: 0,
            machine: EM_X86_64,
            e_type: 2,
            entry: 0x401000,
            phentsize: PHDR_SIZE as u16,
            shstrndx: 0,
            phdrs: Vec::new(),
            sections: Vec::new(),
        }
    }
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phdr(mut self, phdr: Phdr) -> Self {
        self.phdrs.push(phdr);
        self
    }

    pub fn section(self, sh_type: u32, payload: &[u8]) -> Self {
        self.named_section(sh_type, 0, payload)
    }

    pub fn named_section(mut self, sh_type: u32, sh_name: u32, payload: &[u8]) -> Self {
        self.sections.push(Section {
            sh_type,
            sh_name,
            payload: payload.to_vec(),
        });
        self
    }

    pub fn build(&self) -> Built {
        let mut out = vec![0u8; EHDR_SIZE];
        let phoff = if self.phdrs.is_empty() { 0 } else { EHDR_SIZE as u64 };
        let stride = (self.phentsize as usize).max(PHDR_SIZE);
        for phdr in &self.phdrs {
            let start = out.len();
            out.extend_from_slice(&phdr.encode());
            out.resize(start + stride, 0);
        }

        let mut section_offsets = vec![0u64];
        for section in &self.sections {
            align(&mut out);
            section_offsets.push(out.len() as u64);
            out.extend_from_slice(&section.payload);
        }

        align(&mut out);
        let shoff = out.len() as u64;
        out.extend_from_slice(&[0u8; SHDR_SIZE]);
        for (i, section) in self.sections.iter().enumerate() {
            let mut rec = [0u8; SHDR_SIZE];
            rec[0..4].copy_from_slice(&section.sh_name.to_le_bytes());
            rec[4..8].copy_from_slice(&section.sh_type.to_le_bytes());
            rec[24..32].copy_from_slice(&section_offsets[i + 1].to_le_bytes());
            rec[32..40].copy_from_slice(&(section.payload.len() as u64).to_le_bytes());
            out.extend_from_slice(&rec);
        }

        out[0..4].copy_from_slice(b"\x7fELF");
        out[4] = self.class;
        out[5] = self.data;
        out[6] = 1;
        out[7] = self.osabi;
        out[16..18].copy_from_slice(&self.e_type.to_le_bytes());
        out[18..20].copy_from_slice(&self.machine.to_le_bytes());
        out[20..24].copy_from_slice(&1u32.to_le_bytes());
        out[24..32].copy_from_slice(&self.entry.to_le_bytes());
        out[32..40].copy_from_slice(&phoff.to_le_bytes());
        out[40..48].copy_from_slice(&shoff.to_le_bytes());
        out[52..54].copy_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
        out[54..56].copy_from_slice(&self.phentsize.to_le_bytes());
        out[56..58].copy_from_slice(&(self.phdrs.len() as u16).to_le_bytes());
        out[58..60].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
        out[60..62].copy_from_slice(&(self.sections.len() as u16 + 1).to_le_bytes());
        out[62..64].copy_from_slice(&self.shstrndx.to_le_bytes());

        Built {
            bytes: out,
            phoff,
            shoff,
            section_offsets,
        }
    }
}

fn align(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}

/// One 24-byte ELF64 symbol record
pub fn sym(st_name: u32, st_info: u8, st_shndx: u16, st_value: u64, st_size: u64) -> Vec<u8> {
    let mut rec = vec![0u8; SYM_SIZE];
    rec[0..4].copy_from_slice(&st_name.to_le_bytes());
    rec[4] = st_info;
    rec[6..8].copy_from_slice(&st_shndx.to_le_bytes());
    rec[8..16].copy_from_slice(&st_value.to_le_bytes());
    rec[16..24].copy_from_slice(&st_size.to_le_bytes());
    rec
}

/// The canonical end-to-end image: one LOAD segment, a STRTAB holding
/// "\0foo\0", and a DYNSYM holding the single symbol `foo`.
pub fn foo_image() -> Built {
    ElfBuilder::new()
        .phdr(Phdr {
            p_type: PT_LOAD,
            p_flags: 5,
            p_offset: 0,
            p_vaddr: 0x400000,
            p_paddr: 0x400000,
            p_filesz: 0x100,
            p_memsz: 0x100,
            p_align: 0x1000,
        })
        .section(SHT_STRTAB, b"\0foo\0")
        .section(SHT_DYNSYM, &sym(1, 0x12, 1, 0x401000, 8))
        .build()
}

/// Creates a temporary file with the given content.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file
}
