//! Synthetic ELF64 images for unit tests

use crate::formats::elf::types::*;

struct PendingSection {
    sh_type: u32,
    sh_name: u32,
    payload: Vec<u8>,
}

/// Lays out: file header, program headers, section payloads, section headers.
/// Section 0 is always the SHT_NULL entry.
pub(crate) struct ImageBuilder {
    pub class: u8,
    pub data: u8,
    pub osabi: u8,
    pub machine: u16,
    pub e_type: u16,
    pub entry: u64,
    pub phentsize: u16,
    pub shstrndx: u16,
    segments: Vec<[u8; PHDR_SIZE]>,
    sections: Vec<PendingSection>,
}

pub(crate) struct BuiltImage {
    pub bytes: Vec<u8>,
    pub phoff: u64,
    pub shoff: u64,
    /// File offset of each section's payload, indexed by section index
    pub section_offsets: Vec<u64>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            class: ELFCLASS64,
            data: ELFDATA2LSB,
            osabi: 0,
            machine: EM_X86_64,
            e_type: 3,
            entry: 0,
            phentsize: PHDR_SIZE as u16,
            shstrndx: 0,
            segments: Vec::new(),
            sections: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn segment(
        &mut self,
        p_type: u32,
        p_flags: u32,
        p_offset: u64,
        p_vaddr: u64,
        p_filesz: u64,
        p_memsz: u64,
        p_align: u64,
    ) -> &mut Self {
        let mut rec = [0u8; PHDR_SIZE];
        rec[0..4].copy_from_slice(&p_type.to_le_bytes());
        rec[4..8].copy_from_slice(&p_flags.to_le_bytes());
        rec[8..16].copy_from_slice(&p_offset.to_le_bytes());
        rec[16..24].copy_from_slice(&p_vaddr.to_le_bytes());
        rec[24..32].copy_from_slice(&p_vaddr.to_le_bytes());
        rec[32..40].copy_from_slice(&p_filesz.to_le_bytes());
        rec[40..48].copy_from_slice(&p_memsz.to_le_bytes());
        rec[48..56].copy_from_slice(&p_align.to_le_bytes());
        self.segments.push(rec);
        self
    }

    /// Adds a section and returns its index in the section header table.
    pub fn section(&mut self, sh_type: u32, payload: &[u8]) -> u16 {
        self.named_section(sh_type, 0, payload)
    }

    pub fn named_section(&mut self, sh_type: u32, sh_name: u32, payload: &[u8]) -> u16 {
        self.sections.push(PendingSection {
            sh_type,
            sh_name,
            payload: payload.to_vec(),
        });
        self.sections.len() as u16
    }

    pub fn build(&self) -> BuiltImage {
        let mut out = vec![0u8; EHDR_SIZE];
        let phoff = if self.segments.is_empty() { 0 } else { EHDR_SIZE as u64 };
        for rec in &self.segments {
            let start = out.len();
            out.extend_from_slice(rec);
            out.resize(start + self.phentsize.max(PHDR_SIZE as u16) as usize, 0);
        }

        let mut section_offsets = vec![0u64];
        for section in &self.sections {
            pad_to(&mut out, 8);
            section_offsets.push(out.len() as u64);
            out.extend_from_slice(&section.payload);
        }

        pad_to(&mut out, 8);
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
        let shnum = self.sections.len() as u16 + 1;

        out[0..4].copy_from_slice(ELF_MAGIC);
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
        out[56..58].copy_from_slice(&(self.segments.len() as u16).to_le_bytes());
        out[58..60].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
        out[60..62].copy_from_slice(&shnum.to_le_bytes());
        out[62..64].copy_from_slice(&self.shstrndx.to_le_bytes());

        BuiltImage {
            bytes: out,
            phoff,
            shoff,
            section_offsets,
        }
    }
}

fn pad_to(out: &mut Vec<u8>, align: usize) {
    let rem = out.len() % align;
    if rem != 0 {
        out.resize(out.len() + align - rem, 0);
    }
}

/// One 24-byte ELF64 symbol record
pub(crate) fn symbol(st_name: u32, st_info: u8, st_shndx: u16, st_value: u64, st_size: u64) -> Vec<u8> {
    let mut rec = vec![0u8; SYM_SIZE];
    rec[0..4].copy_from_slice(&st_name.to_le_bytes());
    rec[4] = st_info;
    rec[6..8].copy_from_slice(&st_shndx.to_le_bytes());
    rec[8..16].copy_from_slice(&st_value.to_le_bytes());
    rec[16..24].copy_from_slice(&st_size.to_le_bytes());
    rec
}

/// LOAD + STRTAB("\0foo\0") + DYNSYM(null, foo)
pub(crate) fn minimal_dynamic_image() -> BuiltImage {
    let mut dynsym = symbol(0, 0, 0, 0, 0);
    dynsym.extend(symbol(1, (STB_GLOBAL << 4) | STT_FUNC, 1, 0x401000, 8));
    let mut builder = ImageBuilder::new();
    builder.segment(PT_LOAD, 5, 0, 0x400000, 0x100, 0x100, 0x1000);
    builder.section(SHT_DYNSYM, &dynsym);
    builder.section(SHT_STRTAB, b"\0foo\0");
    builder.build()
}
