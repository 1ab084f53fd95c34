//! Core ELF64 types, constants and the decoder error taxonomy

use bitflags::bitflags;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// ELF decoding errors. Every variant is terminal for the analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("not an ELF image (magic bytes {found:02x?})")]
    NotElf { found: Vec<u8> },

    #[error("unsupported ELF class {0} (only ELFCLASS64 is supported)")]
    UnsupportedClass(u8),

    #[error("unsupported data encoding {0} (only little-endian images are supported)")]
    UnsupportedEncoding(u8),

    #[error("unsupported machine {0:#x} (only x86-64 is supported)")]
    UnsupportedArch(u16),

    #[error("missing required section: {0}")]
    MissingRequiredSection(RequiredSection),

    #[error("truncated file: {region} needs bytes {offset:#x}..{end:#x} but the image is {file_len:#x} bytes")]
    TruncatedFile {
        region: Region,
        offset: u64,
        end: u64,
        file_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// Region of the image a read was attempting when it ran out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    FileHeader,
    ProgramHeader(u16),
    SectionHeader(u16),
    Symbol(u64),
    SymbolName(u64),
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileHeader => write!(f, "file header"),
            Self::ProgramHeader(i) => write!(f, "program header {}", i),
            Self::SectionHeader(i) => write!(f, "section header {}", i),
            Self::Symbol(j) => write!(f, "symbol table entry {}", j),
            Self::SymbolName(j) => write!(f, "name of symbol table entry {}", j),
        }
    }
}

/// Sections the analysis cannot proceed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequiredSection {
    StringTable,
    DynamicSymbolTable,
}

impl fmt::Display for RequiredSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StringTable => write!(f, "string table (SHT_STRTAB/SHT_SYMTAB)"),
            Self::DynamicSymbolTable => write!(f, "dynamic symbol table (SHT_DYNSYM)"),
        }
    }
}

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

pub const ELFCLASS64: u8 = 2;
pub const ELFDATA2LSB: u8 = 1;
pub const EM_X86_64: u16 = 62;

/// On-disk record sizes (ELF64)
pub const EHDR_SIZE: usize = 64;
pub const PHDR_SIZE: usize = 56;
pub const SHDR_SIZE: usize = 64;
pub const SYM_SIZE: usize = 24;

/// ELF file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
    Other(u16),
}

impl From<u16> for ElfType {
    fn from(val: u16) -> Self {
        match val {
            0 => ElfType::None,
            1 => ElfType::Relocatable,
            2 => ElfType::Executable,
            3 => ElfType::SharedObject,
            4 => ElfType::Core,
            other => ElfType::Other(other),
        }
    }
}

/// ELF machine architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfMachine {
    X86_64,
    Other(u16),
}

impl From<u16> for ElfMachine {
    fn from(val: u16) -> Self {
        match val {
            EM_X86_64 => ElfMachine::X86_64,
            other => ElfMachine::Other(other),
        }
    }
}

/// ELF identification (first 16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElfIdent {
    pub magic: [u8; 4],
    pub class: u8,
    pub data: u8,
    pub version: u8,
    pub osabi: u8,
    pub abiversion: u8,
}

/// ELF file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub ident: ElfIdent,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl FileHeader {
    pub fn file_type(&self) -> ElfType {
        ElfType::from(self.e_type)
    }

    pub fn machine(&self) -> ElfMachine {
        ElfMachine::from(self.e_machine)
    }

    pub fn entry_point(&self) -> u64 {
        self.e_entry
    }
}

/// Program header types
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;
pub const PT_GNU_EH_FRAME: u32 = 0x6474e550;
pub const PT_GNU_STACK: u32 = 0x6474e551;
pub const PT_GNU_RELRO: u32 = 0x6474e552;
pub const PT_GNU_PROPERTY: u32 = 0x6474e553;
pub const PT_LOPROC: u32 = 0x70000000;
pub const PT_HIPROC: u32 = 0x7fffffff;

/// Segment type; values without an enumerator are kept as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    LoProc,
    HiProc,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    GnuProperty,
    Unknown(u32),
}

impl From<u32> for SegmentType {
    fn from(val: u32) -> Self {
        match val {
            PT_NULL => Self::Null,
            PT_LOAD => Self::Load,
            PT_DYNAMIC => Self::Dynamic,
            PT_INTERP => Self::Interp,
            PT_NOTE => Self::Note,
            PT_SHLIB => Self::Shlib,
            PT_PHDR => Self::Phdr,
            PT_TLS => Self::Tls,
            PT_LOPROC => Self::LoProc,
            PT_HIPROC => Self::HiProc,
            PT_GNU_EH_FRAME => Self::GnuEhFrame,
            PT_GNU_STACK => Self::GnuStack,
            PT_GNU_RELRO => Self::GnuRelro,
            PT_GNU_PROPERTY => Self::GnuProperty,
            other => Self::Unknown(other),
        }
    }
}

impl SegmentType {
    pub fn raw(&self) -> u32 {
        match self {
            Self::Null => PT_NULL,
            Self::Load => PT_LOAD,
            Self::Dynamic => PT_DYNAMIC,
            Self::Interp => PT_INTERP,
            Self::Note => PT_NOTE,
            Self::Shlib => PT_SHLIB,
            Self::Phdr => PT_PHDR,
            Self::Tls => PT_TLS,
            Self::LoProc => PT_LOPROC,
            Self::HiProc => PT_HIPROC,
            Self::GnuEhFrame => PT_GNU_EH_FRAME,
            Self::GnuStack => PT_GNU_STACK,
            Self::GnuRelro => PT_GNU_RELRO,
            Self::GnuProperty => PT_GNU_PROPERTY,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Conventional `PT_*` label, or `UNKNOWN/<n>`.
    pub fn label(&self) -> Cow<'static, str> {
        let name = match self {
            Self::Null => "PT_NULL",
            Self::Load => "PT_LOAD",
            Self::Dynamic => "PT_DYNAMIC",
            Self::Interp => "PT_INTERP",
            Self::Note => "PT_NOTE",
            Self::Shlib => "PT_SHLIB",
            Self::Phdr => "PT_PHDR",
            Self::Tls => "PT_TLS",
            Self::LoProc => "PT_LOPROC",
            Self::HiProc => "PT_HIPROC",
            Self::GnuEhFrame => "PT_GNU_EH_FRAME",
            Self::GnuStack => "PT_GNU_STACK",
            Self::GnuRelro => "PT_GNU_RELRO",
            Self::GnuProperty => "PT_GNU_PROPERTY",
            Self::Unknown(raw) => return Cow::Owned(format!("UNKNOWN/{}", raw)),
        };
        Cow::Borrowed(name)
    }
}

bitflags! {
    /// Program header flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u32 {
        const X = 0x1;
        const W = 0x2;
        const R = 0x4;
    }
}

impl fmt::Display for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.contains(Self::R) { 'R' } else { '-' };
        let w = if self.contains(Self::W) { 'W' } else { '-' };
        let x = if self.contains(Self::X) { 'X' } else { '-' };
        write!(f, "{}{}{}", r, w, x)
    }
}

/// Decoded program header table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramHeaderEntry {
    pub index: u16,
    /// File offset of this header record within the program header table
    pub header_offset: u64,
    pub p_type: SegmentType,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeaderEntry {
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_truncate(self.p_flags)
    }

    pub fn is_load(&self) -> bool {
        self.p_type == SegmentType::Load
    }
}

/// Section types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_HASH: u32 = 5;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;
pub const SHT_SHLIB: u32 = 10;
pub const SHT_DYNSYM: u32 = 11;
pub const SHT_INIT_ARRAY: u32 = 14;
pub const SHT_FINI_ARRAY: u32 = 15;
pub const SHT_PREINIT_ARRAY: u32 = 16;
pub const SHT_GROUP: u32 = 17;
pub const SHT_SYMTAB_SHNDX: u32 = 18;
pub const SHT_GNU_HASH: u32 = 0x6ffffff6;
pub const SHT_GNU_VERDEF: u32 = 0x6ffffffd;
pub const SHT_GNU_VERNEED: u32 = 0x6ffffffe;
pub const SHT_GNU_VERSYM: u32 = 0x6fffffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionType {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Shlib,
    Dynsym,
    InitArray,
    FiniArray,
    PreinitArray,
    Group,
    SymtabShndx,
    GnuHash,
    GnuVerdef,
    GnuVerneed,
    GnuVersym,
    Other(u32),
}

impl From<u32> for SectionType {
    fn from(val: u32) -> Self {
        match val {
            SHT_NULL => Self::Null,
            SHT_PROGBITS => Self::Progbits,
            SHT_SYMTAB => Self::Symtab,
            SHT_STRTAB => Self::Strtab,
            SHT_RELA => Self::Rela,
            SHT_HASH => Self::Hash,
            SHT_DYNAMIC => Self::Dynamic,
            SHT_NOTE => Self::Note,
            SHT_NOBITS => Self::Nobits,
            SHT_REL => Self::Rel,
            SHT_SHLIB => Self::Shlib,
            SHT_DYNSYM => Self::Dynsym,
            SHT_INIT_ARRAY => Self::InitArray,
            SHT_FINI_ARRAY => Self::FiniArray,
            SHT_PREINIT_ARRAY => Self::PreinitArray,
            SHT_GROUP => Self::Group,
            SHT_SYMTAB_SHNDX => Self::SymtabShndx,
            SHT_GNU_HASH => Self::GnuHash,
            SHT_GNU_VERDEF => Self::GnuVerdef,
            SHT_GNU_VERNEED => Self::GnuVerneed,
            SHT_GNU_VERSYM => Self::GnuVersym,
            other => Self::Other(other),
        }
    }
}

impl SectionType {
    pub fn label(&self) -> Cow<'static, str> {
        let name = match self {
            Self::Null => "SHT_NULL",
            Self::Progbits => "SHT_PROGBITS",
            Self::Symtab => "SHT_SYMTAB",
            Self::Strtab => "SHT_STRTAB",
            Self::Rela => "SHT_RELA",
            Self::Hash => "SHT_HASH",
            Self::Dynamic => "SHT_DYNAMIC",
            Self::Note => "SHT_NOTE",
            Self::Nobits => "SHT_NOBITS",
            Self::Rel => "SHT_REL",
            Self::Shlib => "SHT_SHLIB",
            Self::Dynsym => "SHT_DYNSYM",
            Self::InitArray => "SHT_INIT_ARRAY",
            Self::FiniArray => "SHT_FINI_ARRAY",
            Self::PreinitArray => "SHT_PREINIT_ARRAY",
            Self::Group => "SHT_GROUP",
            Self::SymtabShndx => "SHT_SYMTAB_SHNDX",
            Self::GnuHash => "SHT_GNU_HASH",
            Self::GnuVerdef => "SHT_GNU_VERDEF",
            Self::GnuVerneed => "SHT_GNU_VERNEED",
            Self::GnuVersym => "SHT_GNU_VERSYM",
            Self::Other(raw) => return Cow::Owned(format!("UNKNOWN/{:#x}", raw)),
        };
        Cow::Borrowed(name)
    }
}

/// Decoded section header table slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeaderEntry {
    pub index: u16,
    pub header_offset: u64,
    /// Name from the section-name string table, when it could be resolved
    pub name: Option<String>,
    pub sh_name: u32,
    pub sh_type: SectionType,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

/// Location of the string table used to resolve dynamic symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringTableRef {
    pub section_index: u16,
    pub offset: u64,
}

/// Location and byte size of the dynamic symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DynSymRef {
    pub section_index: u16,
    pub offset: u64,
    pub size: u64,
}

/// Special section indices
pub const SHN_UNDEF: u16 = 0;
pub const SHN_ABS: u16 = 0xfff1;
pub const SHN_COMMON: u16 = 0xfff2;

/// Symbol binding
pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

/// Symbol types
pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STT_TLS: u8 = 6;

/// Symbol visibility
pub const STV_DEFAULT: u8 = 0;
pub const STV_INTERNAL: u8 = 1;
pub const STV_HIDDEN: u8 = 2;
pub const STV_PROTECTED: u8 = 3;

/// Decoded dynamic symbol entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry<'a> {
    pub index: u64,
    pub st_name: u32,
    /// Resolved name; `None` when `st_name` is zero
    pub name: Option<Cow<'a, str>>,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl SymbolEntry<'_> {
    pub fn binding(&self) -> u8 {
        self.st_info >> 4
    }

    pub fn symbol_type(&self) -> u8 {
        self.st_info & 0xf
    }

    pub fn visibility(&self) -> u8 {
        self.st_other & 0x3
    }

    pub fn is_undefined(&self) -> bool {
        self.st_shndx == SHN_UNDEF
    }

    pub fn is_function(&self) -> bool {
        self.symbol_type() == STT_FUNC
    }

    pub fn address(&self) -> u64 {
        self.st_value
    }

    /// `LOCAL`, `GLOBAL`, `WEAK` or `BIND/<n>`.
    pub fn binding_label(&self) -> Cow<'static, str> {
        match self.binding() {
            STB_LOCAL => Cow::Borrowed("LOCAL"),
            STB_GLOBAL => Cow::Borrowed("GLOBAL"),
            STB_WEAK => Cow::Borrowed("WEAK"),
            other => Cow::Owned(format!("BIND/{}", other)),
        }
    }

    /// `NOTYPE`, `OBJECT`, `FUNC`, `SECTION`, `FILE`, `TLS` or `TYPE/<n>`.
    pub fn type_label(&self) -> Cow<'static, str> {
        let name = match self.symbol_type() {
            STT_NOTYPE => "NOTYPE",
            STT_OBJECT => "OBJECT",
            STT_FUNC => "FUNC",
            STT_SECTION => "SECTION",
            STT_FILE => "FILE",
            STT_TLS => "TLS",
            other => return Cow::Owned(format!("TYPE/{}", other)),
        };
        Cow::Borrowed(name)
    }

    pub fn visibility_label(&self) -> &'static str {
        match self.visibility() {
            STV_DEFAULT => "DEFAULT",
            STV_INTERNAL => "INTERNAL",
            STV_HIDDEN => "HIDDEN",
            _ => "PROTECTED",
        }
    }

    /// Name of a reserved `st_shndx` value, if it is one.
    pub fn special_section(&self) -> Option<&'static str> {
        match self.st_shndx {
            SHN_UNDEF => Some("UNDEF"),
            SHN_ABS => Some("ABS"),
            SHN_COMMON => Some("COMMON"),
            _ => None,
        }
    }
}
