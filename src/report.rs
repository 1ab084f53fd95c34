//! Human-readable and JSON rendering of a finished analysis.

use crate::formats::elf::Analysis;
use std::io::{self, Write};

/// Render `analysis` in the classic text layout.
pub fn render_text<W: Write>(analysis: &Analysis<'_>, out: &mut W) -> io::Result<()> {
    let header = &analysis.header;
    writeln!(out, "file size: {}", analysis.file_size)?;
    writeln!(out, "entry point: {:#x}", header.e_entry)?;
    writeln!(out, "os/abi: {}", header.ident.osabi)?;
    writeln!(out, "program header offset: {}", header.e_phoff)?;
    writeln!(out, "program header num: {}", header.e_phnum)?;
    writeln!(out, "section header offset: {}", header.e_shoff)?;
    writeln!(out, "section header num: {}", header.e_shnum)?;
    writeln!(out, "section header string table: {}", header.e_shstrndx)?;
    writeln!(out)?;

    for ph in &analysis.program_headers {
        writeln!(out, "PROGRAM HEADER {}, offset = {}", ph.index, ph.header_offset)?;
        writeln!(out, "========================")?;
        writeln!(out, "p_type = {}", ph.p_type.label())?;
        writeln!(out, "p_offset = {}", ph.p_offset)?;
        writeln!(out, "p_vaddr = {}", ph.p_vaddr)?;
        writeln!(out, "p_paddr = {}", ph.p_paddr)?;
        writeln!(out, "p_filesz = {}", ph.p_filesz)?;
        writeln!(out, "p_memsz = {}", ph.p_memsz)?;
        writeln!(out, "p_flags = {} ({})", ph.p_flags, ph.flags())?;
        writeln!(out, "p_align = {}", ph.p_align)?;
        writeln!(out)?;
    }

    for sh in &analysis.sections {
        writeln!(
            out,
            "SECTION HEADER {}: name = {}, type = {}, offset = {}, size = {}",
            sh.index,
            sh.name.as_deref().unwrap_or("?"),
            sh.sh_type.label(),
            sh.sh_offset,
            sh.sh_size
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "string table at {} (section {})",
        analysis.string_table.offset, analysis.string_table.section_index
    )?;
    writeln!(
        out,
        "dynsym table at {}, size {} (section {})",
        analysis.dynsym.offset, analysis.dynsym.size, analysis.dynsym.section_index
    )?;
    writeln!(out)?;

    for sym in &analysis.symbols {
        writeln!(out, "SYMBOL TABLE ENTRY {}", sym.index)?;
        match &sym.name {
            Some(name) => writeln!(out, "st_name = {} ({})", sym.st_name, name)?,
            None => writeln!(out, "st_name = {}", sym.st_name)?,
        }
        writeln!(
            out,
            "st_info = {} ({} {})",
            sym.st_info,
            sym.binding_label(),
            sym.type_label()
        )?;
        writeln!(out, "st_other = {} ({})", sym.st_other, sym.visibility_label())?;
        match sym.special_section() {
            Some(special) => writeln!(out, "st_shndx = {} ({})", sym.st_shndx, special)?,
            None => writeln!(out, "st_shndx = {}", sym.st_shndx)?,
        }
        writeln!(out, "st_value = {:#x}", sym.st_value)?;
        writeln!(out, "st_size = {}", sym.st_size)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Render `analysis` as pretty-printed JSON followed by a newline.
pub fn render_json<W: Write>(analysis: &Analysis<'_>, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, analysis)?;
    writeln!(out)
}
