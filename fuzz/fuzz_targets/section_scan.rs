#![no_main]
use elfscope::config::{DynSymPolicy, StringTablePolicy, TableConfig};
use elfscope::ElfImage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(elf) = ElfImage::parse(data) else {
        return;
    };
    let config = TableConfig {
        string_table: StringTablePolicy::StrtabOnly,
        dynsym: DynSymPolicy::FirstWins,
    };
    if let Ok(scan) = elf.section_headers().scan(&config) {
        if let Ok(symbols) = elf.dynamic_symbols(&scan) {
            for symbol in symbols.iter() {
                if symbol.is_err() {
                    break;
                }
            }
        }
    }
});
