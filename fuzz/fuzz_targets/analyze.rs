#![no_main]
use elfscope::config::TableConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(analysis) = elfscope::analyze(data, &TableConfig::default()) {
        let mut sink = Vec::new();
        let _ = elfscope::report::render_text(&analysis, &mut sink);
    }
});
