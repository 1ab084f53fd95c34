//! Command-line interface definitions for elfscope.

use crate::config::{DynSymPolicy, ElfscopeConfig, OutputFormat, StringTablePolicy};
use clap::Parser;
use std::path::PathBuf;

/// Inspect the layout of an ELF64 x86-64 executable or shared object.
#[derive(Debug, Parser)]
#[command(name = "elfscope", version, about)]
pub struct Cli {
    /// ELF file to inspect.
    pub file: PathBuf,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JSON configuration file; flags given here override it.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Section types accepted as the symbol-name string table.
    #[arg(long, value_enum)]
    pub strtab_policy: Option<StringTablePolicy>,

    /// Which SHT_DYNSYM section to use when several exist.
    #[arg(long, value_enum)]
    pub dynsym_policy: Option<DynSymPolicy>,

    /// Refuse files larger than this many bytes.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Fold command-line overrides into a base configuration.
    pub fn apply(&self, mut config: ElfscopeConfig) -> ElfscopeConfig {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(policy) = self.strtab_policy {
            config.tables.string_table = policy;
        }
        if let Some(policy) = self.dynsym_policy {
            config.tables.dynsym = policy;
        }
        if let Some(limit) = self.max_file_size {
            config.io.max_file_size = limit;
        }
        if self.log_json {
            config.output.json_logs = true;
        }
        config
    }
}
