//! Configuration for elfscope.
//!
//! Every section has defaults that reproduce the classic behavior of the
//! tool, so an empty or partial JSON file is a valid configuration.

use crate::error::{ElfscopeError, Result};
use crate::io::IOLimits;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElfscopeConfig {
    /// File mapping limits.
    pub io: IOConfig,
    /// Section discovery policies.
    pub tables: TableConfig,
    /// Report and log output.
    pub output: OutputConfig,
}

impl ElfscopeConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ElfscopeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ElfscopeError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// I/O configuration for file mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Largest file that will be mapped, in bytes.
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_file_size: self.max_file_size,
        }
    }
}

/// Which section types may serve as the symbol-name string table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StringTablePolicy {
    /// First SHT_STRTAB or SHT_SYMTAB section in table order.
    #[default]
    StrtabOrSymtab,
    /// First SHT_STRTAB section in table order.
    StrtabOnly,
}

/// Which SHT_DYNSYM section is used when several are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DynSymPolicy {
    #[default]
    LastWins,
    FirstWins,
}

/// Section discovery configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub string_table: StringTablePolicy,
    pub dynsym: DynSymPolicy,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
}
