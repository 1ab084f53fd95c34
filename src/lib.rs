//! Read-only structural inspector for ELF64 x86-64 images.
//!
//! The decoder in [`formats::elf`] works on a borrowed byte slice and never
//! reads outside it. [`io`] maps files for it, [`report`] renders results.

pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod logging;
pub mod report;

pub use error::{ElfscopeError, Result};
pub use formats::elf::{analyze, Analysis, ElfImage, FormatError};
