//! Output formats for command results.
//!
//! - [`plain`]: numbered text blocks for the terminal (default)
//! - [`json`]: pretty JSON, printed or written to a file (`--json`, `--output`)

pub mod json;
pub mod plain;
