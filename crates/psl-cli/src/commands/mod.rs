// Dweve PSL - Pipeline Specification Language toolkit
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI command implementations

mod batch_commands;
mod completion;
mod format;
mod inspect;
mod lineage;
mod sql;
mod validate;

pub use batch_commands::batch_validate;
pub use completion::{generate_completion_for_command, print_installation_instructions};
pub use format::format;
pub use inspect::inspect;
pub use lineage::lineage;
pub use sql::format_sql;
pub use validate::validate;

use crate::error::CliError;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Default maximum file size (1 GB).
/// Can be overridden via the `PSL_MAX_FILE_SIZE` environment variable.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

fn get_max_file_size() -> u64 {
    std::env::var("PSL_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file, refusing anything larger than `PSL_MAX_FILE_SIZE`.
///
/// The size is checked from metadata before any bytes are read.
pub fn read_path(path: &Path) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Read a file for a single-file command.
///
/// # Errors
///
/// Returns `Err` if the file is missing, unreadable, not UTF-8, or larger
/// than `PSL_MAX_FILE_SIZE` bytes.
///
/// ```no_run
/// use psl_cli::commands::read_file;
///
/// # fn main() -> Result<(), String> {
/// let content = read_file("claims.psl")?;
/// assert!(!content.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn read_file(path: &str) -> Result<String, String> {
    read_path(Path::new(path)).map_err(|e| match e {
        CliError::FileTooLarge { .. } => format!(
            "{}.\nTo process larger files, set PSL_MAX_FILE_SIZE environment variable (in bytes).",
            e
        ),
        other => other.to_string(),
    })
}

/// Like [`read_file`], but `-` reads standard input.
pub fn read_input(path: &str) -> Result<String, String> {
    if path != "-" {
        return read_file(path);
    }

    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| format!("Failed to read from stdin: {}", e))?;
    Ok(content)
}

/// Write to the given file, or to stdout when `path` is `None`.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| format!("Failed to write '{}': {}", p, e)),
        None => io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| format!("Failed to write to stdout: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_missing() {
        let err = read_file("/nonexistent/claims.psl").unwrap_err();
        assert!(err.contains("/nonexistent/claims.psl"));
    }

    #[test]
    fn test_read_and_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.psl");
        let path_str = path.to_str().unwrap();

        write_output("DATASET {\n}\n", Some(path_str)).unwrap();
        assert_eq!(read_file(path_str).unwrap(), "DATASET {\n}\n");
    }
}
