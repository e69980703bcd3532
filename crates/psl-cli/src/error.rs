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

//! Structured error type for the PSL CLI.
//!
//! Command functions still report `String` errors to `main`; [`CliError`] is
//! what the batch layer carries per file, so failures can be cloned across
//! threads and summarized after the run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while processing one input file.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error message.
        message: String,
    },

    /// File exceeds `PSL_MAX_FILE_SIZE`.
    #[error(
        "File '{path}' is too large ({actual} bytes). Maximum allowed size is {max} bytes ({max_mb} MB)"
    )]
    FileTooLarge {
        /// The file involved.
        path: PathBuf,
        /// Actual size in bytes.
        actual: u64,
        /// Configured maximum in bytes.
        max: u64,
        /// Configured maximum in megabytes, for display.
        max_mb: u64,
    },

    /// The document was rejected before any PSL processing (limits,
    /// encoding, control characters).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation reported errors, or warnings under `--warn-error`.
    #[error("Validation failed: {errors} error(s), {warnings} warning(s)")]
    ValidationFailed {
        /// Number of errors.
        errors: usize,
        /// Number of warnings.
        warnings: usize,
    },

    /// `format --check` found a file that is not already formatted.
    #[error("File is not formatted")]
    NotFormatted,

    /// Invalid input provided by the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<psl_core::PslError> for CliError {
    fn from(source: psl_core::PslError) -> Self {
        Self::Parse(source.to_string())
    }
}
