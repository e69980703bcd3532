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

//! Error types for PSL processing.
//!
//! Malformed PSL content is never an error: extraction rules that do not
//! match simply produce nothing. A [`PslError`] is reserved for input the
//! toolkit refuses to look at (oversized, not text, control characters).

use std::fmt;
use thiserror::Error;

/// Category of a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PslErrorKind {
    /// Input could not be decoded or contains forbidden characters.
    Syntax,
    /// Input exceeds a configured limit.
    Security,
    /// Reading or writing failed.
    IO,
}

impl fmt::Display for PslErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "SyntaxError"),
            Self::Security => write!(f, "SecurityError"),
            Self::IO => write!(f, "IOError"),
        }
    }
}

/// Error raised when a PSL document cannot be processed at all.
#[derive(Debug, Clone, Error)]
#[error("{kind} at line {line}: {message}")]
pub struct PslError {
    /// Error category.
    pub kind: PslErrorKind,
    /// Human readable description.
    pub message: String,
    /// 1-based line number, 0 when the whole input is at fault.
    pub line: usize,
    /// Optional extra context (file name, offending excerpt).
    pub context: Option<String>,
}

impl PslError {
    pub fn new(kind: PslErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(PslErrorKind::Syntax, message, line)
    }

    pub fn security(message: impl Into<String>, line: usize) -> Self {
        Self::new(PslErrorKind::Security, message, line)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(PslErrorKind::IO, message, 0)
    }
}

pub type PslResult<T> = Result<T, PslError>;
