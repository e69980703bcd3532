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

//! Context helpers for [`PslResult`].
//!
//! ```rust
//! use psl::{parse, PslResultExt};
//!
//! fn load(path: &str, text: &str) -> psl::PslResult<psl::ParsedModel> {
//!     parse(text).context(format!("while parsing {}", path))
//! }
//!
//! let huge = "x".repeat(2 * 1024 * 1024);
//! let err = load("claims.psl", &huge).unwrap_err();
//! assert_eq!(err.context.as_deref(), Some("while parsing claims.psl"));
//! ```

use psl_core::{PslError, PslResult};

/// Adds context to errors as they propagate.
///
/// Contexts stack outermost first, separated by `": "`.
pub trait PslResultExt<T> {
    /// Attach a context message to the error, if any.
    fn context(self, context: impl Into<String>) -> PslResult<T>;

    /// Like [`context`](Self::context), but only builds the message on error.
    fn with_context<F, S>(self, f: F) -> PslResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> PslResultExt<T> for PslResult<T> {
    fn context(self, context: impl Into<String>) -> PslResult<T> {
        self.map_err(|e| push_context(e, context.into()))
    }

    fn with_context<F, S>(self, f: F) -> PslResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| push_context(e, f().into()))
    }
}

fn push_context(err: PslError, context: String) -> PslError {
    let combined = match &err.context {
        Some(inner) => format!("{}: {}", context, inner),
        None => context,
    };
    err.with_context(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> PslResult<()> {
        Err(PslError::security("input too large", 0))
    }

    #[test]
    fn test_context_attached() {
        let err = failing().context("reading claims.psl").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("reading claims.psl"));
        assert_eq!(err.message, "input too large");
    }

    #[test]
    fn test_context_chains_outermost_first() {
        let err = failing()
            .context("parsing")
            .context("batch job 3")
            .unwrap_err();
        assert_eq!(err.context.as_deref(), Some("batch job 3: parsing"));
    }

    #[test]
    fn test_with_context_is_lazy_on_success() {
        let mut called = false;
        let value: PslResult<u8> = Ok(1);
        let value = value.with_context(|| {
            called = true;
            "unused"
        });
        assert_eq!(value.unwrap(), 1);
        assert!(!called);
    }
}
