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

//! PSL formatting.
//!
//! Two formatters live here:
//!
//! - [`format_config`] normalises a whole PSL document: spacing around `=`
//!   and `{`, one closing brace per line, indentation by brace depth, and
//!   embedded SQL re-laid out by the SQL formatter. VARIABLE blocks and
//!   everything after the `#---hier---` marker are left exactly as
//!   written.
//! - [`format_sql`] lays out a single SQL statement.
//!
//! Both are idempotent: formatting already formatted text returns it
//! unchanged.
//!
//! # Examples
//!
//! ```
//! let doc = "CONNECTION C FROM R {\nQUERY = select a from t\n}";
//! let out = psl_fmt::format_config(doc).unwrap();
//! assert_eq!(
//!     out,
//!     "CONNECTION C FROM R {\n    QUERY = SELECT\n                a\n            FROM\n                t\n}"
//! );
//! assert_eq!(psl_fmt::format_config(&out).unwrap(), out);
//! ```

mod config;
mod formatter;
mod protect;
mod sql;

pub use config::{FormatConfig, FormatConfigBuilder};
pub use formatter::ConfigFormatter;
pub use protect::{BlockKind, BlockProtector, ProtectedBlock};
pub use sql::{flatten, uppercase_keywords, SqlFormatter};

use psl_core::PslResult;

/// Format a PSL document with the default configuration.
///
/// # Errors
///
/// Fails only when the input exceeds the default [`psl_core::Limits`] or
/// contains disallowed control characters.
pub fn format_config(document: &str) -> PslResult<String> {
    format_config_with_config(document, &FormatConfig::default())
}

/// Format a PSL document with a custom configuration.
pub fn format_config_with_config(document: &str, config: &FormatConfig) -> PslResult<String> {
    ConfigFormatter::new(config.clone()).format(document)
}

/// Flatten and format one SQL statement. `base_indent` is prepended to
/// every indent level; the first line is never indented.
///
/// ```
/// assert_eq!(
///     psl_fmt::format_sql("select a from t where x = 1", ""),
///     "SELECT\n        a\n    FROM\n        t\n    WHERE\n        x = 1"
/// );
/// ```
pub fn format_sql(sql: &str, base_indent: &str) -> String {
    SqlFormatter::new(base_indent).format(sql)
}
