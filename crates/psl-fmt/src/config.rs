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

//! Formatter configuration.

use psl_core::Limits;

/// Configuration for [`format_config_with_config`](crate::format_config_with_config).
///
/// # Examples
///
/// ```
/// use psl_fmt::FormatConfig;
///
/// let config = FormatConfig::default();
/// assert_eq!(config.indent_width, 4);
/// assert_eq!(config.sql_base_indent, 8);
/// assert!(config.format_sql);
///
/// let config = FormatConfig::new().with_indent_width(2).with_format_sql(false);
/// assert_eq!(config.indent(), "  ");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct FormatConfig {
    /// Spaces per brace nesting level.
    ///
    /// Default: `4`
    pub indent_width: usize,

    /// Spaces added in front of every SQL indent level. The `SELECT` line
    /// itself stays on the `QUERY =` line.
    ///
    /// Default: `8`
    pub sql_base_indent: usize,

    /// Reformat the SQL of `QUERY = ...` bodies. When `false` they are
    /// restored exactly as written.
    ///
    /// Default: `true`
    pub format_sql: bool,

    /// Input limits checked before formatting.
    pub limits: Limits,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            sql_base_indent: 8,
            format_sql: true,
            limits: Limits::default(),
        }
    }
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FormatConfigBuilder {
        FormatConfigBuilder::new()
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_sql_base_indent(mut self, width: usize) -> Self {
        self.sql_base_indent = width;
        self
    }

    pub fn with_format_sql(mut self, format_sql: bool) -> Self {
        self.format_sql = format_sql;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// One nesting level of indentation.
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }

    pub fn sql_indent(&self) -> String {
        " ".repeat(self.sql_base_indent)
    }
}

/// Builder for [`FormatConfig`].
///
/// ```
/// use psl_fmt::FormatConfig;
///
/// let config = FormatConfig::builder().indent_width(2).sql_base_indent(4).build();
/// assert_eq!(config.sql_indent(), "    ");
/// assert_eq!(FormatConfig::builder().build(), FormatConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct FormatConfigBuilder {
    config: FormatConfig,
}

impl Default for FormatConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FormatConfig::default(),
        }
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.config.indent_width = width;
        self
    }

    pub fn sql_base_indent(mut self, width: usize) -> Self {
        self.config.sql_base_indent = width;
        self
    }

    pub fn format_sql(mut self, format_sql: bool) -> Self {
        self.config.format_sql = format_sql;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn build(self) -> FormatConfig {
        self.config
    }
}
