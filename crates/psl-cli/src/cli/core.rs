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

//! Single-file commands.

use crate::commands;
use clap::Subcommand;

/// Commands that operate on one PSL file.
#[derive(Subcommand)]
pub enum CoreCommands {
    /// Validate a PSL file
    ///
    /// Runs every structural rule (brackets, parentheses, cache names,
    /// connection sources, sort columns, commented-out code, TQL/CSV
    /// definitions, feature names, hierarchies, DATASET metadata).
    Validate {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(short = 'W', long)]
        warn_error: bool,
    },

    /// Format a PSL file
    ///
    /// Normalizes spacing and indentation, and re-flows embedded SQL
    /// queries. VARIABLE blocks and the hierarchy section are kept as is.
    Format {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Check only (exit 1 if the file would change)
        #[arg(short, long)]
        check: bool,
    },

    /// Format a bare SQL statement
    ///
    /// Joins the statement onto one line, then lays it out one clause per
    /// line with nested subqueries indented.
    FormatSql {
        /// Input file path, or - for stdin
        #[arg(value_name = "FILE")]
        file: String,

        /// Spaces added to every indent level
        #[arg(long, default_value_t = 0)]
        indent: usize,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the feature lineage report
    ///
    /// Shows, for every schema and connection, where each feature's value
    /// comes from, followed by vocabulary and hierarchy sources.
    Lineage {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show what the parser extracted from a PSL file
    Inspect {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,
    },
}

impl CoreCommands {
    pub fn execute(self) -> Result<(), String> {
        match self {
            CoreCommands::Validate {
                file,
                format,
                warn_error,
            } => commands::validate(&file, &format, warn_error),
            CoreCommands::Format {
                file,
                output,
                check,
            } => commands::format(&file, output.as_deref(), check),
            CoreCommands::FormatSql {
                file,
                indent,
                output,
            } => commands::format_sql(&file, indent, output.as_deref()),
            CoreCommands::Lineage { file, output } => commands::lineage(&file, output.as_deref()),
            CoreCommands::Inspect { file } => commands::inspect(&file),
        }
    }
}
