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

//! Format-sql command - standalone SQL layout

use super::{read_input, write_output};

/// Flatten and re-indent the SQL statement in `file` (`-` for stdin).
///
/// `indent` spaces are prepended to every indent level after the first line.
pub fn format_sql(file: &str, indent: usize, output: Option<&str>) -> Result<(), String> {
    let content = read_input(file)?;

    if content.trim().is_empty() {
        return Err(format!("No SQL found in '{}'", file));
    }

    let formatted = psl_fmt::format_sql(&content, &" ".repeat(indent));
    write_output(&format!("{}\n", formatted), output)
}
