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

//! Format command - PSL config layout

use super::{read_file, write_output};
use psl_fmt::format_config;

/// Rewrite a PSL file in canonical layout.
///
/// With `check`, nothing is written; the command fails when the file is not
/// already formatted.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read, is rejected by the input
/// limits, the output cannot be written, or (in check mode) the file would
/// change.
pub fn format(file: &str, output: Option<&str>, check: bool) -> Result<(), String> {
    let content = read_file(file)?;

    let formatted = format_config(&content).map_err(|e| format!("Parse error: {}", e))?;

    if check {
        let normalized_original = content.replace("\r\n", "\n");
        if formatted.trim() != normalized_original.trim() {
            return Err("File is not formatted".to_string());
        }
        println!("File is formatted");
        Ok(())
    } else {
        write_output(&format!("{}\n", formatted), output)
    }
}
