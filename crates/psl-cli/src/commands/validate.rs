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

//! Validate command - PSL structural validation

use super::read_file;
use colored::Colorize;
use psl_lint::{validate as run_validator, Severity, ValidationResult};

/// Validate a PSL file and report every issue found.
///
/// # Arguments
///
/// * `file` - Path to the PSL file
/// * `format` - `"text"` for colored terminal output, `"json"` for the
///   serialized [`ValidationResult`]
/// * `warn_error` - Fail on warnings as well as errors
///
/// # Errors
///
/// Returns `Err` if the file cannot be read, is rejected by the input
/// limits, or the validator reports errors (warnings too with `warn_error`).
pub fn validate(file: &str, format: &str, warn_error: bool) -> Result<(), String> {
    let content = read_file(file)?;
    let result = run_validator(&content).map_err(|e| format!("Parse error: {}", e))?;

    match format {
        "json" => {
            let output = serde_json::to_string_pretty(&result)
                .map_err(|e| format!("JSON serialization error: {}", e))?;
            println!("{}", output);
        }
        "text" => print_text(file, &result),
        other => {
            return Err(format!(
                "Unsupported output format: '{}'. Supported formats: text, json",
                other
            ))
        }
    }

    if !result.is_valid() || (warn_error && !result.warnings().is_empty()) {
        Err("Validation errors found".to_string())
    } else {
        Ok(())
    }
}

fn print_text(file: &str, result: &ValidationResult) {
    if result.is_clean() {
        println!("{} {} - {}", "✓".green().bold(), file, result.summary());
        return;
    }

    let marker = if result.is_valid() {
        "!".yellow().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "{} {} - {} issue(s) found:",
        marker,
        file,
        result.total_issues()
    );

    for issue in result.errors().iter().chain(result.warnings()) {
        let severity = match issue.severity() {
            Severity::Error => "error".red(),
            Severity::Warning => "warning".yellow(),
            Severity::Pass => "pass".green(),
        };

        match issue.line() {
            Some(line) => println!(
                "  {}:{}: {} [{}]: {}",
                file,
                line,
                severity,
                issue.category(),
                issue.message()
            ),
            None => println!(
                "  {}: {} [{}]: {}",
                file,
                severity,
                issue.category(),
                issue.message()
            ),
        }

        if let Some(suggestion) = issue.suggestion() {
            println!("    {} {}", "suggestion:".cyan(), suggestion);
        }
    }

    println!();
    println!("{}", result.summary());
}
