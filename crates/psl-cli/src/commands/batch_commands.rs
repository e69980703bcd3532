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

//! Batch command implementations

use crate::batch::{BatchConfig, BatchProcessor, ValidationOperation};
use colored::Colorize;
use std::path::PathBuf;

/// Validate many PSL files, reporting every failure at the end.
///
/// Files are processed in parallel when `parallel` is set or the batch
/// reaches the default parallel threshold.
///
/// # Errors
///
/// Returns `Err` with a count when at least one file failed to read or
/// failed validation.
pub fn batch_validate(
    files: Vec<String>,
    warn_error: bool,
    parallel: bool,
    verbose: bool,
) -> Result<(), String> {
    if files.is_empty() {
        return Err("No input files given".to_string());
    }

    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();

    let mut config = BatchConfig {
        verbose,
        ..Default::default()
    };
    if parallel {
        config.parallel_threshold = 1;
    }

    let processor = BatchProcessor::new(config);
    let results = processor.process(&paths, ValidationOperation { warn_error }, true);

    if results.has_failures() {
        eprintln!();
        eprintln!("{}", "Validation failures:".red().bold());
        for failure in results.failures() {
            eprintln!("  {} {}", "✗".red(), failure.path.display());
            if let Err(e) = &failure.result {
                eprintln!("    {}", e.to_string().dimmed());
            }
        }
        return Err(format!(
            "{} of {} files failed validation",
            results.failure_count(),
            results.total_files()
        ));
    }

    Ok(())
}
