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

//! Batch processing for many PSL files.
//!
//! Small batches run serially; once a batch reaches
//! [`BatchConfig::parallel_threshold`] files it is spread over the `rayon`
//! thread pool. Every file is processed even when earlier ones fail, and
//! failures are collected into [`BatchResults`] for reporting.
//!
//! ```rust,no_run
//! use psl_cli::batch::{BatchConfig, BatchProcessor, ValidationOperation};
//! use std::path::PathBuf;
//!
//! let processor = BatchProcessor::new(BatchConfig::default());
//! let files = vec![PathBuf::from("claims.psl"), PathBuf::from("labs.psl")];
//! let results = processor.process(&files, ValidationOperation::default(), true);
//!
//! println!("{} of {} files passed", results.success_count(), results.total_files());
//! ```

use crate::commands::read_path;
use crate::error::CliError;
use colored::Colorize;
use psl_lint::{validate_with_config, LintConfig, ValidationResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Minimum number of files before processing goes parallel.
    /// Default: 10
    pub parallel_threshold: usize,

    /// Upper bound on worker threads; `None` keeps the rayon default.
    pub max_threads: Option<usize>,

    /// Print progress every N files. 0 disables progress lines.
    pub progress_interval: usize,

    /// Show one line per file instead of aggregate progress.
    pub verbose: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 10,
            max_threads: None,
            progress_interval: 1,
            verbose: false,
        }
    }
}

/// Outcome for a single file.
#[derive(Debug, Clone)]
pub struct FileResult<T> {
    pub path: PathBuf,
    pub result: Result<T, CliError>,
}

impl<T> FileResult<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Aggregated outcome of a batch run, in input order.
#[derive(Debug, Clone)]
pub struct BatchResults<T> {
    pub results: Vec<FileResult<T>>,
    pub elapsed_ms: u128,
}

impl<T> BatchResults<T> {
    pub fn total_files(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult<T>> {
        self.results.iter().filter(|r| r.is_failure())
    }
}

/// A per-file operation that can run on the batch thread pool.
pub trait BatchOperation: Send + Sync {
    type Output: Send;

    fn process_file(&self, path: &Path) -> Result<Self::Output, CliError>;

    /// Name shown in the batch summary.
    fn name(&self) -> &str;
}

struct ProgressTracker {
    total: usize,
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    interval: usize,
    verbose: bool,
    start_time: Instant,
}

impl ProgressTracker {
    fn new(total: usize, interval: usize, verbose: bool) -> Self {
        Self {
            total,
            processed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            interval,
            verbose,
            start_time: Instant::now(),
        }
    }

    fn record<T>(&self, path: &Path, result: &Result<T, CliError>) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        match result {
            Ok(_) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if self.verbose {
                    eprintln!("{} {} - {}", "✗".red().bold(), path.display(), e);
                }
            }
        }

        if self.interval > 0 && (processed % self.interval == 0 || processed == self.total) {
            self.report_progress(path, result.is_ok());
        }
    }

    fn report_progress(&self, current_file: &Path, success: bool) {
        let processed = self.processed.load(Ordering::Relaxed);
        let rate = processed as f64 / self.start_time.elapsed().as_secs_f64().max(f64::EPSILON);

        if self.verbose {
            let status = if success {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            eprintln!(
                "{} [{}/{}] {} ({:.1} files/s)",
                status,
                processed,
                self.total,
                current_file.display(),
                rate
            );
        } else {
            eprintln!(
                "Progress: [{}/{}] {} succeeded, {} failed ({:.1} files/s)",
                processed,
                self.total,
                self.succeeded.load(Ordering::Relaxed),
                self.failed.load(Ordering::Relaxed),
                rate
            );
        }
    }

    fn print_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed();

        println!();
        println!("{}", "═".repeat(60).bright_blue());
        println!(
            "{} {}",
            "Batch Operation:".bright_blue().bold(),
            operation_name.bright_white()
        );
        println!("{}", "═".repeat(60).bright_blue());
        println!(
            "  {} {}",
            "Total files:".bright_cyan(),
            self.processed.load(Ordering::Relaxed)
        );
        println!(
            "  {} {}",
            "Succeeded:".green().bold(),
            self.succeeded.load(Ordering::Relaxed)
        );
        println!(
            "  {} {}",
            "Failed:".red().bold(),
            self.failed.load(Ordering::Relaxed)
        );
        println!("  {} {:.2}s", "Elapsed:".bright_cyan(), elapsed.as_secs_f64());
        println!("{}", "═".repeat(60).bright_blue());
    }
}

/// Runs a [`BatchOperation`] over a list of files.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every file. Results keep the order of `files`.
    pub fn process<O>(&self, files: &[PathBuf], operation: O, show_progress: bool) -> BatchResults<O::Output>
    where
        O: BatchOperation,
    {
        let start_time = Instant::now();

        if files.is_empty() {
            return BatchResults {
                results: Vec::new(),
                elapsed_ms: 0,
            };
        }

        if let Some(max_threads) = self.config.max_threads {
            // Fails harmlessly when the global pool already exists.
            rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build_global()
                .ok();
        }

        let tracker = show_progress.then(|| {
            ProgressTracker::new(files.len(), self.config.progress_interval, self.config.verbose)
        });

        let run = |path: &PathBuf| {
            let result = operation.process_file(path);
            if let Some(t) = &tracker {
                t.record(path, &result);
            }
            FileResult {
                path: path.clone(),
                result,
            }
        };

        let results: Vec<FileResult<O::Output>> = if files.len() < self.config.parallel_threshold {
            tracing::debug!(files = files.len(), "processing batch serially");
            files.iter().map(run).collect()
        } else {
            tracing::debug!(files = files.len(), "processing batch in parallel");
            files.par_iter().map(run).collect()
        };

        if let Some(t) = &tracker {
            t.print_summary(operation.name());
        }

        BatchResults {
            results,
            elapsed_ms: start_time.elapsed().as_millis(),
        }
    }
}

// ============================================================================
// Standard Operations
// ============================================================================

/// Runs the structural validator on each file.
///
/// A file fails when the validator reports errors, or warnings when
/// `warn_error` is set.
#[derive(Debug, Clone, Default)]
pub struct ValidationOperation {
    pub warn_error: bool,
}

impl BatchOperation for ValidationOperation {
    type Output = ValidationResult;

    fn process_file(&self, path: &Path) -> Result<Self::Output, CliError> {
        let content = read_path(path)?;
        let result = validate_with_config(&content, LintConfig::default())?;

        let errors = result.errors().len();
        let warnings = result.warnings().len();
        if errors > 0 || (self.warn_error && warnings > 0) {
            return Err(CliError::ValidationFailed { errors, warnings });
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "validate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct LengthOperation;

    impl BatchOperation for LengthOperation {
        type Output = usize;

        fn process_file(&self, path: &Path) -> Result<usize, CliError> {
            fs::read_to_string(path)
                .map(|s| s.len())
                .map_err(|e| CliError::io_error(path, e))
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    fn write_files(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("file{}.psl", i));
                fs::write(&path, "x".repeat(i)).unwrap();
                path
            })
            .collect()
    }

    // ==================== BatchConfig tests ====================

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.parallel_threshold, 10);
        assert_eq!(config.max_threads, None);
        assert_eq!(config.progress_interval, 1);
        assert!(!config.verbose);
    }

    // ==================== BatchProcessor tests ====================

    #[test]
    fn test_empty_batch() {
        let processor = BatchProcessor::new(BatchConfig::default());
        let results = processor.process(&[], LengthOperation, false);
        assert_eq!(results.total_files(), 0);
        assert!(!results.has_failures());
    }

    #[test]
    fn test_serial_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), 3);
        let processor = BatchProcessor::new(BatchConfig::default());

        let results = processor.process(&files, LengthOperation, false);
        let lengths: Vec<usize> = results
            .results
            .iter()
            .map(|r| *r.result.as_ref().unwrap())
            .collect();
        assert_eq!(lengths, vec![0, 1, 2]);
    }

    #[test]
    fn test_parallel_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), 25);
        let processor = BatchProcessor::new(BatchConfig {
            parallel_threshold: 1,
            ..Default::default()
        });

        let results = processor.process(&files, LengthOperation, false);
        assert_eq!(results.success_count(), 25);
        for (i, r) in results.results.iter().enumerate() {
            assert_eq!(r.path, files[i]);
            assert_eq!(*r.result.as_ref().unwrap(), i);
        }
    }

    #[test]
    fn test_failures_do_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_files(dir.path(), 2);
        files.insert(1, dir.path().join("missing.psl"));
        let processor = BatchProcessor::new(BatchConfig::default());

        let results = processor.process(&files, LengthOperation, false);
        assert_eq!(results.total_files(), 3);
        assert_eq!(results.failure_count(), 1);
        let failed: Vec<_> = results.failures().map(|f| f.path.clone()).collect();
        assert_eq!(failed, vec![dir.path().join("missing.psl")]);
    }

    // ==================== ValidationOperation tests ====================

    #[test]
    fn test_validation_operation_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.psl");
        fs::write(&path, "CONNECTION A FROM ROOT {\n    SORT COLUMN = id\n").unwrap();

        let err = ValidationOperation::default().process_file(&path).unwrap_err();
        assert!(matches!(err, CliError::ValidationFailed { errors, .. } if errors > 0));
    }

    #[test]
    fn test_validation_operation_missing_file() {
        let err = ValidationOperation::default()
            .process_file(Path::new("/nonexistent/claims.psl"))
            .unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
