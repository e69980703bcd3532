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

//! Validation result

use crate::diagnostic::{Severity, ValidationIssue};
use serde::{Deserialize, Serialize};

/// Outcome of one validation run.
///
/// Errors and warnings keep the order the rules produced them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    passes: Vec<ValidationIssue>,
    total_issues: usize,
    summary: String,
}

impl ValidationResult {
    /// Partition `issues` by severity and derive the count and summary.
    pub fn from_issues<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        let mut result = Self::default();
        for issue in issues {
            match issue.severity() {
                Severity::Error => result.errors.push(issue),
                Severity::Warning => result.warnings.push(issue),
                Severity::Pass => result.passes.push(issue),
            }
        }
        result.total_issues = result.errors.len() + result.warnings.len();
        result.summary = summarize(result.errors.len(), result.warnings.len());
        result
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn passes(&self) -> &[ValidationIssue] {
        &self.passes
    }

    pub fn total_issues(&self) -> usize {
        self.total_issues
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// No errors. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.total_issues == 0
    }

    /// Errors followed by warnings.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

fn summarize(errors: usize, warnings: usize) -> String {
    match (errors, warnings) {
        (0, 0) => "✅ No issues found! Config looks good.".to_string(),
        (0, w) => format!("⚠️ Found {} warning(s). Config is valid but could be improved.", w),
        (e, w) => format!(
            "❌ Found {} error(s) and {} warning(s). Fix errors before running ETL.",
            e, w
        ),
    }
}
