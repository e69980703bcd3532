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

//! Validation issue types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line number used for issues that do not point at a single line.
pub const NO_LINE: i64 = -1;

/// Severity level for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// A rule ran and found nothing
    Pass,
    /// Should be fixed
    Warning,
    /// Must be fixed before the ETL runs
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What an issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Syntax,
    Logic,
    BestPractice,
    MissingDefinition,
    MissingMapping,
    MissingHierarchy,
    MissingField,
    MissingBlock,
    MissingValue,
    Cleanup,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX",
            Self::Logic => "LOGIC",
            Self::BestPractice => "BEST_PRACTICE",
            Self::MissingDefinition => "MISSING_DEFINITION",
            Self::MissingMapping => "MISSING_MAPPING",
            Self::MissingHierarchy => "MISSING_HIERARCHY",
            Self::MissingField => "MISSING_FIELD",
            Self::MissingBlock => "MISSING_BLOCK",
            Self::MissingValue => "MISSING_VALUE",
            Self::Cleanup => "CLEANUP",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    severity: Severity,
    category: Category,
    /// 1-based, or [`NO_LINE`]
    line_number: i64,
    message: String,
    suggestion: Option<String>,
    /// Trimmed offending line, empty when not line-addressable
    snippet: String,
    /// Rule ID that generated this issue
    #[serde(skip)]
    rule_id: String,
}

impl ValidationIssue {
    fn new(
        severity: Severity,
        category: Category,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            line_number: NO_LINE,
            message: message.into(),
            suggestion: None,
            snippet: String::new(),
            rule_id: rule_id.into(),
        }
    }

    pub fn error(category: Category, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message, rule_id)
    }

    pub fn warning(
        category: Category,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, category, message, rule_id)
    }

    pub fn pass(category: Category, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Pass, category, message, rule_id)
    }

    /// Attach a 1-based line number.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line_number = i64::try_from(line).unwrap_or(NO_LINE);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the offending line; it is stored trimmed.
    pub fn with_snippet(mut self, line: &str) -> Self {
        self.snippet = line.trim().to_string();
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn line_number(&self) -> i64 {
        self.line_number
    }

    /// The line number, when the issue points at one.
    pub fn line(&self) -> Option<usize> {
        usize::try_from(self.line_number).ok()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Escalate a warning to error level (used by the runner).
    pub fn escalate_to_error(&mut self) {
        if self.severity == Severity::Warning {
            self.severity = Severity::Error;
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line() {
            write!(f, "line {}: ", line)?;
        }

        write!(f, "[{}] {}: {}", self.category, self.severity, self.message)?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Severity tests ====================

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Pass < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Pass.to_string(), "pass");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn test_severity_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(serde_json::to_string(&Severity::Pass).unwrap(), "\"PASS\"");
    }

    // ==================== Category tests ====================

    #[test]
    fn test_category_serializes_upper_snake() {
        assert_eq!(
            serde_json::to_string(&Category::BestPractice).unwrap(),
            "\"BEST_PRACTICE\""
        );
        assert_eq!(
            serde_json::to_string(&Category::MissingHierarchy).unwrap(),
            "\"MISSING_HIERARCHY\""
        );
    }

    #[test]
    fn test_category_display_matches_serde() {
        let all = [
            Category::Syntax,
            Category::Logic,
            Category::BestPractice,
            Category::MissingDefinition,
            Category::MissingMapping,
            Category::MissingHierarchy,
            Category::MissingField,
            Category::MissingBlock,
            Category::MissingValue,
            Category::Cleanup,
        ];
        for category in all {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }

    // ==================== ValidationIssue tests ====================

    #[test]
    fn test_issue_defaults() {
        let issue = ValidationIssue::warning(Category::Logic, "msg", "rule");
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.line_number(), NO_LINE);
        assert_eq!(issue.line(), None);
        assert!(issue.suggestion().is_none());
        assert_eq!(issue.snippet(), "");
        assert_eq!(issue.rule_id(), "rule");
    }

    #[test]
    fn test_issue_builders() {
        let issue = ValidationIssue::error(Category::Syntax, "Broken", "bracket-balance")
            .with_line(12)
            .with_suggestion("Fix it")
            .with_snippet("   }   ");
        assert_eq!(issue.line(), Some(12));
        assert_eq!(issue.suggestion(), Some("Fix it"));
        assert_eq!(issue.snippet(), "}");
    }

    #[test]
    fn test_escalate_only_touches_warnings() {
        let mut warning = ValidationIssue::warning(Category::Logic, "w", "r");
        warning.escalate_to_error();
        assert_eq!(warning.severity(), Severity::Error);

        let mut pass = ValidationIssue::pass(Category::Logic, "p", "r");
        pass.escalate_to_error();
        assert_eq!(pass.severity(), Severity::Pass);
    }

    #[test]
    fn test_display() {
        let issue = ValidationIssue::error(Category::Syntax, "Unbalanced", "r")
            .with_line(3)
            .with_suggestion("Balance it");
        assert_eq!(
            issue.to_string(),
            "line 3: [SYNTAX] error: Unbalanced (Balance it)"
        );
        let issue = ValidationIssue::warning(Category::MissingBlock, "No CSV", "r");
        assert_eq!(issue.to_string(), "[MISSING_BLOCK] warning: No CSV");
    }

    #[test]
    fn test_json_shape() {
        let issue = ValidationIssue::warning(Category::Cleanup, "Commented code", "r")
            .with_line(4)
            .with_snippet("# QUERY X FROM Y {");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "WARNING");
        assert_eq!(json["category"], "CLEANUP");
        assert_eq!(json["lineNumber"], 4);
        assert_eq!(json["message"], "Commented code");
        assert!(json["suggestion"].is_null());
        assert_eq!(json["snippet"], "# QUERY X FROM Y {");
        assert!(json.get("ruleId").is_none());
    }
}
