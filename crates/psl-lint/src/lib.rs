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

//! PSL Validation
//!
//! Structural checks for PSL pipeline configurations: balanced braces and
//! parentheses, consistent connections, required metadata, output blocks,
//! feature names and hierarchies.
//!
//! ## Quick Start
//!
//! ```rust
//! use psl_lint::validate;
//!
//! let result = validate("DATASET CLAIMS {\n  PRECISION = DAY\n}\n}\n").unwrap();
//! assert!(!result.is_valid());
//! for issue in result.errors() {
//!     eprintln!("{}", issue);
//! }
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use psl_lint::{validate_with_config, LintConfig};
//!
//! let mut config = LintConfig::default();
//! config.disable_rule("tql-csv");
//! config.set_rule_error("duplicate-cache");
//!
//! let result = validate_with_config("CACHE = a\nCACHE = a\n", config).unwrap();
//! assert!(result
//!     .errors()
//!     .iter()
//!     .any(|issue| issue.message().starts_with("Duplicate cache name")));
//! ```
//!
//! ## Custom Rules
//!
//! ```rust
//! use psl_lint::{Category, LintConfig, LintDocument, LintRule, LintRunner, ValidationIssue};
//!
//! struct NoTabs;
//!
//! impl LintRule for NoTabs {
//!     fn id(&self) -> &str { "no-tabs" }
//!     fn description(&self) -> &str { "No tab characters" }
//!     fn category(&self) -> Category { Category::BestPractice }
//!     fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
//!         doc.all()
//!             .numbered()
//!             .filter(|(_, line)| line.contains('\t'))
//!             .map(|(n, line)| {
//!                 ValidationIssue::warning(Category::BestPractice, "Tab found", self.id())
//!                     .with_line(n)
//!                     .with_snippet(line)
//!             })
//!             .collect()
//!     }
//! }
//!
//! let mut runner = LintRunner::new(LintConfig::default());
//! runner.add_rule(Box::new(NoTabs));
//! let result = runner.validate("A {\n\tB = 1\n}\n").unwrap();
//! assert!(result.warnings().iter().any(|w| w.message() == "Tab found"));
//! ```

mod diagnostic;
mod document;
mod result;
mod rules;
mod runner;

pub use diagnostic::{Category, Severity, ValidationIssue, NO_LINE};
pub use document::{LintDocument, Section, BLOCK_KEYWORDS};
pub use result::ValidationResult;
pub use rules::{
    default_rules, BracketBalanceRule, CommentedBlockRule, ConnectionSourceRule,
    DatasetMetadataRule, DuplicateCacheRule, FeatureNameMappingRule, HierarchyCompletenessRule,
    LintRule, ParenBalanceRule, RuleConfig, SortColumnRule, TqlCsvRule, HIERARCHY_FEATURES,
    NAMED_FEATURES, REQUIRED_DATASET_KEYS,
};
pub use runner::{LintConfig, LintRunner};

use psl_core::PslResult;

/// Run every rule with the default configuration.
///
/// # Errors
///
/// Fails only for input that breaks the default limits or holds
/// disallowed control characters.
pub fn validate(text: &str) -> PslResult<ValidationResult> {
    LintRunner::default().validate(text)
}

/// Run the rules with a custom configuration.
pub fn validate_with_config(text: &str, config: LintConfig) -> PslResult<ValidationResult> {
    LintRunner::new(config).validate(text)
}

fn check(rule: &dyn LintRule, text: &str) -> Vec<ValidationIssue> {
    rule.check(&LintDocument::new(text))
}

/// Unmatched `{` and `}`.
pub fn check_missing_brackets(text: &str) -> Vec<ValidationIssue> {
    check(&BracketBalanceRule, text)
}

/// Unbalanced parentheses per block.
pub fn check_missing_parentheses(text: &str) -> Vec<ValidationIssue> {
    check(&ParenBalanceRule, text)
}

pub fn check_duplicate_cache_names(text: &str) -> Vec<ValidationIssue> {
    check(&DuplicateCacheRule, text)
}

pub fn check_connection_sources(text: &str) -> Vec<ValidationIssue> {
    check(&ConnectionSourceRule, text)
}

pub fn check_sort_columns(text: &str) -> Vec<ValidationIssue> {
    check(&SortColumnRule, text)
}

pub fn check_commented_blocks(text: &str) -> Vec<ValidationIssue> {
    check(&CommentedBlockRule, text)
}

pub fn check_tql_csv_definitions(text: &str) -> Vec<ValidationIssue> {
    check(&TqlCsvRule, text)
}

pub fn check_feature_name_mappings(text: &str) -> Vec<ValidationIssue> {
    check(&FeatureNameMappingRule, text)
}

pub fn check_hierarchy_completeness(text: &str) -> Vec<ValidationIssue> {
    check(&HierarchyCompletenessRule, text)
}

/// Required DATASET keys, present and non-empty.
pub fn check_dataset_metadata(text: &str) -> Vec<ValidationIssue> {
    check(&DatasetMetadataRule, text)
}
