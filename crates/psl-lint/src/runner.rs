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

//! Validation runner

use crate::diagnostic::{Category, Severity, ValidationIssue};
use crate::document::LintDocument;
use crate::result::ValidationResult;
use crate::rules::{default_rules, LintRule, RuleConfig};
use psl_core::{preprocess, Limits, PslResult};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Maximum number of errors and warnings collected by one run.
///
/// Keeps a pathological document from producing an unbounded report.
const MAX_DIAGNOSTICS: usize = 10_000;

/// Configuration for the validation runner
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Rule configurations by rule ID
    pub rules: HashMap<String, RuleConfig>,
    /// Minimum severity to report
    pub min_severity: Severity,
    /// Maximum number of errors and warnings to collect (default: 10,000)
    pub max_diagnostics: usize,
    /// Input limits applied before any rule runs
    pub limits: Limits,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            min_severity: Severity::Warning,
            max_diagnostics: MAX_DIAGNOSTICS,
            limits: Limits::default(),
        }
    }
}

impl LintConfig {
    /// Validate configuration (checks rule ID lengths and limits).
    pub fn validate(&self) -> Result<(), String> {
        const MAX_RULE_ID_LENGTH: usize = 100;
        const MAX_RULES: usize = 1000;

        if self.rules.len() > MAX_RULES {
            return Err(format!(
                "Too many rule configurations: {} (max: {})",
                self.rules.len(),
                MAX_RULES
            ));
        }

        for id in self.rules.keys() {
            if id.is_empty() {
                return Err("Empty rule ID not allowed".to_string());
            }
            if id.len() > MAX_RULE_ID_LENGTH {
                return Err(format!(
                    "Rule ID too long: {} bytes (max: {})",
                    id.len(),
                    MAX_RULE_ID_LENGTH
                ));
            }
        }

        Ok(())
    }

    /// Disable a specific rule
    pub fn disable_rule(&mut self, rule_id: &str) {
        self.rules.insert(
            rule_id.to_string(),
            RuleConfig {
                enabled: false,
                error: false,
            },
        );
    }

    /// Enable a specific rule
    pub fn enable_rule(&mut self, rule_id: &str) {
        self.rules.insert(rule_id.to_string(), RuleConfig::default());
    }

    /// Report a rule's warnings as errors
    pub fn set_rule_error(&mut self, rule_id: &str) {
        self.rules.insert(
            rule_id.to_string(),
            RuleConfig {
                enabled: true,
                error: true,
            },
        );
    }
}

/// Validation runner
pub struct LintRunner {
    config: LintConfig,
    rules: Vec<Box<dyn LintRule>>,
}

impl Default for LintRunner {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

impl LintRunner {
    /// Create a new runner with the default rule battery
    pub fn new(config: LintConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
        }
    }

    /// Create a runner with custom rules
    pub fn with_rules(config: LintConfig, rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { config, rules }
    }

    /// Add a custom rule; it runs after the existing ones
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// IDs of the configured rules, in execution order
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Preprocess `text` under the configured limits and run every
    /// enabled rule on it.
    ///
    /// # Errors
    ///
    /// Fails only when the input breaks the limits or holds disallowed
    /// control characters. Findings are never errors.
    pub fn validate(&self, text: &str) -> PslResult<ValidationResult> {
        let text = preprocess(text, &self.config.limits)?;
        Ok(self.run(&LintDocument::new(&text)))
    }

    /// Run all enabled rules in order.
    ///
    /// A rule that panics is logged and skipped; the remaining rules
    /// still run. A rule that reports nothing contributes one PASS entry.
    pub fn run(&self, doc: &LintDocument<'_>) -> ValidationResult {
        let mut reported: Vec<ValidationIssue> = Vec::new();
        let mut passes = Vec::new();
        let mut limit_exceeded = false;

        for rule in &self.rules {
            let rule_id = rule.id();
            let rule_config = self.config.rules.get(rule_id).cloned().unwrap_or_default();
            if !rule_config.enabled {
                tracing::trace!(rule = rule_id, "rule disabled");
                continue;
            }

            let mut issues = match catch_unwind(AssertUnwindSafe(|| rule.check(doc))) {
                Ok(issues) => issues,
                Err(_) => {
                    tracing::warn!(rule = rule_id, "validation rule panicked; its output is skipped");
                    continue;
                }
            };
            tracing::trace!(rule = rule_id, issues = issues.len(), "rule finished");

            if issues.is_empty() {
                passes.push(ValidationIssue::pass(rule.category(), rule.description(), rule_id));
                continue;
            }

            if rule_config.error {
                issues.iter_mut().for_each(ValidationIssue::escalate_to_error);
            }

            for issue in issues
                .into_iter()
                .filter(|i| i.severity() >= self.config.min_severity)
            {
                if reported.len() >= self.config.max_diagnostics {
                    limit_exceeded = true;
                    break;
                }
                reported.push(issue);
            }
            if limit_exceeded {
                break;
            }
        }

        if limit_exceeded {
            reported.push(ValidationIssue::warning(
                Category::Logic,
                format!(
                    "Issue limit of {} exceeded. Further issues have been suppressed.",
                    self.config.max_diagnostics
                ),
                "lint-runner",
            ));
        }

        let result = ValidationResult::from_issues(reported.into_iter().chain(passes));
        tracing::debug!(
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            passes = result.passes().len(),
            "validation finished"
        );
        result
    }
}
