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

//! Validation rules
//!
//! Rules run in a fixed order; see [`default_rules`].

mod connections;
mod dataset;
mod definitions;
mod syntax;

pub use connections::{ConnectionSourceRule, DuplicateCacheRule, SortColumnRule};
pub use dataset::{DatasetMetadataRule, REQUIRED_DATASET_KEYS};
pub use definitions::{
    FeatureNameMappingRule, HierarchyCompletenessRule, TqlCsvRule, HIERARCHY_FEATURES,
    NAMED_FEATURES,
};
pub use syntax::{BracketBalanceRule, CommentedBlockRule, ParenBalanceRule};

use crate::diagnostic::{Category, ValidationIssue};
use crate::document::LintDocument;

/// Configuration for a single rule
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Whether the rule is enabled
    pub enabled: bool,
    /// Whether to treat warnings as errors
    pub error: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            error: false,
        }
    }
}

/// Trait for validation rules
pub trait LintRule: Send + Sync {
    /// Rule identifier
    fn id(&self) -> &str;

    /// Rule description, also used as the PASS message
    fn description(&self) -> &str;

    /// Category reported when the rule passes
    fn category(&self) -> Category;

    /// Run the rule on a document
    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue>;
}

/// The built-in rule battery, in execution order.
pub fn default_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(BracketBalanceRule),
        Box::new(ParenBalanceRule),
        Box::new(DuplicateCacheRule),
        Box::new(ConnectionSourceRule),
        Box::new(SortColumnRule),
        Box::new(CommentedBlockRule),
        Box::new(TqlCsvRule),
        Box::new(FeatureNameMappingRule),
        Box::new(HierarchyCompletenessRule),
        Box::new(DatasetMetadataRule),
    ]
}
