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

//! DATASET metadata completeness.

use super::LintRule;
use crate::diagnostic::{Category, ValidationIssue};
use crate::document::LintDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static DATASET_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*DATASET\s+(\w+)\s*\{").expect("valid regex"));
static KEY_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\w+)\s*=(.*)$").expect("valid regex"));

/// Keys every DATASET block must set.
pub const REQUIRED_DATASET_KEYS: [&str; 15] = [
    "PRECISION",
    "COMPRESSION",
    "STATISTICS",
    "DATA_PROVIDER_CODE",
    "DATA_SOURCE_CODE",
    "DATASET_VERSION",
    "DATASET_EFFECTIVE_DATE",
    "DATASET_DESCRIPTION_JSON",
    "DATASET_STATISTICS_JSON",
    "FUTURE_CUTOFF",
    "SOURCE_RX_CLAIMS",
    "SOURCE_MEDICAL_CLAIMS",
    "SOURCE_OMOP",
    "SOURCE_EHR",
    "GEOGRAPHIC_ENTITY_TYPE",
];

/// Rule: the DATASET block carries all required metadata
pub struct DatasetMetadataRule;

impl LintRule for DatasetMetadataRule {
    fn id(&self) -> &str {
        "dataset-metadata"
    }
    fn description(&self) -> &str {
        "DATASET block has all required metadata"
    }
    fn category(&self) -> Category {
        Category::MissingField
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let all = doc.all();
        let Some(start) = all.lines().iter().position(|l| DATASET_HEADER.is_match(l)) else {
            return vec![ValidationIssue::error(
                Category::MissingBlock,
                "No DATASET block found",
                self.id(),
            )
            .with_suggestion("Add a 'DATASET NAME { ... }' block with the required metadata fields")];
        };
        let header = all.lines()[start];
        let header_line = all.line_number(start);

        let mut issues = Vec::new();
        let mut present = HashSet::new();
        for (line_no, line) in all.block(start).code() {
            let Some(caps) = KEY_VALUE.captures(line) else {
                continue;
            };
            let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let key = key.as_str();
            if !REQUIRED_DATASET_KEYS.contains(&key) || !present.insert(key) {
                continue;
            }
            if is_empty_value(value.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        Category::MissingValue,
                        format!("DATASET field '{}' has no value", key),
                        self.id(),
                    )
                    .with_line(line_no)
                    .with_suggestion(format!("Set a value for {}", key))
                    .with_snippet(line),
                );
            }
        }

        for key in REQUIRED_DATASET_KEYS {
            if present.contains(key) {
                continue;
            }
            issues.push(
                ValidationIssue::error(
                    Category::MissingField,
                    format!("DATASET is missing required field: {}", key),
                    self.id(),
                )
                .with_line(header_line)
                .with_suggestion(format!("Add '{} = ...' inside the DATASET block", key))
                .with_snippet(header),
            );
        }
        issues
    }
}

fn is_empty_value(value: &str) -> bool {
    let value = value.trim();
    let value = value.strip_suffix('}').unwrap_or(value).trim();
    value.is_empty() || value == "\"\"" || value == "''"
}
