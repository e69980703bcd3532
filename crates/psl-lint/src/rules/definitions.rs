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

//! Rules about what must be defined: TQL/CSV outputs, feature names and
//! feature hierarchies.

use super::LintRule;
use crate::diagnostic::{Category, ValidationIssue};
use crate::document::{starts_with_keyword, LintDocument, Section};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TQL_UTILIZATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTQL\s+UTILIZATION\s*\{").expect("valid regex"));
static TQL_DATASET_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTQL\s+DATASET_DATE\s*\{").expect("valid regex"));
static CSV_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bCSV\s+\w+\s*\{").expect("valid regex"));

static FEATURE_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*FEATURE\s+(\w+)\s*,").expect("valid regex"));
static NAME_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\.NAME\s*=").expect("valid regex"));
static SOURCE_FEATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"SOURCE\.FEATURE\s*=\s*"?(\w+)"?"#).expect("valid regex"));
static TARGET_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"TARGET\.NAME\s*=").expect("valid regex"));
static CHILD_FEATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"CHILD\.FEATURE\s*=\s*"?(\w+)"?"#).expect("valid regex"));
static PARENT_FEATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"PARENT\.FEATURE\s*=\s*"?(\w+)"?"#).expect("valid regex"));

/// Features whose codes need a human-readable NAME.
pub const NAMED_FEATURES: [&str; 7] = ["ICD9", "ICD10", "ICD10PCS", "CPT", "LOINC", "RX", "NDC"];

/// Features that need hierarchies below the marker.
pub const HIERARCHY_FEATURES: [&str; 6] = ["ICD9", "ICD10", "ICD10PCS", "RX", "ATC", "VISIT_TYPE"];

/// A FEATURE definition: line number, line, feature name.
type Definition<'d> = (usize, &'d str, &'d str);

/// First definition of every feature in `wanted`, in document order.
fn defined_features<'d>(section: Section<'d>, wanted: &[&str]) -> Vec<Definition<'d>> {
    let mut seen = HashSet::new();
    section
        .code()
        .filter_map(|(line_no, line)| {
            let name = FEATURE_DEF.captures(line)?.get(1)?.as_str();
            (wanted.contains(&name) && seen.insert(name)).then_some((line_no, line, name))
        })
        .collect()
}

/// Indices of the lines of `section` whose first word is `keyword`.
fn headers<'d>(section: &Section<'d>, keyword: &'d str) -> impl Iterator<Item = usize> + 'd {
    section
        .lines()
        .iter()
        .enumerate()
        .filter(move |(_, line)| starts_with_keyword(line, keyword))
        .map(|(i, _)| i)
}

/// First capture of `re` among the code lines of `block`.
fn first_capture<'d>(block: &Section<'d>, re: &Regex) -> Option<&'d str> {
    block
        .code()
        .find_map(|(_, line)| re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// Rule: the output section defines its TQL and CSV blocks
pub struct TqlCsvRule;

impl LintRule for TqlCsvRule {
    fn id(&self) -> &str {
        "tql-csv"
    }
    fn description(&self) -> &str {
        "TQL and CSV output definitions are present"
    }
    fn category(&self) -> Category {
        Category::MissingBlock
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let below = doc.below();
        let scan = !below.is_blank();
        let has = |re: &Regex| scan && below.code().any(|(_, line)| re.is_match(line));

        let mut issues = Vec::new();
        if !has(&TQL_UTILIZATION) {
            issues.push(
                ValidationIssue::warning(
                    Category::MissingBlock,
                    "Missing TQL UTILIZATION block after the hierarchy section marker",
                    self.id(),
                )
                .with_suggestion("Add 'TQL UTILIZATION { ... }' below the hierarchy marker"),
            );
        }
        if !has(&TQL_DATASET_DATE) {
            issues.push(
                ValidationIssue::error(
                    Category::MissingBlock,
                    "Missing TQL DATASET_DATE block after the hierarchy section marker",
                    self.id(),
                )
                .with_suggestion("Add 'TQL DATASET_DATE { ... }' below the hierarchy marker"),
            );
        }
        if !has(&CSV_BLOCK) {
            issues.push(
                ValidationIssue::warning(
                    Category::MissingBlock,
                    "No CSV block defined after the hierarchy section marker",
                    self.id(),
                )
                .with_suggestion("Add at least one 'CSV name { ... }' block below the hierarchy marker"),
            );
        }
        issues
    }
}

/// Rule: coded features also map a NAME
pub struct FeatureNameMappingRule;

impl LintRule for FeatureNameMappingRule {
    fn id(&self) -> &str {
        "feature-name-mapping"
    }
    fn description(&self) -> &str {
        "Coded features have NAME mappings"
    }
    fn category(&self) -> Category {
        Category::MissingMapping
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let all = doc.all();
        let defined = defined_features(all, &NAMED_FEATURES);
        if defined.is_empty() {
            return Vec::new();
        }

        let mut named: HashSet<&str> = all
            .code()
            .filter_map(|(_, line)| NAME_ASSIGNMENT.captures(line)?.get(1).map(|m| m.as_str()))
            .collect();
        for start in headers(&all, "TRANSFORM") {
            let block = all.block(start);
            if block.code().any(|(_, line)| TARGET_NAME.is_match(line)) {
                named.extend(first_capture(&block, &SOURCE_FEATURE));
            }
        }

        defined
            .into_iter()
            .filter(|(_, _, name)| !named.contains(name))
            .map(|(line_no, line, name)| {
                ValidationIssue::warning(
                    Category::MissingMapping,
                    format!("Feature '{}' has no NAME mapping", name),
                    self.id(),
                )
                .with_line(line_no)
                .with_suggestion(format!(
                    "Map {0}.NAME in a QUERY block, or add a TRANSFORM with SOURCE.FEATURE = \"{0}\" and TARGET.NAME",
                    name
                ))
                .with_snippet(line)
            })
            .collect()
    }
}

/// Rule: hierarchical features have their hierarchy edges
pub struct HierarchyCompletenessRule;

impl LintRule for HierarchyCompletenessRule {
    fn id(&self) -> &str {
        "hierarchy-completeness"
    }
    fn description(&self) -> &str {
        "Hierarchical features have their hierarchies"
    }
    fn category(&self) -> Category {
        Category::MissingHierarchy
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let defined = defined_features(doc.all(), &HIERARCHY_FEATURES);
        if defined.is_empty() {
            return Vec::new();
        }

        let below = doc.below();
        let edges: HashSet<(&str, &str)> = headers(&below, "HIERARCHY")
            .filter_map(|start| {
                let block = below.block(start);
                Some((
                    first_capture(&block, &CHILD_FEATURE)?,
                    first_capture(&block, &PARENT_FEATURE)?,
                ))
            })
            .collect();
        let atc_defined = defined.iter().any(|(_, _, name)| *name == "ATC");

        let mut issues = Vec::new();
        for &(line_no, line, name) in &defined {
            for (child, parent) in required_edges(name, atc_defined) {
                if edges.contains(&(child, parent)) {
                    continue;
                }
                issues.push(
                    ValidationIssue::warning(
                        Category::MissingHierarchy,
                        format!("Feature '{}' is missing the {} to {} hierarchy", name, child, parent),
                        self.id(),
                    )
                    .with_line(line_no)
                    .with_suggestion(format!(
                        "Add a HIERARCHY block with CHILD.FEATURE = \"{}\" and PARENT.FEATURE = \"{}\" below the hierarchy marker",
                        child, parent
                    ))
                    .with_snippet(line),
                );
            }
        }
        issues
    }
}

/// `(child, parent)` edges a defined feature needs.
fn required_edges(feature: &str, atc_defined: bool) -> Vec<(&str, &str)> {
    match feature {
        "ATC" => vec![("RX", "RX"), ("RX", "ATC"), ("ATC", "ATC")],
        // ATC already asks for RX to RX.
        "RX" if atc_defined => Vec::new(),
        _ => vec![(feature, feature)],
    }
}
