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

//! CONNECTION block rules. All of them look only above the hierarchy
//! marker.

use super::LintRule;
use crate::diagnostic::{Category, ValidationIssue};
use crate::document::LintDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static CACHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CACHE\s*=\s*([\w.]+)").expect("valid regex"));
static CONNECTION_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*CONNECTION\s+(\w+)\s+FROM\s+(\w+)").expect("valid regex")
});
static CONNECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*CONNECTION\s+(\w+)").expect("valid regex"));
static SORT_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SORT\s+COLUMN\s*=([^\n]*)").expect("valid regex"));

/// Rule: every CACHE name is used once
pub struct DuplicateCacheRule;

impl LintRule for DuplicateCacheRule {
    fn id(&self) -> &str {
        "duplicate-cache"
    }
    fn description(&self) -> &str {
        "Cache names are unique"
    }
    fn category(&self) -> Category {
        Category::Logic
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for (line_no, line) in doc.above().code() {
            let Some(name) = CACHE.captures(line).and_then(|c| c.get(1)) else {
                continue;
            };
            match first_seen.get(name.as_str()) {
                Some(&first) => issues.push(
                    ValidationIssue::warning(
                        Category::Logic,
                        format!(
                            "Duplicate cache name: '{}' (first seen on line {})",
                            name.as_str(),
                            first
                        ),
                        self.id(),
                    )
                    .with_line(line_no)
                    .with_suggestion("Use unique cache names to avoid overwriting. Change one of them.")
                    .with_snippet(line),
                ),
                None => {
                    first_seen.insert(name.as_str(), line_no);
                }
            }
        }
        issues
    }
}

/// Rule: connections agree on their upstream source
pub struct ConnectionSourceRule;

impl LintRule for ConnectionSourceRule {
    fn id(&self) -> &str {
        "connection-source"
    }
    fn description(&self) -> &str {
        "All connections read from the same source"
    }
    fn category(&self) -> Category {
        Category::Logic
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let connections: Vec<(usize, &str, &str, &str)> = doc
            .above()
            .code()
            .filter_map(|(line_no, line)| {
                let caps = CONNECTION_FROM.captures(line)?;
                let name = caps.get(1)?.as_str();
                let source = caps.get(2)?.as_str();
                Some((line_no, line, name, source))
            })
            .collect();

        // First-seen order breaks ties between equally common sources.
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for &(_, _, _, source) in &connections {
            match tally.iter_mut().find(|(s, _)| *s == source) {
                Some((_, count)) => *count += 1,
                None => tally.push((source, 1)),
            }
        }
        if tally.len() < 2 {
            return Vec::new();
        }
        let mut expected = tally[0];
        for &candidate in &tally[1..] {
            if candidate.1 > expected.1 {
                expected = candidate;
            }
        }
        let expected = expected.0;
        tracing::debug!(expected, sources = tally.len(), "inconsistent connection sources");

        connections
            .iter()
            .filter(|(_, _, _, source)| *source != expected)
            .map(|&(line_no, line, name, source)| {
                ValidationIssue::error(
                    Category::Logic,
                    format!(
                        "Connection '{}' reads from '{}' but most connections read from '{}'",
                        name, source, expected
                    ),
                    self.id(),
                )
                .with_line(line_no)
                .with_suggestion(format!(
                    "Change 'FROM {}' to 'FROM {}' unless this connection really needs a different source",
                    source, expected
                ))
                .with_snippet(line)
            })
            .collect()
    }
}

/// Rule: every connection declares a non-empty SORT COLUMN
pub struct SortColumnRule;

impl LintRule for SortColumnRule {
    fn id(&self) -> &str {
        "sort-column"
    }
    fn description(&self) -> &str {
        "Every connection has a SORT COLUMN"
    }
    fn category(&self) -> Category {
        Category::MissingField
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let above = doc.above();
        let mut issues = Vec::new();

        for (index, header) in above.lines().iter().enumerate() {
            let Some(name) = CONNECTION_HEADER.captures(header).and_then(|c| c.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let block = above.block(index);
            let sort = block
                .code()
                .find_map(|(line_no, line)| SORT_COLUMN.captures(line).map(|c| (line_no, line, c)));

            match sort {
                None => issues.push(
                    ValidationIssue::error(
                        Category::MissingField,
                        format!("CONNECTION '{}' is missing SORT COLUMN", name),
                        self.id(),
                    )
                    .with_line(above.line_number(index))
                    .with_suggestion("Add 'SORT COLUMN = *column*' inside the CONNECTION block")
                    .with_snippet(header),
                ),
                Some((line_no, line, caps)) => {
                    let value = caps.get(1).map_or("", |m| m.as_str());
                    if is_empty_column(value) {
                        issues.push(
                            ValidationIssue::error(
                                Category::MissingValue,
                                format!("SORT COLUMN in CONNECTION '{}' has no value", name),
                                self.id(),
                            )
                            .with_line(line_no)
                            .with_suggestion("Set the sort column, e.g. 'SORT COLUMN = *patient_id*'")
                            .with_snippet(line),
                        );
                    }
                }
            }
        }
        issues
    }
}

/// An empty value, or an empty `**` column reference.
fn is_empty_column(value: &str) -> bool {
    let value = value.trim();
    let value = value.strip_suffix('}').unwrap_or(value).trim();
    value.is_empty() || value.trim_matches('*').trim().is_empty()
}
