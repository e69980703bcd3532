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

//! Feature lineage report.
//!
//! The report is a pure function of the parsed model: queries are grouped
//! by schema and then by connection in first-seen order, so rendering the
//! same document twice gives byte-identical text.

use crate::model::{FeatureMapping, MappingValue, ParsedModel, Query};
use crate::sql::{parse_table_aliases, resolve_source_table};

const RULE_WIDTH: usize = 80;

/// Render the lineage report for `model`.
///
/// # Examples
///
/// ```
/// let model = psl_core::parse("DATASET DEMO {\n DATASET_VERSION = v1\n}").unwrap();
/// let report = psl_core::render_lineage(&model);
/// assert!(report.contains("DEMO v1 FEATURE LINEAGE MAP"));
/// ```
pub fn render_lineage(model: &ParsedModel) -> String {
    let mut report = Report::default();
    let dataset = model.dataset();

    report.rule();
    report.line(format!("{} {} FEATURE LINEAGE MAP", dataset.name, dataset.version));
    report.rule();
    report.blank();

    for (schema_name, queries) in group_by(model.queries(), |q| q.schema.as_str()) {
        render_schema(&mut report, model, schema_name, &queries);
    }

    render_vocabulary(&mut report, model);
    render_hierarchies(&mut report, model);

    report.finish()
}

fn render_schema(report: &mut Report, model: &ParsedModel, schema_name: &str, queries: &[&Query]) {
    let Some(schema) = model.schema(schema_name) else {
        return;
    };
    report.line(format!("SCHEMA: {}{}", schema_name, schema.modifier_label()));

    let groups = group_by(queries.iter().copied(), |q| q.connection.as_str());
    let group_count = groups.len();

    for (index, (connection_name, connection_queries)) in groups.into_iter().enumerate() {
        let is_last_connection = index + 1 == group_count;
        let (connection_branch, feature_prefix) = if is_last_connection {
            ("└─", "   ")
        } else {
            ("├─", "│  ")
        };

        report.line(format!("{} CONNECTION: {}", connection_branch, connection_name));
        report.line(format!("{} │", feature_prefix));

        let Some(connection) = model.connection(connection_name) else {
            tracing::debug!(connection = connection_name, "lineage references undefined connection");
            continue;
        };
        let query_text = connection.query().unwrap_or_default();
        let aliases = parse_table_aliases(query_text);

        let consolidated = consolidate(&connection_queries);
        let printed: Vec<(&str, &[&FeatureMapping])> = schema
            .features
            .iter()
            .filter_map(|feature| {
                consolidated
                    .iter()
                    .find(|(name, _)| *name == feature.as_str())
                    .map(|(name, mappings)| (*name, mappings.as_slice()))
            })
            .collect();

        // Undeclared mapped features count toward the closing glyph.
        for (feature_index, (feature, mappings)) in printed.iter().enumerate() {
            let is_last_feature = feature_index + 1 == consolidated.len();
            let (feature_branch, source_prefix) = if is_last_feature {
                ("└───", "    ")
            } else {
                ("├───", "│   ")
            };
            report.line(format!("{} {} FEATURE: {}", feature_prefix, feature_branch, feature));

            for (mapping_index, mapping) in mappings.iter().enumerate() {
                let mapping_branch = if mapping_index + 1 == mappings.len() {
                    "└─>"
                } else {
                    "├─>"
                };
                let source = describe_source(mapping, &aliases, query_text);
                report.line(format!(
                    "{} {} {} SOURCE: {}",
                    feature_prefix, source_prefix, mapping_branch, source
                ));
            }
        }

        if !is_last_connection {
            report.line(feature_prefix);
        }
    }

    report.blank();
}

/// Union of the mappings of `queries`, per feature in first-seen order.
///
/// Suppressed mappings are filtered out here; a feature whose only
/// mappings were suppressed is still listed, with no sources.
fn consolidate<'q>(queries: &[&'q Query]) -> Vec<(&'q str, Vec<&'q FeatureMapping>)> {
    let mut consolidated: Vec<(&str, Vec<&FeatureMapping>)> = Vec::new();
    for &query in queries {
        for (feature, mappings) in &query.mappings {
            let index = match consolidated.iter().position(|(f, _)| *f == feature.as_str()) {
                Some(i) => i,
                None => {
                    consolidated.push((feature.as_str(), Vec::new()));
                    consolidated.len() - 1
                }
            };
            let entry = &mut consolidated[index].1;
            for mapping in mappings.iter().filter(|m| !m.is_suppressed()) {
                if !entry.contains(&mapping) {
                    entry.push(mapping);
                }
            }
        }
    }
    consolidated
}

fn describe_source(
    mapping: &FeatureMapping,
    aliases: &crate::sql::TableAliases,
    query_text: &str,
) -> String {
    let suffix = mapping
        .suffix
        .as_str()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();

    match &mapping.value {
        MappingValue::Column(column) => {
            let table = resolve_source_table(column, aliases, query_text);
            format!("{}.{}{}", table, column, suffix)
        }
        MappingValue::Literal(_) => format!("{}{}", mapping.raw, suffix),
        MappingValue::Null => mapping.raw.clone(),
    }
}

fn render_vocabulary(report: &mut Report, model: &ParsedModel) {
    let transforms = model.transforms();
    if transforms.is_empty() {
        return;
    }
    report.section("VOCABULARY MAPPINGS");

    for (i, transform) in transforms.iter().enumerate() {
        let is_last = i + 1 == transforms.len();
        let (prefix, indent) = branch(is_last);
        report.line(format!("{} FEATURE: {}", prefix, transform.feature));
        report.line(format!(
            "{} └─> VOCABULARY SOURCE: {}",
            indent, transform.vocabulary_source
        ));
        if !is_last {
            report.line("│");
        }
    }
    report.blank();
}

fn render_hierarchies(report: &mut Report, model: &ParsedModel) {
    let hierarchies = model.hierarchies();
    if hierarchies.is_empty() {
        return;
    }
    report.section("FEATURE HIERARCHIES");

    for (i, hierarchy) in hierarchies.iter().enumerate() {
        let is_last = i + 1 == hierarchies.len();
        let (prefix, indent) = branch(is_last);
        report.line(format!(
            "{} HIERARCHY: {} to {}",
            prefix, hierarchy.parent_feature, hierarchy.child_feature
        ));
        report.line(format!(
            "{} ├─> CHILD.CODE = {}.{}",
            indent, hierarchy.source_table, hierarchy.child_column
        ));
        report.line(format!(
            "{} └─> PARENT.CODE = {}.{}",
            indent, hierarchy.source_table, hierarchy.parent_column
        ));
        if !is_last {
            report.line("│");
        }
    }
    report.blank();
}

fn branch(is_last: bool) -> (&'static str, &'static str) {
    if is_last {
        ("└───", "    ")
    } else {
        ("├───", "│   ")
    }
}

/// Group items by key, keeping first-seen order of keys and items.
fn group_by<'a, T, I, F>(items: I, key: F) -> Vec<(&'a str, Vec<&'a T>)>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> &'a str,
    T: 'a,
{
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

#[derive(Default)]
struct Report {
    out: String,
}

impl Report {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn rule(&mut self) {
        self.line("=".repeat(RULE_WIDTH));
    }

    fn section(&mut self, title: &str) {
        self.rule();
        self.line(title);
        self.rule();
        self.blank();
    }

    fn finish(self) -> String {
        self.out
    }
}
