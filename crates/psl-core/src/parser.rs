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

//! PSL parser.
//!
//! PSL has no formal grammar. Each construct is recognised by its own
//! extraction rule, and the rules run in a fixed order because later
//! rules look up entities produced by earlier ones:
//!
//! 1. `#` comments are stripped.
//! 2. DATASET block (name, version, metadata).
//! 3. VARIABLE blocks.
//! 4. FEATURE lines, up to and including the first CONNECTION line.
//! 5. CONNECTION blocks, with `$VARIABLE` substitution in their queries.
//! 6. SCHEMA blocks.
//! 7. QUERY blocks whose schema is known.
//! 8. TRANSFORM blocks with a resolvable vocabulary source.
//! 9. HIERARCHY blocks with all four fields and a resolvable source.
//!
//! A rule that does not match contributes nothing; parsing never fails on
//! malformed PSL.

use crate::error::PslResult;
use crate::lex::strip_comments;
use crate::limits::Limits;
use crate::model::{
    upsert, Connection, ConnectionSource, Dataset, Feature, FeatureMapping, Hierarchy,
    MappingSuffix, MappingValue, ParsedModel, Query, SchemaDefinition, Transform, UNKNOWN,
};
use crate::preprocess::preprocess;
use crate::sql::extract_table_from_query;
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("valid regex"));
    };
}

pattern!(DATASET_BLOCK, r"DATASET\s+(\w+)\s*\{([^}]+)\}");
pattern!(DATASET_VERSION, r"(?i)DATASET_VERSION\s*=\s*(\S+)");
pattern!(KEY_VALUE_LINE, r"(?m)^[ \t]*(\w+)[ \t]*=[ \t]*(.*?)[ \t]*$");
pattern!(VARIABLE_BLOCK, r"VARIABLE\s+(\w+)\s*\{([^}]*)\}");
pattern!(FEATURE_LINE, r"FEATURE\s+(\w+)\s*,\s*([^,]+)\s*,\s*(\w+)(?:\s*,\s*(.*))?");
pattern!(CONNECTION_FROM_BLOCK, r"CONNECTION\s+(\w+)\s+FROM\s+(\w+)\s*\{([^}]+)\}");
pattern!(CONNECTION_PLAIN_BLOCK, r"(?i)CONNECTION\s+(\w+)\s*\{([^}]*)\}");
pattern!(EMBEDDED_QUERY, r"(?s)QUERY\s*=\s*(.+)");
pattern!(LEADING_FILE, r"(?i)^\s*FILE\s*=\s*([^\s}]+)");
pattern!(CACHE_NAME, r"CACHE\s*=\s*([\w.]+)");
pattern!(SORT_COLUMN, r"SORT\s+COLUMN\s*=[ \t]*([^\n]*)");
pattern!(
    SCHEMA_BLOCK,
    r"(DEDUPLICATED\s+)?(PATIENT\s+LEVEL\s+)?SCHEMA\s+(\w+)\s*\{([^}]+)\}"
);
pattern!(QUERY_BLOCK, r"QUERY\s+(\w+)\s+FROM\s+(\w+)\s*\{([^}]+)\}");
pattern!(ASSIGNMENT, r"(\w+)(?:\.(\w+))?\s*=\s*(.+)");
pattern!(QUOTED, r#""([^"]+)""#);
pattern!(STARRED, r"\*([^*]+)\*");
pattern!(TRANSFORM_BLOCK, r"TRANSFORM\s+FROM\s+(\w+)\s*\{([^}]+)\}");
pattern!(SOURCE_FEATURE, r#"(?i)SOURCE\.FEATURE\s*=\s*"([^"]+)""#);
pattern!(HIERARCHY_BLOCK, r"HIERARCHY\s+FROM\s+(\w+)\s*\{([^}]+)\}");
pattern!(CHILD_FEATURE, r#"(?i)CHILD\.FEATURE\s*=\s*"([^"]+)""#);
pattern!(PARENT_FEATURE, r#"(?i)PARENT\.FEATURE\s*=\s*"([^"]+)""#);
pattern!(CHILD_CODE, r"(?i)CHILD\.CODE\s*=\s*");
pattern!(PARENT_CODE, r"(?i)PARENT\.CODE\s*=\s*");

/// Options controlling a parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Input limits checked before any extraction runs.
    pub limits: Limits,
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

/// Builder for [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    limits: Limits,
}

impl ParseOptionsBuilder {
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn max_input_size(mut self, bytes: usize) -> Self {
        self.limits.max_input_size = bytes;
        self
    }

    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.limits.max_line_length = bytes;
        self
    }

    pub fn build(self) -> ParseOptions {
        ParseOptions {
            limits: self.limits,
        }
    }
}

/// Parse a PSL document with default options.
///
/// # Errors
///
/// Only input rejected by [`Limits`] or containing control characters
/// fails; malformed PSL yields a partially populated model.
///
/// # Examples
///
/// ```
/// let model = psl_core::parse("DATASET DEMO {\n DATASET_VERSION = v1\n}").unwrap();
/// assert_eq!(model.dataset().name, "DEMO");
/// assert_eq!(model.dataset().version, "v1");
/// ```
pub fn parse(document: &str) -> PslResult<ParsedModel> {
    parse_with_options(document, &ParseOptions::default())
}

/// Parse a PSL document with explicit options.
pub fn parse_with_options(document: &str, options: &ParseOptions) -> PslResult<ParsedModel> {
    let text = preprocess(document, &options.limits)?;
    let stripped = strip_comments(&text);

    let mut ctx = ParseContext::new(&stripped);
    ctx.extract_dataset();
    ctx.extract_variables();
    ctx.extract_features();
    ctx.extract_connections();
    ctx.extract_schemas();
    ctx.extract_queries();
    ctx.extract_transforms();
    ctx.extract_hierarchies();
    Ok(ctx.finish())
}

/// State threaded through the extraction rules of one parse call.
struct ParseContext<'a> {
    /// Comment-free document text.
    text: &'a str,
    model: ParsedModel,
}

impl<'a> ParseContext<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            model: ParsedModel::default(),
        }
    }

    fn finish(self) -> ParsedModel {
        let m = &self.model;
        tracing::debug!(
            dataset = %m.dataset.name,
            features = m.features.len(),
            connections = m.connections.len(),
            schemas = m.schemas.len(),
            queries = m.queries.len(),
            transforms = m.transforms.len(),
            hierarchies = m.hierarchies.len(),
            "parsed PSL document"
        );
        self.model
    }

    /// First `DATASET NAME { ... }` block. Name and version default to
    /// [`UNKNOWN`].
    fn extract_dataset(&mut self) {
        let Some(caps) = DATASET_BLOCK.captures(self.text) else {
            tracing::debug!("no DATASET block");
            return;
        };
        let body = &caps[2];
        let version = DATASET_VERSION
            .captures(body)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let metadata = KEY_VALUE_LINE
            .captures_iter(body)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect();

        self.model.dataset = Dataset {
            name: caps[1].to_string(),
            version,
            metadata,
        };
    }

    /// `VARIABLE NAME { value }` blocks; later definitions overwrite.
    fn extract_variables(&mut self) {
        for caps in VARIABLE_BLOCK.captures_iter(self.text) {
            self.model
                .variables
                .insert(caps[1].to_string(), caps[2].trim().to_string());
        }
    }

    /// FEATURE lines. Collection ends after the first line starting with
    /// `CONNECTION`; features declared further down are not seen.
    fn extract_features(&mut self) {
        for line in self.text.lines() {
            let trimmed = line.trim();
            if let Some(caps) = FEATURE_LINE.captures(trimmed) {
                let attributes = caps
                    .get(4)
                    .map(|m| {
                        m.as_str()
                            .split(',')
                            .map(str::trim)
                            .filter(|a| !a.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                let feature = Feature {
                    name: caps[1].to_string(),
                    description: caps[2].trim().to_string(),
                    data_type: caps[3].to_string(),
                    attributes,
                };
                upsert(&mut self.model.features, feature, |a, b| a.name == b.name);
            }
            if trimmed.starts_with("CONNECTION") {
                break;
            }
        }
    }

    /// `CONNECTION NAME FROM UPSTREAM { ... }` blocks, then FROM-less
    /// `CONNECTION NAME { ... }` blocks for names not seen yet.
    fn extract_connections(&mut self) {
        for caps in CONNECTION_FROM_BLOCK.captures_iter(self.text) {
            let body = &caps[3];
            let (settings, source) = match EMBEDDED_QUERY.captures(body) {
                Some(q) => {
                    let start = q.get(0).map_or(body.len(), |m| m.start());
                    let query = self.substitute_variables(q[1].trim());
                    (&body[..start], ConnectionSource::Query(query))
                }
                None => (body, ConnectionSource::None),
            };
            let connection = Connection {
                name: caps[1].to_string(),
                upstream: Some(caps[2].to_string()),
                source,
                cache: CACHE_NAME.captures(settings).map(|c| c[1].to_string()),
                sort_column: SORT_COLUMN
                    .captures(settings)
                    .map(|c| c[1].trim().to_string())
                    .filter(|s| !s.is_empty()),
            };
            upsert(&mut self.model.connections, connection, |a, b| a.name == b.name);
        }

        for caps in CONNECTION_PLAIN_BLOCK.captures_iter(self.text) {
            let name = &caps[1];
            if self.model.connection(name).is_some() {
                continue;
            }
            let source = LEADING_FILE
                .captures(&caps[2])
                .map(|c| ConnectionSource::File(c[1].to_string()))
                .unwrap_or(ConnectionSource::None);
            self.model.connections.push(Connection {
                name: name.to_string(),
                upstream: None,
                source,
                cache: None,
                sort_column: None,
            });
        }
    }

    /// Replace every `$NAME` token with its variable value.
    ///
    /// Longer names are substituted first so `$DATA_SCHEMA` is not
    /// clobbered by a shorter `$DATA`. Replacement values are not expanded
    /// again.
    fn substitute_variables(&self, query: &str) -> String {
        let mut names: Vec<&String> = self.model.variables.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut pieces: Vec<(String, &str)> = Vec::new();
        let mut out = query.to_string();
        for (i, name) in names.into_iter().enumerate() {
            let token = format!("${}", name);
            if !out.contains(&token) {
                continue;
            }
            // A marker keeps inserted values out of reach of later tokens.
            let marker = format!("\u{0}{}\u{0}", i);
            out = out.replace(&token, &marker);
            pieces.push((marker, self.model.variables[name].as_str()));
        }
        for (marker, value) in pieces {
            out = out.replace(&marker, value);
        }
        out
    }

    /// SCHEMA blocks with optional DEDUPLICATED / PATIENT LEVEL prefixes.
    /// Body lines are feature names; blank lines and `//` lines are skipped.
    fn extract_schemas(&mut self) {
        for caps in SCHEMA_BLOCK.captures_iter(self.text) {
            let features = caps[4]
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with("//"))
                .map(String::from)
                .collect();
            let schema = SchemaDefinition {
                name: caps[3].to_string(),
                deduplicated: caps.get(1).is_some(),
                patient_level: caps.get(2).is_some(),
                features,
            };
            upsert(&mut self.model.schemas, schema, |a, b| a.name == b.name);
        }
    }

    /// `QUERY SCHEMA FROM CONNECTION { ... }` blocks whose schema exists.
    fn extract_queries(&mut self) {
        for caps in QUERY_BLOCK.captures_iter(self.text) {
            let schema_name = &caps[1];
            let Some(schema) = self.model.schema(schema_name) else {
                tracing::debug!(schema = schema_name, "skipping QUERY block for unknown schema");
                continue;
            };
            let query = Query {
                schema: schema_name.to_string(),
                connection: caps[2].to_string(),
                deduplicated: schema.deduplicated,
                patient_level: schema.patient_level,
                mappings: extract_mappings(&caps[3]),
            };
            self.model.queries.push(query);
        }
    }

    /// TRANSFORM blocks naming a `SOURCE.FEATURE` and a connection whose
    /// vocabulary source can be resolved.
    fn extract_transforms(&mut self) {
        for caps in TRANSFORM_BLOCK.captures_iter(self.text) {
            let connection = &caps[1];
            let Some(feature) = SOURCE_FEATURE.captures(&caps[2]).map(|c| c[1].to_string()) else {
                continue;
            };
            let Some(vocabulary_source) = self.resolve_source(connection) else {
                tracing::debug!(connection, feature = %feature, "unresolved TRANSFORM source");
                continue;
            };
            self.model.transforms.push(Transform {
                feature,
                connection: connection.to_string(),
                vocabulary_source,
            });
        }
    }

    /// HIERARCHY blocks with CHILD/PARENT features and codes.
    fn extract_hierarchies(&mut self) {
        for caps in HIERARCHY_BLOCK.captures_iter(self.text) {
            let connection = &caps[1];
            let body = &caps[2];

            let child_feature = CHILD_FEATURE.captures(body).map(|c| c[1].to_string());
            let parent_feature = PARENT_FEATURE.captures(body).map(|c| c[1].to_string());
            let child_code = code_value(body, &CHILD_CODE, true);
            let parent_code = code_value(body, &PARENT_CODE, false);

            let (Some(child_feature), Some(parent_feature), Some(child_code), Some(parent_code)) =
                (child_feature, parent_feature, child_code, parent_code)
            else {
                tracing::debug!(connection, "incomplete HIERARCHY block");
                continue;
            };

            let Some(source_table) = self.resolve_source(connection) else {
                tracing::debug!(connection, "unresolved HIERARCHY source");
                continue;
            };

            self.model.hierarchies.push(Hierarchy {
                child_feature,
                parent_feature,
                connection: connection.to_string(),
                source_table,
                child_column: column_or_raw(&child_code),
                parent_column: column_or_raw(&parent_code),
            });
        }
    }

    /// Source of a named connection: the first FROM table of a non-empty
    /// query, or the file of a file connection.
    fn resolve_source(&self, connection: &str) -> Option<String> {
        match &self.model.connection(connection)?.source {
            ConnectionSource::Query(q) if !q.trim().is_empty() => Some(extract_table_from_query(q)),
            ConnectionSource::File(f) => Some(f.clone()),
            _ => None,
        }
    }
}

/// Mappings of a QUERY block body, grouped by feature in first-seen order.
///
/// `PID` and `ASSERT` lines are not mappings. A feature appears in the
/// result as soon as one of its lines is recognised, even when the only
/// mapping is NAME-suppressed.
fn extract_mappings(body: &str) -> Vec<(String, Vec<FeatureMapping>)> {
    let mut grouped: Vec<(String, Vec<FeatureMapping>)> = Vec::new();

    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("PID") || line.starts_with("ASSERT") {
            continue;
        }
        let Some(caps) = ASSIGNMENT.captures(line) else {
            continue;
        };
        let feature = &caps[1];
        let raw = caps[3].trim();
        let Some(suffix) = MappingSuffix::parse(caps.get(2).map(|m| m.as_str())) else {
            tracing::debug!(line, "skipping mapping with unknown suffix");
            continue;
        };

        let value = if raw == "NULL" {
            MappingValue::Null
        } else if let Some(q) = QUOTED.captures(raw) {
            MappingValue::Literal(format!("\"{}\"", &q[1]))
        } else if let Some(c) = STARRED.captures(raw) {
            MappingValue::Column(c[1].to_string())
        } else {
            continue;
        };

        let raw = match &value {
            MappingValue::Literal(lit) => lit.clone(),
            _ => raw.to_string(),
        };
        let mapping = FeatureMapping { value, raw, suffix };

        match grouped.iter_mut().find(|(f, _)| f == feature) {
            Some((_, list)) => list.push(mapping),
            None => grouped.push((feature.to_string(), vec![mapping])),
        }
    }

    grouped
}

/// Value assigned by `key` (`CHILD.CODE =` / `PARENT.CODE =`), read up to
/// the end of its line. With `stop_at_parent`, a `PARENT` on the same line
/// ends the value.
fn code_value(body: &str, key: &Regex, stop_at_parent: bool) -> Option<String> {
    let m = key.find(body)?;
    let rest = &body[m.end()..];
    let line = rest.split('\n').next().unwrap_or_default();

    let end = if stop_at_parent {
        line.to_ascii_uppercase()
            .match_indices("PARENT")
            .map(|(i, _)| i)
            .find(|&i| i > 0)
            .unwrap_or(line.len())
    } else {
        line.len()
    };

    let value = line[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Inner text of `*col*`, or the whole value for bare tokens like `C1`.
fn column_or_raw(code: &str) -> String {
    STARRED
        .captures(code)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| code.to_string())
}
