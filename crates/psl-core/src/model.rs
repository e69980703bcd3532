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

//! Entities extracted from a PSL document.
//!
//! Everything here is produced by [`crate::parse`] and is read-only once
//! parsing returns. Lookups by name follow PSL's overwrite semantics: a
//! later declaration of the same name replaces the earlier one in place.

use std::collections::BTreeMap;
use std::fmt;

/// Placeholder used when the DATASET block or its version is absent.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel emitted when a column cannot be attributed to a source table.
pub const UNKNOWN_TABLE: &str = "UNKNOWN_TABLE";

/// The DATASET block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    pub name: String,
    pub version: String,
    /// Every `KEY = VALUE` pair of the block, in declaration order.
    pub metadata: Vec<(String, String)>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            metadata: Vec::new(),
        }
    }
}

impl Dataset {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A `FEATURE name, description, type[, attributes]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub data_type: String,
    pub attributes: Vec<String>,
}

/// Where a connection's rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionSource {
    /// SQL text with `$VARIABLE` references already substituted.
    Query(String),
    /// Flat file reference (`FILE = name.dict`).
    File(String),
    /// Neither a query nor a file (root JDBC connections and the like).
    None,
}

/// A named data source binding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub name: String,
    /// Upstream connection named after `FROM`, absent for file connections.
    pub upstream: Option<String>,
    pub source: ConnectionSource,
    pub cache: Option<String>,
    pub sort_column: Option<String>,
}

impl Connection {
    /// The substituted SQL text, if this is a query connection.
    pub fn query(&self) -> Option<&str> {
        match &self.source {
            ConnectionSource::Query(q) => Some(q),
            _ => None,
        }
    }

    /// The file reference, if this is a file connection.
    pub fn file(&self) -> Option<&str> {
        match &self.source {
            ConnectionSource::File(f) => Some(f),
            _ => None,
        }
    }
}

/// A SCHEMA block and its modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaDefinition {
    pub name: String,
    pub deduplicated: bool,
    pub patient_level: bool,
    /// Declared feature names, in order.
    pub features: Vec<String>,
}

impl SchemaDefinition {
    /// Modifier label as printed in lineage reports, e.g. `" (PATIENT LEVEL)"`.
    pub fn modifier_label(&self) -> &'static str {
        match (self.deduplicated, self.patient_level) {
            (true, true) => " (DEDUPLICATED PATIENT LEVEL)",
            (true, false) => " (DEDUPLICATED)",
            (false, true) => " (PATIENT LEVEL)",
            (false, false) => "",
        }
    }
}

/// Dotted qualifier on a mapped feature (`ICD10.NAME`, `VISIT.START`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingSuffix {
    None,
    Start,
    End,
    Code,
    Name,
}

impl MappingSuffix {
    /// Parse the text after the dot. Unknown qualifiers yield `None`.
    pub fn parse(suffix: Option<&str>) -> Option<Self> {
        match suffix {
            None => Some(Self::None),
            Some("START") => Some(Self::Start),
            Some("END") => Some(Self::End),
            Some("CODE") => Some(Self::Code),
            Some("NAME") => Some(Self::Name),
            Some(_) => None,
        }
    }

    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Start => Some("START"),
            Self::End => Some("END"),
            Self::Code => Some("CODE"),
            Self::Name => Some("NAME"),
        }
    }
}

impl fmt::Display for MappingSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

/// What a mapping assigns to its feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingValue {
    /// Column name taken from `*col*`, possibly alias-qualified.
    Column(String),
    /// Quoted literal, quotes included.
    Literal(String),
    Null,
}

/// One `FEATURE[.SUFFIX] = value` assignment inside a QUERY block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureMapping {
    pub value: MappingValue,
    /// Right-hand side as written (after trimming).
    pub raw: String,
    pub suffix: MappingSuffix,
}

impl FeatureMapping {
    pub fn column(&self) -> Option<&str> {
        match &self.value {
            MappingValue::Column(c) => Some(c),
            _ => None,
        }
    }

    /// NAME-qualified columns and literals are left out of lineage so a
    /// code and its display name do not show up as two sources. NULL
    /// assignments are always kept.
    pub fn is_suppressed(&self) -> bool {
        self.suffix == MappingSuffix::Name && self.value != MappingValue::Null
    }
}

/// A `QUERY SCHEMA FROM CONNECTION { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    pub schema: String,
    pub connection: String,
    pub deduplicated: bool,
    pub patient_level: bool,
    /// Feature name to its mappings, ordered by first assignment.
    pub mappings: Vec<(String, Vec<FeatureMapping>)>,
}

impl Query {
    pub fn mappings_for(&self, feature: &str) -> Option<&[FeatureMapping]> {
        self.mappings
            .iter()
            .find(|(f, _)| f == feature)
            .map(|(_, m)| m.as_slice())
    }
}

/// A vocabulary TRANSFORM block with its resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub feature: String,
    pub connection: String,
    pub vocabulary_source: String,
}

/// A HIERARCHY block with its resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hierarchy {
    pub child_feature: String,
    pub parent_feature: String,
    pub connection: String,
    pub source_table: String,
    pub child_column: String,
    pub parent_column: String,
}

/// Everything extracted from one PSL document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedModel {
    pub(crate) dataset: Dataset,
    pub(crate) variables: BTreeMap<String, String>,
    pub(crate) features: Vec<Feature>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) schemas: Vec<SchemaDefinition>,
    pub(crate) queries: Vec<Query>,
    pub(crate) transforms: Vec<Transform>,
    pub(crate) hierarchies: Vec<Hierarchy>,
}

impl ParsedModel {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, name: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.name == name)
    }

    pub fn schemas(&self) -> &[SchemaDefinition] {
        &self.schemas
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn hierarchies(&self) -> &[Hierarchy] {
        &self.hierarchies
    }
}

/// Insert `item` or replace the existing entry with the same key in place.
pub(crate) fn upsert<T, F>(items: &mut Vec<T>, item: T, same: F)
where
    F: Fn(&T, &T) -> bool,
{
    match items.iter().position(|existing| same(existing, &item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== MappingSuffix tests ====================

    #[test]
    fn test_suffix_parse_known() {
        assert_eq!(MappingSuffix::parse(None), Some(MappingSuffix::None));
        assert_eq!(MappingSuffix::parse(Some("START")), Some(MappingSuffix::Start));
        assert_eq!(MappingSuffix::parse(Some("END")), Some(MappingSuffix::End));
        assert_eq!(MappingSuffix::parse(Some("CODE")), Some(MappingSuffix::Code));
        assert_eq!(MappingSuffix::parse(Some("NAME")), Some(MappingSuffix::Name));
    }

    #[test]
    fn test_suffix_parse_unknown() {
        assert_eq!(MappingSuffix::parse(Some("UNIT")), None);
        assert_eq!(MappingSuffix::parse(Some("name")), None);
    }

    #[test]
    fn test_suffix_display() {
        assert_eq!(MappingSuffix::Start.to_string(), "START");
        assert_eq!(MappingSuffix::None.to_string(), "");
    }

    // ==================== FeatureMapping tests ====================

    fn mapping(value: MappingValue, suffix: MappingSuffix) -> FeatureMapping {
        FeatureMapping {
            value,
            raw: String::new(),
            suffix,
        }
    }

    #[test]
    fn test_name_suffix_suppresses_columns_and_literals() {
        assert!(mapping(MappingValue::Column("c".into()), MappingSuffix::Name).is_suppressed());
        assert!(mapping(MappingValue::Literal("\"x\"".into()), MappingSuffix::Name).is_suppressed());
        assert!(!mapping(MappingValue::Null, MappingSuffix::Name).is_suppressed());
        assert!(!mapping(MappingValue::Column("c".into()), MappingSuffix::Code).is_suppressed());
    }

    #[test]
    fn test_mapping_column_accessor() {
        assert_eq!(mapping(MappingValue::Column("ptid".into()), MappingSuffix::None).column(), Some("ptid"));
        assert_eq!(mapping(MappingValue::Null, MappingSuffix::None).column(), None);
    }

    // ==================== Schema tests ====================

    #[test]
    fn test_schema_modifier_label() {
        let mut schema = SchemaDefinition {
            name: "S".into(),
            deduplicated: false,
            patient_level: false,
            features: vec![],
        };
        assert_eq!(schema.modifier_label(), "");
        schema.patient_level = true;
        assert_eq!(schema.modifier_label(), " (PATIENT LEVEL)");
        schema.deduplicated = true;
        assert_eq!(schema.modifier_label(), " (DEDUPLICATED PATIENT LEVEL)");
        schema.patient_level = false;
        assert_eq!(schema.modifier_label(), " (DEDUPLICATED)");
    }

    // ==================== Connection tests ====================

    #[test]
    fn test_connection_accessors() {
        let conn = Connection {
            name: "C".into(),
            upstream: Some("ROOT".into()),
            source: ConnectionSource::Query("select 1".into()),
            cache: None,
            sort_column: None,
        };
        assert_eq!(conn.query(), Some("select 1"));
        assert_eq!(conn.file(), None);
    }

    // ==================== Upsert tests ====================

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut items = vec![("a", 1), ("b", 2)];
        upsert(&mut items, ("a", 3), |x, y| x.0 == y.0);
        upsert(&mut items, ("c", 4), |x, y| x.0 == y.0);
        assert_eq!(items, vec![("a", 3), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_default_dataset_is_unknown() {
        let dataset = Dataset::default();
        assert_eq!(dataset.name, UNKNOWN);
        assert_eq!(dataset.version, UNKNOWN);
        assert_eq!(dataset.metadata_value("PRECISION"), None);
    }
}
