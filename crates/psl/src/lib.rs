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

//! # PSL - Pipeline Specification Language toolkit
//!
//! PSL files describe an ETL pipeline: dataset metadata, features,
//! connections with embedded SQL, schemas, queries mapping SQL columns to
//! features, vocabulary transforms and code hierarchies. This crate bundles
//! the three library crates behind one dependency.
//!
//! ## Quick Start
//!
//! ```rust
//! let doc = "DATASET DEMO {\n  DATASET_VERSION = v1\n}\n\
//!            CONNECTION C FROM ROOT {\n  QUERY = select p.id from db.person p\n}\n\
//!            SCHEMA PERSON {\n  PERSON_ID\n}\n\
//!            QUERY PERSON FROM C {\n  PERSON_ID = *p.id*\n}\n";
//!
//! let report = psl::lineage(doc).expect("within limits");
//! assert!(report.contains("SOURCE: db.person.p.id"));
//!
//! let result = psl::validate(doc).expect("within limits");
//! assert!(!result.is_valid()); // DATASET is missing required keys
//!
//! let formatted = psl::format(doc).expect("within limits");
//! assert!(formatted.starts_with("DATASET DEMO {\n    DATASET_VERSION = v1\n}"));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: data model, parser and lineage renderer
//! - [`fmt`]: config, SQL and block-protection formatting
//! - [`lint`]: structural validation rules
//!
//! Only oversized input, invalid encoding and control characters produce
//! an `Err`. Malformed PSL parses to whatever could be extracted.

pub use psl_core::{
    Connection, ConnectionSource, Dataset, Feature, FeatureMapping, Hierarchy, Limits,
    MappingSuffix, MappingValue, ParseOptions, ParsedModel, PslError, PslErrorKind, PslResult,
    Query, SchemaDefinition, Transform,
};

mod error_ext;
pub use error_ext::PslResultExt;

pub mod core {
    //! Parsing, the data model and lineage rendering
    pub use psl_core::lex::{find_hierarchy_marker, is_hierarchy_marker};
    pub use psl_core::{
        parse, parse_with_options, preprocess, preprocess_bytes, render_lineage,
        ParseOptionsBuilder, UNKNOWN, UNKNOWN_TABLE,
    };
}

pub mod fmt {
    //! Config and SQL formatting
    pub use psl_fmt::{
        flatten, format_config, format_config_with_config, format_sql, uppercase_keywords,
        BlockKind, BlockProtector, ConfigFormatter, FormatConfig, FormatConfigBuilder,
        ProtectedBlock, SqlFormatter,
    };
}

pub mod lint {
    //! Structural validation
    pub use psl_lint::{
        check_commented_blocks, check_connection_sources, check_dataset_metadata,
        check_duplicate_cache_names, check_feature_name_mappings, check_hierarchy_completeness,
        check_missing_brackets, check_missing_parentheses, check_sort_columns,
        check_tql_csv_definitions, default_rules, validate_with_config, Category, LintConfig,
        LintDocument, LintRule, LintRunner, RuleConfig, Severity, ValidationIssue,
        ValidationResult, NO_LINE,
    };
}

/// Parse a PSL document into a [`ParsedModel`].
#[inline]
pub fn parse(input: &str) -> PslResult<ParsedModel> {
    psl_core::parse(input)
}

/// Parse a document and render its feature lineage report.
#[inline]
pub fn lineage(input: &str) -> PslResult<String> {
    parse(input).map(|model| psl_core::render_lineage(&model))
}

/// Format a document with the default [`fmt::FormatConfig`].
#[inline]
pub fn format(input: &str) -> PslResult<String> {
    psl_fmt::format_config(input)
}

/// Run every validation rule with the default [`lint::LintConfig`].
#[inline]
pub fn validate(input: &str) -> PslResult<lint::ValidationResult> {
    psl_lint::validate(input)
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
