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

//! Core parser, data model and lineage renderer for PSL pipeline
//! configurations.
//!
//! A PSL document declares a dataset, named SQL connections, feature
//! schemas and the queries that populate them. [`parse`] turns the text
//! into a [`ParsedModel`] and [`render_lineage`] prints where every
//! feature's data comes from.
//!
//! # Lexical helpers
//!
//! The [`lex`] module holds the small scanners shared with the formatter
//! and validator crates: comment stripping, the hierarchy marker line and
//! parenthesis matching. Source-table attribution lives in [`sql`].

mod error;
pub mod lex;
mod limits;
mod lineage;
mod model;
mod parser;
mod preprocess;
pub mod sql;

pub use error::{PslError, PslErrorKind, PslResult};
pub use limits::Limits;
pub use lineage::render_lineage;
pub use model::{
    Connection, ConnectionSource, Dataset, Feature, FeatureMapping, Hierarchy, MappingSuffix,
    MappingValue, ParsedModel, Query, SchemaDefinition, Transform, UNKNOWN, UNKNOWN_TABLE,
};
pub use parser::{parse, parse_with_options, ParseOptions, ParseOptionsBuilder};
pub use preprocess::{preprocess, preprocess_bytes};
