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

//! Resource limits applied at the boundary of every entry point.

/// Bounds on the input accepted by the parser, validator and formatters.
///
/// The extraction rules are regex driven, so the only defence against
/// pathological documents is to refuse oversized input up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum document size in bytes (default: 64MB).
    pub max_input_size: usize,
    /// Maximum length of a single line in bytes (default: 1MB).
    pub max_line_length: usize,
    /// Maximum subquery nesting the SQL formatter descends into (default: 64).
    pub max_sql_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024,
            max_line_length: 1024 * 1024,
            max_sql_depth: 64,
        }
    }
}

impl Limits {
    /// Limits that accept everything. Intended for trusted input and tests.
    pub fn unlimited() -> Self {
        Self {
            max_input_size: usize::MAX,
            max_line_length: usize::MAX,
            max_sql_depth: usize::MAX,
        }
    }
}
