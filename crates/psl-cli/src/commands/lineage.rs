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

//! Lineage command - feature lineage report

use super::{read_file, write_output};
use psl_core::{parse, render_lineage};

/// Parse a PSL file and print its lineage report.
pub fn lineage(file: &str, output: Option<&str>) -> Result<(), String> {
    let content = read_file(file)?;

    let model = parse(&content).map_err(|e| format!("Parse error: {}", e))?;
    tracing::debug!(
        schemas = model.schemas().len(),
        connections = model.connections().len(),
        "rendering lineage"
    );

    write_output(&render_lineage(&model), output)
}
