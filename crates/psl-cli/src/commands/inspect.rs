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

//! Inspect command - parsed model overview

use super::read_file;
use colored::Colorize;
use psl_core::{parse, Connection, ConnectionSource, ParsedModel};

/// Parse a PSL file and print a tree of what the parser extracted.
///
/// Useful when a lineage report looks incomplete: anything the parser could
/// not resolve is simply absent here.
pub fn inspect(file: &str) -> Result<(), String> {
    let content = read_file(file)?;

    let model = parse(&content).map_err(|e| format!("Parse error: {}", e))?;
    print_model(&model);
    Ok(())
}

fn print_model(model: &ParsedModel) {
    let dataset = model.dataset();

    println!("{}", "PSL Document".bold().underline());
    println!();
    println!("{}  {}", "Dataset:".cyan(), dataset.name.green());
    println!("{}  {}", "Version:".cyan(), dataset.version);
    if !dataset.metadata.is_empty() {
        println!("{}  {} key(s)", "Metadata:".cyan(), dataset.metadata.len());
    }

    if !model.variables().is_empty() {
        println!();
        println!("{} ({})", "Variables:".cyan(), model.variables().len());
        for (name, value) in model.variables() {
            println!("  ${} = {}", name.green(), value.trim());
        }
    }

    if !model.features().is_empty() {
        println!();
        println!("{} ({})", "Features:".cyan(), model.features().len());
        for feature in model.features() {
            println!("  {}: {}", feature.name.green(), feature.data_type);
        }
    }

    if !model.connections().is_empty() {
        println!();
        println!("{} ({})", "Connections:".cyan(), model.connections().len());
        for connection in model.connections() {
            println!("  {}", describe_connection(connection));
        }
    }

    if !model.schemas().is_empty() {
        println!();
        println!("{} ({})", "Schemas:".cyan(), model.schemas().len());
        for schema in model.schemas() {
            println!(
                "  {}{}: [{}]",
                schema.name.green(),
                schema.modifier_label(),
                schema.features.join(", ")
            );
        }
    }

    if !model.queries().is_empty() {
        println!();
        println!("{} ({})", "Queries:".cyan(), model.queries().len());
        for query in model.queries() {
            println!(
                "  {} > {} ({} feature(s))",
                query.connection,
                query.schema.green(),
                query.mappings.len()
            );
        }
    }

    if !model.transforms().is_empty() {
        println!();
        println!("{} ({})", "Transforms:".cyan(), model.transforms().len());
        for transform in model.transforms() {
            println!(
                "  {} <- {}",
                transform.feature.green(),
                transform.vocabulary_source
            );
        }
    }

    if !model.hierarchies().is_empty() {
        println!();
        println!("{} ({})", "Hierarchies:".cyan(), model.hierarchies().len());
        for hierarchy in model.hierarchies() {
            println!(
                "  {} > {} ({})",
                hierarchy.parent_feature.green(),
                hierarchy.child_feature,
                hierarchy.source_table
            );
        }
    }
}

fn describe_connection(connection: &Connection) -> String {
    let mut line = connection.name.green().to_string();
    if let Some(upstream) = &connection.upstream {
        line.push_str(&format!(" from {}", upstream));
    }
    match &connection.source {
        ConnectionSource::Query(_) => line.push_str(" [query]"),
        ConnectionSource::File(path) => line.push_str(&format!(" [file {}]", path)),
        ConnectionSource::None => {}
    }
    if let Some(cache) = &connection.cache {
        line.push_str(&format!(" cache={}", cache));
    }
    if let Some(sort) = &connection.sort_column {
        line.push_str(&format!(" sort={}", sort));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_file_connection() {
        colored::control::set_override(false);
        let connection = Connection {
            name: "LABS".to_string(),
            upstream: None,
            source: ConnectionSource::File("labs.csv".to_string()),
            cache: Some("labs_cache".to_string()),
            sort_column: Some("ptid".to_string()),
        };
        assert_eq!(
            describe_connection(&connection),
            "LABS [file labs.csv] cache=labs_cache sort=ptid"
        );
    }

    #[test]
    fn test_describe_query_connection() {
        colored::control::set_override(false);
        let connection = Connection {
            name: "PATIENT_CONN".to_string(),
            upstream: Some("ROOT".to_string()),
            source: ConnectionSource::Query("select 1".to_string()),
            cache: None,
            sort_column: None,
        };
        assert_eq!(
            describe_connection(&connection),
            "PATIENT_CONN from ROOT [query]"
        );
    }
}
