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

//! Property-based tests for the validation rules.

use proptest::prelude::*;
use psl_lint::{check_dataset_metadata, check_missing_brackets, Category, REQUIRED_DATASET_KEYS};

#[derive(Debug, Clone)]
enum Line {
    Open(String),
    Close,
    Text(String),
}

fn line() -> impl Strategy<Value = Line> {
    prop_oneof![
        "[A-Z]{1,6}".prop_map(Line::Open),
        Just(Line::Close),
        "[A-Za-z0-9 =*.]{0,12}".prop_map(Line::Text),
    ]
}

/// Balanced document lines, plus every insertion index at brace depth 0.
fn balanced(ops: &[Line]) -> (Vec<String>, Vec<usize>) {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut top_level = vec![0];
    for op in ops {
        match op {
            Line::Open(name) => {
                lines.push(format!("{} {{", name));
                depth += 1;
            }
            Line::Close if depth > 0 => {
                lines.push("}".to_string());
                depth -= 1;
            }
            Line::Close => lines.push(String::new()),
            Line::Text(text) => lines.push(text.clone()),
        }
        if depth == 0 {
            top_level.push(lines.len());
        }
    }
    while depth > 0 {
        lines.push("}".to_string());
        depth -= 1;
    }
    top_level.push(lines.len());
    (lines, top_level)
}

fn dataset(values: &[String], skip: Option<usize>, empty: Option<usize>) -> (String, Vec<usize>) {
    let mut text = String::from("DATASET D {\n");
    let mut key_lines = Vec::new();
    let mut line = 1;
    for (i, key) in REQUIRED_DATASET_KEYS.iter().enumerate() {
        if Some(i) == skip {
            key_lines.push(0);
            continue;
        }
        line += 1;
        key_lines.push(line);
        let value = if Some(i) == empty { "" } else { values[i].as_str() };
        text.push_str(&format!("  {} = {}\n", key, value));
    }
    text.push_str("}\n");
    (text, key_lines)
}

fn values() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Za-z0-9_.-]{1,12}", REQUIRED_DATASET_KEYS.len())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: Balanced documents produce no bracket issues.
    #[test]
    fn prop_balanced_brackets_pass(ops in proptest::collection::vec(line(), 0..40)) {
        let (lines, _) = balanced(&ops);
        prop_assert!(check_missing_brackets(&lines.join("\n")).is_empty());
    }

    /// Property: One stray `}` is reported exactly once, at its own line.
    #[test]
    fn prop_extra_closing_bracket_reported_at_its_line(
        ops in proptest::collection::vec(line(), 0..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut lines, top_level) = balanced(&ops);
        let at = *pick.get(&top_level);
        lines.insert(at, "}".to_string());

        let issues = check_missing_brackets(&lines.join("\n"));
        prop_assert_eq!(issues.len(), 1);
        prop_assert_eq!(issues[0].line(), Some(at + 1));
    }

    /// Property: A complete DATASET block passes.
    #[test]
    fn prop_complete_dataset_passes(values in values()) {
        let (text, _) = dataset(&values, None, None);
        prop_assert!(check_dataset_metadata(&text).is_empty());
    }

    /// Property: Dropping one key yields one MISSING_FIELD naming it.
    #[test]
    fn prop_missing_key_reported(values in values(), skip in 0..REQUIRED_DATASET_KEYS.len()) {
        let (text, _) = dataset(&values, Some(skip), None);
        let issues = check_dataset_metadata(&text);
        prop_assert_eq!(issues.len(), 1);
        prop_assert_eq!(issues[0].category(), Category::MissingField);
        prop_assert!(issues[0].message().ends_with(REQUIRED_DATASET_KEYS[skip]));
    }

    /// Property: Emptying one key yields one MISSING_VALUE at its line.
    #[test]
    fn prop_empty_key_reported(values in values(), empty in 0..REQUIRED_DATASET_KEYS.len()) {
        let (text, key_lines) = dataset(&values, None, Some(empty));
        let issues = check_dataset_metadata(&text);
        prop_assert_eq!(issues.len(), 1);
        prop_assert_eq!(issues[0].category(), Category::MissingValue);
        prop_assert_eq!(issues[0].line(), Some(key_lines[empty]));
    }
}
