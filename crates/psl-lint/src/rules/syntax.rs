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

//! Brace, parenthesis and comment hygiene rules.

use super::LintRule;
use crate::diagnostic::{Category, ValidationIssue};
use crate::document::{is_comment_line, starts_block, LintDocument};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#-+[\w\s]*-+$").expect("valid regex"));
static LEAKED_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(CONNECTION|SCHEMA|QUERY|TRANSFORM|HIERARCHY|TQL|CSV)\b").expect("valid regex")
});

/// How many offending lines the commented-block warning lists.
const MAX_LISTED_LINES: usize = 5;

/// Rule: every `{` has a matching `}`
pub struct BracketBalanceRule;

impl LintRule for BracketBalanceRule {
    fn id(&self) -> &str {
        "bracket-balance"
    }
    fn description(&self) -> &str {
        "All curly brackets are balanced"
    }
    fn category(&self) -> Category {
        Category::Syntax
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut stack: Vec<(usize, &str)> = Vec::new();

        for (line_no, line) in doc.all().numbered() {
            let mut quote: Option<char> = None;
            let mut prev: Option<char> = None;
            for c in line.chars() {
                let escaped = prev == Some('\\');
                match quote {
                    Some(q) => {
                        if c == q && !escaped {
                            quote = None;
                        }
                    }
                    None => match c {
                        '"' | '\'' if !escaped => quote = Some(c),
                        '{' => stack.push((line_no, line)),
                        '}' => {
                            if stack.pop().is_none() {
                                issues.push(
                                    ValidationIssue::error(
                                        Category::Syntax,
                                        "Closing bracket '}' found without matching opening bracket",
                                        self.id(),
                                    )
                                    .with_line(line_no)
                                    .with_suggestion(
                                        "Add an opening bracket '{' before this line or remove this closing bracket",
                                    )
                                    .with_snippet(line),
                                );
                            }
                        }
                        _ => {}
                    },
                }
                prev = Some(c);
            }
        }

        while let Some((line_no, line)) = stack.pop() {
            issues.push(
                ValidationIssue::error(Category::Syntax, "Opening bracket '{' never closed", self.id())
                    .with_line(line_no)
                    .with_suggestion("Add a closing bracket '}' to match this opening bracket")
                    .with_snippet(line),
            );
        }

        issues
    }
}

/// Rule: parentheses balance within each top-level block
pub struct ParenBalanceRule;

struct OpenBlock<'d> {
    keyword: &'d str,
    line_no: usize,
    line: &'d str,
    depth: i64,
    opened: bool,
    open: usize,
    close: usize,
}

impl LintRule for ParenBalanceRule {
    fn id(&self) -> &str {
        "paren-balance"
    }
    fn description(&self) -> &str {
        "Parentheses are balanced in every block"
    }
    fn category(&self) -> Category {
        Category::Syntax
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut current: Option<OpenBlock<'_>> = None;
        let mut in_comment = false;

        for (line_no, line) in doc.all().numbered() {
            let code = strip_block_comments(line, &mut in_comment);
            let trimmed = code.trim();
            if trimmed.is_empty() || is_comment_line(trimmed) {
                continue;
            }

            let starts_new = starts_block(trimmed)
                && current
                    .as_ref()
                    .map_or(true, |b| !b.opened || trimmed.ends_with('{'));
            if starts_new {
                if let Some(previous) = current.take() {
                    issues.extend(self.mismatch(&previous));
                }
                let keyword = line
                    .trim_start()
                    .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .next()
                    .unwrap_or_default();
                current = Some(OpenBlock {
                    keyword,
                    line_no,
                    line,
                    depth: 0,
                    opened: false,
                    open: 0,
                    close: 0,
                });
            }

            let Some(block) = current.as_mut() else {
                continue;
            };
            for c in trimmed.chars() {
                match c {
                    '(' => block.open += 1,
                    ')' => block.close += 1,
                    '{' => {
                        block.depth += 1;
                        block.opened = true;
                    }
                    '}' => block.depth -= 1,
                    _ => {}
                }
            }
            if block.opened && block.depth <= 0 {
                if let Some(finished) = current.take() {
                    issues.extend(self.mismatch(&finished));
                }
            }
        }

        if let Some(unfinished) = current {
            issues.extend(self.mismatch(&unfinished));
        }
        issues
    }
}

impl ParenBalanceRule {
    fn mismatch(&self, block: &OpenBlock<'_>) -> Option<ValidationIssue> {
        (block.open != block.close).then(|| {
            ValidationIssue::error(
                Category::Syntax,
                format!(
                    "Mismatched parentheses in {} block: {} opening, {} closing",
                    block.keyword, block.open, block.close
                ),
                self.id(),
            )
            .with_line(block.line_no)
            .with_suggestion("Check PSL syntax and ensure all parentheses are properly matched")
            .with_snippet(block.line)
        })
    }
}

/// The parts of `line` outside `/* ... */`, carrying the open-comment
/// state across lines.
fn strip_block_comments(line: &str, in_comment: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        if *in_comment {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_comment = false;
                }
                None => return out,
            }
        } else {
            match rest.find("/*") {
                Some(start) => {
                    out.push_str(&rest[..start]);
                    rest = &rest[start + 2..];
                    *in_comment = true;
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}

/// Rule: no PSL blocks hidden in comments
pub struct CommentedBlockRule;

impl LintRule for CommentedBlockRule {
    fn id(&self) -> &str {
        "commented-block"
    }
    fn description(&self) -> &str {
        "No commented-out PSL blocks"
    }
    fn category(&self) -> Category {
        Category::Cleanup
    }

    fn check(&self, doc: &LintDocument<'_>) -> Vec<ValidationIssue> {
        let mut offending: Vec<(usize, &str)> = Vec::new();
        let mut in_comment = false;

        for (line_no, line) in doc.all().numbered() {
            let trimmed = line.trim();
            let commented = if in_comment {
                in_comment = !trimmed.contains("*/");
                true
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                in_comment = !body.contains("*/");
                true
            } else {
                is_comment_line(trimmed)
            };

            if commented && !SEPARATOR.is_match(trimmed) && LEAKED_KEYWORD.is_match(trimmed) {
                offending.push((line_no, line));
            }
        }

        let Some(&(first_line, first)) = offending.first() else {
            return Vec::new();
        };
        let listed: Vec<String> = offending
            .iter()
            .take(MAX_LISTED_LINES)
            .map(|(n, _)| n.to_string())
            .collect();
        let mut message = format!("Commented-out PSL code on lines {}", listed.join(", "));
        if offending.len() > MAX_LISTED_LINES {
            message.push_str(&format!(" (and {} more)", offending.len() - MAX_LISTED_LINES));
        }

        vec![ValidationIssue::warning(Category::Cleanup, message, self.id())
            .with_line(first_line)
            .with_suggestion("Remove commented-out blocks; version control keeps the history")
            .with_snippet(first)]
    }
}
