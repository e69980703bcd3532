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

//! Masking of regions the config normalizer must not touch.
//!
//! Each protected block is replaced by a token of the form
//! `__PSL_<KIND>_<n>__`. The token prefix is lengthened with extra
//! underscores until it does not occur anywhere in the document, so tokens
//! never collide with user text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static VARIABLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)VARIABLE\s+\w+\s*\{[^}]*\}").expect("valid regex"));

static HIERARCHY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)#-+\s*hier.*").expect("valid regex"));

static QUERY_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(QUERY)\s*=").expect("valid regex"));

const TOKEN_PREFIX: &str = "__PSL_";

/// Category of a protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `VARIABLE NAME { ... }`, restored verbatim.
    Variable,
    /// From the `#---hier---` marker to the end of the document, restored
    /// verbatim.
    Hierarchy,
    /// `QUERY = ...` up to the line holding the block's closing brace,
    /// restored with its SQL reformatted.
    Sql,
}

impl BlockKind {
    fn tag(self) -> &'static str {
        match self {
            BlockKind::Variable => "VARIABLE",
            BlockKind::Hierarchy => "HIER",
            BlockKind::Sql => "SQL",
        }
    }

    /// Byte ranges of every block of this kind, in document order.
    pub fn find(self, text: &str) -> Vec<Range<usize>> {
        match self {
            BlockKind::Variable => VARIABLE_BLOCK.find_iter(text).map(|m| m.range()).collect(),
            BlockKind::Hierarchy => HIERARCHY_TAIL.find(text).map(|m| m.range()).into_iter().collect(),
            BlockKind::Sql => find_sql_blocks(text),
        }
    }
}

/// `QUERY = <sql>` spans. The SQL runs to the first newline whose next
/// non-blank character is `}`; that newline is not part of the span.
fn find_sql_blocks(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(head) = QUERY_HEAD.find_at(text, from) {
        let Some(len) = closing_line_offset(&text[head.end()..]) else {
            break;
        };
        let end = head.end() + len;
        spans.push(head.start()..end);
        from = end;
    }
    spans
}

fn closing_line_offset(rest: &str) -> Option<usize> {
    rest.match_indices('\n')
        .map(|(i, _)| i)
        .find(|&i| rest[i..].trim_start().starts_with('}'))
}

/// Split a SQL block into the `QUERY` keyword as written and the SQL text
/// after `=`.
pub(crate) fn split_sql_block(block: &str) -> Option<(&str, &str)> {
    let caps = QUERY_HEAD.captures(block)?;
    let keyword = caps.get(1)?.as_str();
    let head = caps.get(0)?;
    Some((keyword, &block[head.end()..]))
}

/// One masked region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBlock {
    pub kind: BlockKind,
    /// Position among blocks of the same kind.
    pub index: usize,
    pub original: String,
}

/// Replaces protected regions with placeholder tokens and puts them back.
///
/// # Examples
///
/// ```
/// use psl_fmt::{BlockKind, BlockProtector};
///
/// let doc = "VARIABLE V {  keep   me }\nA=1";
/// let mut protector = BlockProtector::new(doc);
/// let masked = protector.protect(doc, BlockKind::Variable);
/// assert_eq!(masked, "__PSL_VARIABLE_0__\nA=1");
/// assert_eq!(protector.restore_verbatim(&masked, BlockKind::Variable), doc);
/// ```
#[derive(Debug, Clone)]
pub struct BlockProtector {
    prefix: String,
    blocks: Vec<ProtectedBlock>,
}

impl BlockProtector {
    /// Create a protector whose token prefix does not occur in `document`.
    pub fn new(document: &str) -> Self {
        let mut prefix = TOKEN_PREFIX.to_string();
        while document.contains(&prefix) {
            prefix.insert(0, '_');
        }
        Self {
            prefix,
            blocks: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn token(&self, kind: BlockKind, index: usize) -> String {
        format!("{}{}_{}__", self.prefix, kind.tag(), index)
    }

    /// Whether `line` holds a placeholder and must be passed through as is.
    pub fn is_protected_line(&self, line: &str) -> bool {
        line.contains(&self.prefix)
    }

    /// Whether `line`, once trimmed, starts with a placeholder.
    pub fn starts_with_token(&self, line: &str) -> bool {
        line.trim_start().starts_with(&self.prefix)
    }

    /// Mask every block of `kind` in `text`.
    pub fn protect(&mut self, text: &str, kind: BlockKind) -> String {
        let spans = kind.find(text);
        if spans.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (index, span) in spans.into_iter().enumerate() {
            out.push_str(&text[last..span.start]);
            out.push_str(&self.token(kind, index));
            self.blocks.push(ProtectedBlock {
                kind,
                index,
                original: text[span.clone()].to_string(),
            });
            last = span.end;
        }
        out.push_str(&text[last..]);
        tracing::trace!(kind = kind.tag(), count = self.count(kind), "protected blocks");
        out
    }

    /// Blocks of `kind`, in index order.
    pub fn blocks(&self, kind: BlockKind) -> impl Iterator<Item = &ProtectedBlock> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks(kind).count()
    }

    /// Replace the tokens of `kind` with `render(block)`, in index order.
    pub fn restore<F>(&self, text: &str, kind: BlockKind, mut render: F) -> String
    where
        F: FnMut(&ProtectedBlock) -> String,
    {
        let mut out = text.to_string();
        for block in self.blocks(kind) {
            out = out.replace(&self.token(kind, block.index), &render(block));
        }
        out
    }

    pub fn restore_verbatim(&self, text: &str, kind: BlockKind) -> String {
        self.restore(text, kind, |b| b.original.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Span tests ====================

    #[test]
    fn test_variable_spans() {
        let text = "VARIABLE A { x }\nFOO\nvariable b {y}";
        let spans = BlockKind::Variable.find(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[1].clone()], "variable b {y}");
    }

    #[test]
    fn test_hierarchy_tail_runs_to_end() {
        let text = "A {\n}\n#---- HIERARCHIES ----\nHIERARCHY FROM X {\n}\n";
        let spans = BlockKind::Hierarchy.find(text);
        assert_eq!(spans.len(), 1);
        assert!(text[spans[0].clone()].starts_with("#---- HIERARCHIES"));
        assert_eq!(spans[0].end, text.len());
    }

    #[test]
    fn test_sql_span_stops_before_closing_line() {
        let text = "CONNECTION C FROM R {\n  QUERY = select a\n    from t\n}\nNEXT";
        let spans = BlockKind::Sql.find(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], "QUERY = select a\n    from t");
    }

    #[test]
    fn test_sql_span_empty_query() {
        let text = "CONNECTION C FROM R {\n  QUERY =\n}";
        let spans = BlockKind::Sql.find(text);
        assert_eq!(&text[spans[0].clone()], "QUERY =");
    }

    #[test]
    fn test_sql_span_requires_closing_brace() {
        assert!(BlockKind::Sql.find("QUERY = select a from t").is_empty());
    }

    #[test]
    fn test_split_sql_block_keeps_keyword_case() {
        assert_eq!(split_sql_block("query= select 1"), Some(("query", " select 1")));
        assert_eq!(split_sql_block("no sql here"), None);
    }

    #[test]
    fn test_query_block_header_is_not_sql() {
        assert!(BlockKind::Sql.find("QUERY S FROM C {\n A = *a*\n}").is_empty());
    }

    // ==================== Token tests ====================

    #[test]
    fn test_prefix_avoids_user_text() {
        let doc = "A = __PSL_SQL_0__";
        let protector = BlockProtector::new(doc);
        assert_eq!(protector.prefix(), "___PSL_");
        assert!(!doc.contains(&protector.token(BlockKind::Sql, 0)));
    }

    #[test]
    fn test_tokens_with_shared_digits_restore_independently() {
        let doc: String = (0..12).map(|i| format!("VARIABLE V{} {{ {} }}\n", i, i)).collect();
        let mut protector = BlockProtector::new(&doc);
        let masked = protector.protect(&doc, BlockKind::Variable);
        assert_eq!(protector.count(BlockKind::Variable), 12);
        assert_eq!(protector.restore_verbatim(&masked, BlockKind::Variable), doc);
    }

    #[test]
    fn test_restore_with_render() {
        let doc = "X\nVARIABLE V { a }";
        let mut protector = BlockProtector::new(doc);
        let masked = protector.protect(doc, BlockKind::Variable);
        let restored = protector.restore(&masked, BlockKind::Variable, |b| b.original.to_lowercase());
        assert_eq!(restored, "X\nvariable v { a }");
    }

    #[test]
    fn test_protect_without_matches_is_identity() {
        let mut protector = BlockProtector::new("plain");
        assert_eq!(protector.protect("plain", BlockKind::Sql), "plain");
        assert_eq!(protector.count(BlockKind::Sql), 0);
    }

    #[test]
    fn test_line_classification() {
        let protector = BlockProtector::new("");
        let token = protector.token(BlockKind::Hierarchy, 0);
        assert!(protector.is_protected_line(&format!("x {}", token)));
        assert!(protector.starts_with_token(&format!("   {}", token)));
        assert!(!protector.starts_with_token(&format!("x {}", token)));
    }
}
