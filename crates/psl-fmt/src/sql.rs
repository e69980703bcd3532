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

//! SQL pretty-printer for queries embedded in CONNECTION blocks.
//!
//! Formatting works on flattened text (one space between tokens) and is a
//! pure function of the token sequence, so `format(flatten(format(q)))`
//! reproduces `format(q)`.
//!
//! Indentation is a ladder of 4-space units on top of a base indent. At
//! nesting depth `d`:
//!
//! | element                         | indent            |
//! |---------------------------------|-------------------|
//! | FROM, JOIN, WHERE, GROUP/ORDER  | base + 4 + 4d     |
//! | columns, tables, ON, conditions | base + 8 + 4d     |
//! | ON conditions                   | base + 12 + 4d    |
//! | CASE / END, OVER (              | column + 4        |
//! | WHEN / ELSE, PARTITION BY       | column + 8        |
//!
//! Keywords are uppercased without regard to string literals, so
//! `'select'` inside a literal becomes `'SELECT'`.

use once_cell::sync::Lazy;
use psl_core::lex::{is_word_byte, matching_paren, starts_with_ignore_case};
use psl_core::Limits;
use regex::{Captures, Regex};

const UNIT: &str = "    ";

const SUBQUERY_OPEN: char = '\u{E000}';
const SUBQUERY_CLOSE: char = '\u{E001}';

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:ORDER\s+BY|GROUP\s+BY|PARTITION\s+BY|LEFT\s+JOIN|INNER\s+JOIN|RIGHT\s+JOIN|FULL\s+JOIN|SELECT|FROM|WHERE|AND|OR|ON|AS|DISTINCT|CAST|CASE|WHEN|THEN|ELSE|END|IS|NOT|NULL|IN|BETWEEN|LIKE|ROW_NUMBER|OVER|COALESCE)\b",
    )
    .expect("valid regex")
});

/// Trim and collapse every whitespace run, newlines included, to one space.
pub fn flatten(sql: &str) -> String {
    WHITESPACE.replace_all(sql.trim(), " ").into_owned()
}

/// Uppercase the fixed SQL keyword list, normalising the gap inside
/// two-word keywords to a single space.
pub fn uppercase_keywords(sql: &str) -> String {
    KEYWORDS
        .replace_all(sql, |caps: &Captures<'_>| {
            caps[0]
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_ascii_uppercase()
        })
        .into_owned()
}

/// Formats SQL text with a fixed base indent.
///
/// The first output line (`SELECT`) carries no indent; callers place it
/// after their own prefix, such as `QUERY = `.
///
/// # Examples
///
/// ```
/// use psl_fmt::SqlFormatter;
///
/// let sql = SqlFormatter::new("").format("select a, b from t");
/// assert_eq!(sql, "SELECT\n        a,\n        b\n    FROM\n        t");
/// ```
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    base_indent: String,
    max_depth: usize,
}

impl SqlFormatter {
    pub fn new(base_indent: impl Into<String>) -> Self {
        Self {
            base_indent: base_indent.into(),
            max_depth: Limits::default().max_sql_depth,
        }
    }

    /// Subqueries nested deeper than `max_depth` are left inline.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn base_indent(&self) -> &str {
        &self.base_indent
    }

    /// Flatten and format `sql`.
    ///
    /// Text without a top-level `SELECT ... FROM` comes back flattened and
    /// keyword-uppercased but otherwise untouched.
    pub fn format(&self, sql: &str) -> String {
        let flat = flatten(sql);
        let formatted = self.format_at_depth(&flat, 0);
        tidy(&formatted)
    }

    fn format_at_depth(&self, query: &str, depth: usize) -> String {
        let upper = uppercase_keywords(query);
        let indents = Indents::new(&self.base_indent, depth);
        let (text, subqueries) = self.extract_subqueries(&upper, depth, &indents);

        let words = words(&text, true);
        let Some(select) = words.iter().position(|w| w.is(&text, "SELECT")) else {
            return upper;
        };
        let Some(from) = words[select + 1..]
            .iter()
            .position(|w| w.is(&text, "FROM"))
            .map(|p| p + select + 1)
        else {
            tracing::trace!(depth, "SELECT without top-level FROM left as is");
            return upper;
        };

        let select = words[select];
        let from_start = words[from].start;

        let mut out = String::with_capacity(text.len() * 2);
        out.push_str(&text[..select.start]);
        out.push_str("SELECT");
        for (i, column) in split_columns(&text[select.end..from_start]).iter().enumerate() {
            out.push_str(if i == 0 { "\n" } else { ",\n" });
            out.push_str(&indents.column);
            out.push_str(&format_expression(column, &indents.column));
        }
        write_clauses(&text[from_start..], &indents, &mut out);

        for (i, formatted) in subqueries.iter().enumerate() {
            out = out.replace(&placeholder(i), formatted);
        }
        out
    }

    /// Replace each `(SELECT ...)` with a placeholder and return the
    /// subqueries formatted one level deeper, wrapped in their parentheses.
    fn extract_subqueries(
        &self,
        text: &str,
        depth: usize,
        indents: &Indents,
    ) -> (String, Vec<String>) {
        if depth >= self.max_depth || text.contains(SUBQUERY_OPEN) {
            return (text.to_string(), Vec::new());
        }

        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut subqueries = Vec::new();
        let mut quote: Option<u8> = None;
        let mut last = 0;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            if let Some(q) = quote {
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' if opens_subquery(&text[i + 1..]) => {
                    if let Some(close) = matching_paren(text, i) {
                        let inner = text[i + 1..close].trim();
                        let formatted = self.format_at_depth(inner, depth + 1);
                        out.push_str(&text[last..i]);
                        out.push_str(&placeholder(subqueries.len()));
                        subqueries.push(format!(
                            "(\n{}{}\n{})",
                            indents.column, formatted, indents.clause
                        ));
                        i = close + 1;
                        last = i;
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        out.push_str(&text[last..]);
        (out, subqueries)
    }
}

impl Default for SqlFormatter {
    fn default() -> Self {
        Self::new("")
    }
}

struct Indents {
    clause: String,
    column: String,
    condition: String,
}

impl Indents {
    fn new(base: &str, depth: usize) -> Self {
        let nest = UNIT.repeat(depth);
        Self {
            clause: format!("{}{}{}", base, UNIT, nest),
            column: format!("{}{}{}", base, UNIT.repeat(2), nest),
            condition: format!("{}{}{}", base, UNIT.repeat(3), nest),
        }
    }
}

fn placeholder(index: usize) -> String {
    format!("{}{}{}", SUBQUERY_OPEN, index, SUBQUERY_CLOSE)
}

fn opens_subquery(after_paren: &str) -> bool {
    let rest = after_paren.trim_start();
    starts_with_ignore_case(rest, "SELECT")
        && rest.as_bytes().get(6).map_or(true, |&b| !is_word_byte(b))
}

/// Drop whitespace-only lines and trailing blanks.
fn tidy(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
    /// Preceded by `.`, i.e. a qualified column name rather than a keyword.
    qualified: bool,
}

impl Word {
    fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.start..self.end]
    }

    fn is(&self, source: &str, keyword: &str) -> bool {
        !self.qualified && self.text(source).eq_ignore_ascii_case(keyword)
    }
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Word(Word),
    Comma(usize),
}

/// Words and commas outside quoted literals. With `top_level`, tokens
/// inside parentheses are skipped.
fn scan(text: &str, top_level: bool) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        let visible = !top_level || depth == 0;
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if visible => tokens.push(Token::Comma(i)),
            _ if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                if visible {
                    tokens.push(Token::Word(Word {
                        start,
                        end: i,
                        qualified: start > 0 && bytes[start - 1] == b'.',
                    }));
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    tokens
}

fn words(text: &str, top_level: bool) -> Vec<Word> {
    scan(text, top_level)
        .into_iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w),
            Token::Comma(_) => None,
        })
        .collect()
}

/// Split a SELECT list on commas outside parentheses and CASE expressions.
fn split_columns(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut case_depth = 0usize;
    let mut last = 0;

    for token in scan(text, true) {
        match token {
            Token::Word(w) if w.is(text, "CASE") => case_depth += 1,
            Token::Word(w) if w.is(text, "END") => case_depth = case_depth.saturating_sub(1),
            Token::Comma(at) if case_depth == 0 => {
                parts.push(text[last..at].trim());
                last = at + 1;
            }
            _ => {}
        }
    }

    let tail = text[last..].trim();
    if !tail.is_empty() || !parts.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Split a condition on top-level `AND`s, leaving `BETWEEN x AND y` and
/// CASE expressions intact.
fn split_conditions(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut case_depth = 0usize;
    let mut between = false;
    let mut last = 0;

    for w in words(text, true) {
        if w.is(text, "CASE") {
            case_depth += 1;
        } else if w.is(text, "END") {
            case_depth = case_depth.saturating_sub(1);
        } else if w.is(text, "BETWEEN") {
            between = true;
        } else if w.is(text, "AND") && case_depth == 0 {
            if between {
                between = false;
            } else {
                parts.push(text[last..w.start].trim());
                last = w.end;
            }
        }
    }
    parts.push(text[last..].trim());
    parts
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    From,
    Join(String),
    On,
    Where,
    GroupBy,
    OrderBy,
    Having,
}

/// Clause keywords at the top level of `text`: (keyword start, keyword
/// end, clause).
fn clause_marks(text: &str) -> Vec<(usize, usize, Clause)> {
    let words = words(text, true);
    let upper: Vec<String> = words
        .iter()
        .map(|w| {
            if w.qualified {
                String::new()
            } else {
                w.text(text).to_ascii_uppercase()
            }
        })
        .collect();
    let at = |k: usize| upper.get(k).map(String::as_str);

    let mut marks = Vec::new();
    let mut k = 0;
    while k < words.len() {
        let (clause, len) = match upper[k].as_str() {
            "FROM" => (Some(Clause::From), 1),
            "ON" => (Some(Clause::On), 1),
            "WHERE" => (Some(Clause::Where), 1),
            "HAVING" => (Some(Clause::Having), 1),
            "JOIN" => (Some(Clause::Join("JOIN".to_string())), 1),
            "GROUP" if at(k + 1) == Some("BY") => (Some(Clause::GroupBy), 2),
            "ORDER" if at(k + 1) == Some("BY") => (Some(Clause::OrderBy), 2),
            kind @ ("LEFT" | "RIGHT" | "FULL" | "INNER" | "CROSS") => {
                if at(k + 1) == Some("JOIN") {
                    (Some(Clause::Join(format!("{} JOIN", kind))), 2)
                } else if at(k + 1) == Some("OUTER") && at(k + 2) == Some("JOIN") {
                    (Some(Clause::Join(format!("{} OUTER JOIN", kind))), 3)
                } else {
                    (None, 1)
                }
            }
            _ => (None, 1),
        };
        if let Some(clause) = clause {
            marks.push((words[k].start, words[k + len - 1].end, clause));
        }
        k += len;
    }
    marks
}

/// Emit everything from the top-level FROM onwards.
fn write_clauses(text: &str, indents: &Indents, out: &mut String) {
    let marks = clause_marks(text);
    for (i, (_, keyword_end, clause)) in marks.iter().enumerate() {
        let body_end = marks.get(i + 1).map_or(text.len(), |m| m.0);
        let body = text[*keyword_end..body_end].trim();

        match clause {
            Clause::From => {
                push_block(out, &indents.clause, "FROM", &indents.column, body);
            }
            Clause::Join(keyword) => {
                out.push('\n');
                out.push_str(&indents.clause);
                out.push_str(keyword);
                if !body.is_empty() {
                    out.push(' ');
                    out.push_str(&format_expression(body, &indents.column));
                }
            }
            Clause::On => {
                out.push('\n');
                out.push_str(&indents.column);
                out.push_str("ON\n");
                out.push_str(&indents.condition);
                out.push_str(&format_conditions(body, &indents.condition));
            }
            Clause::Where => {
                out.push('\n');
                out.push_str(&indents.clause);
                out.push_str("WHERE\n");
                out.push_str(&indents.column);
                out.push_str(&format_conditions(body, &indents.column));
            }
            Clause::GroupBy => push_block(out, &indents.clause, "GROUP BY", &indents.column, body),
            Clause::OrderBy => push_block(out, &indents.clause, "ORDER BY", &indents.column, body),
            Clause::Having => push_block(out, &indents.clause, "HAVING", &indents.column, body),
        }
    }
}

fn push_block(out: &mut String, keyword_indent: &str, keyword: &str, body_indent: &str, body: &str) {
    out.push('\n');
    out.push_str(keyword_indent);
    out.push_str(keyword);
    out.push('\n');
    out.push_str(body_indent);
    out.push_str(&format_expression(body, body_indent));
}

fn format_conditions(body: &str, indent: &str) -> String {
    split_conditions(body)
        .into_iter()
        .map(|c| format_expression(c, indent))
        .collect::<Vec<_>>()
        .join(&format!("\n{}AND ", indent))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Lay out OVER windows and CASE expressions inside one column or
/// condition.
fn format_expression(expr: &str, column_indent: &str) -> String {
    let windowed = format_over(expr, column_indent);
    format_case(&windowed, column_indent)
}

fn format_over(expr: &str, column_indent: &str) -> String {
    let over_indent = format!("{}{}", column_indent, UNIT);
    let partition_indent = format!("{}{}", over_indent, UNIT);

    let mut out = String::with_capacity(expr.len() + 64);
    let mut last = 0;
    for w in words(expr, false) {
        if w.start < last || !w.is(expr, "OVER") {
            continue;
        }
        let rest = &expr[w.end..];
        let open = w.end + (rest.len() - rest.trim_start().len());
        let Some(close) = matching_paren(expr, open) else {
            continue;
        };
        let (partition, order) = split_order_by(expr[open + 1..close].trim());

        out.push_str(expr[last..w.start].trim_end());
        out.push('\n');
        out.push_str(&over_indent);
        out.push_str("OVER (");
        if !partition.is_empty() {
            out.push('\n');
            out.push_str(&partition_indent);
            out.push_str(partition);
        }
        if let Some(order) = order {
            out.push('\n');
            out.push_str(&partition_indent);
            out.push_str("ORDER BY\n");
            out.push_str(&partition_indent);
            out.push_str(UNIT);
            out.push_str(order);
        }
        out.push('\n');
        out.push_str(&over_indent);
        out.push(')');
        last = close + 1;
    }
    out.push_str(&expr[last..]);
    out
}

/// Split a window specification at its top-level `ORDER BY`.
fn split_order_by(window: &str) -> (&str, Option<&str>) {
    let words = words(window, true);
    for pair in words.windows(2) {
        if pair[0].is(window, "ORDER") && pair[1].is(window, "BY") {
            return (
                window[..pair[0].start].trim(),
                Some(window[pair[1].end..].trim()),
            );
        }
    }
    (window, None)
}

fn format_case(expr: &str, column_indent: &str) -> String {
    let case_indent = format!("{}{}", column_indent, UNIT);
    let branch_indent = format!("{}{}", case_indent, UNIT);

    let mut out = String::with_capacity(expr.len() + 64);
    let mut last = 0;
    for w in words(expr, false) {
        let indent = if w.is(expr, "CASE") || w.is(expr, "END") {
            &case_indent
        } else if w.is(expr, "WHEN") || w.is(expr, "ELSE") {
            &branch_indent
        } else {
            continue;
        };
        out.push_str(expr[last..w.start].trim_end());
        out.push('\n');
        out.push_str(indent);
        out.push_str(&w.text(expr).to_ascii_uppercase());
        last = w.end;
    }
    out.push_str(&expr[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(sql: &str) -> String {
        SqlFormatter::new("").format(sql)
    }

    // ==================== Flatten tests ====================

    #[test]
    fn test_flatten_collapses_newlines_and_tabs() {
        assert_eq!(flatten("  select a,\n\tb\r\n  from t  "), "select a, b from t");
    }

    #[test]
    fn test_flatten_empty() {
        assert_eq!(flatten("   \n "), "");
    }

    // ==================== Keyword tests ====================

    #[test]
    fn test_uppercase_whole_words_only() {
        assert_eq!(
            uppercase_keywords("select fromage from orders order  by id"),
            "SELECT fromage FROM orders ORDER BY id"
        );
    }

    #[test]
    fn test_uppercase_reaches_into_literals() {
        assert_eq!(uppercase_keywords("where x = 'and'"), "WHERE x = 'AND'");
    }

    // ==================== Column tests ====================

    #[test]
    fn test_simple_select() {
        assert_eq!(
            fmt("select a, b from t"),
            "SELECT\n        a,\n        b\n    FROM\n        t"
        );
    }

    #[test]
    fn test_commas_inside_functions_do_not_split() {
        let out = fmt("select coalesce(a, b) as c, d from t");
        assert!(out.contains("\n        COALESCE(a, b) AS c,\n        d\n"));
    }

    #[test]
    fn test_commas_inside_literals_do_not_split() {
        let out = fmt("select 'x, y' as lit from t");
        assert!(out.contains("\n        'x, y' AS lit\n"));
    }

    #[test]
    fn test_no_from_is_left_unchanged() {
        assert_eq!(fmt("select 1 + 1"), "SELECT 1 + 1");
        assert_eq!(fmt("not sql at all"), "NOT sql at all");
    }

    #[test]
    fn test_no_from_keeps_where_on_one_line() {
        assert_eq!(
            crate::format_sql("select a where b = 1 and c = 2", ""),
            "SELECT a WHERE b = 1 AND c = 2"
        );
    }

    // ==================== Clause tests ====================

    #[test]
    fn test_where_splits_top_level_and() {
        assert_eq!(
            fmt("select a from t where a between 1 and 2 and b = 3 or c = 4"),
            "SELECT\n        a\n    FROM\n        t\n    WHERE\n        a BETWEEN 1 AND 2\n        AND b = 3 OR c = 4"
        );
    }

    #[test]
    fn test_where_keeps_parenthesised_and() {
        let out = fmt("select a from t where (x = 1 and y = 2) and z = 3");
        assert!(out.ends_with("WHERE\n        (x = 1 AND y = 2)\n        AND z = 3"));
    }

    #[test]
    fn test_join_and_on_ladder() {
        assert_eq!(
            fmt("select a.x from a inner join b on a.id = b.id and a.k = b.k"),
            "SELECT\n        a.x\n    FROM\n        a\n    INNER JOIN b\n        ON\n            a.id = b.id\n            AND a.k = b.k"
        );
    }

    #[test]
    fn test_outer_join_keyword() {
        let out = fmt("select a from t left outer join u on t.id = u.id");
        assert!(out.contains("\n    LEFT OUTER JOIN u\n"));
    }

    #[test]
    fn test_group_and_order_by() {
        assert_eq!(
            fmt("select a, count(*) from t group by a order by a desc"),
            "SELECT\n        a,\n        count(*)\n    FROM\n        t\n    GROUP BY\n        a\n    ORDER BY\n        a desc"
        );
    }

    #[test]
    fn test_qualified_keyword_lookalike_is_not_a_clause() {
        let out = fmt("select t.on from t");
        assert!(out.contains("\n        t.ON\n"));
    }

    // ==================== Subquery tests ====================

    #[test]
    fn test_join_subquery_at_base_indent_four() {
        let out = SqlFormatter::new("    ")
            .format("SELECT a, b FROM t1 LEFT JOIN (SELECT x FROM t2) e ON t1.id = e.id");
        let expected = [
            "SELECT",
            "            a,",
            "            b",
            "        FROM",
            "            t1",
            "        LEFT JOIN (",
            "            SELECT",
            "                x",
            "            FROM",
            "                t2",
            "        ) e",
            "            ON",
            "                t1.id = e.id",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_subquery_in_select_list() {
        let out = fmt("select (select max(v) from w) as m from t");
        assert!(out.starts_with("SELECT\n        (\n        SELECT\n            max(v)\n        FROM\n            w\n    ) AS m\n    FROM"));
    }

    #[test]
    fn test_depth_limit_leaves_subquery_inline() {
        let out = SqlFormatter::new("")
            .with_max_depth(0)
            .format("select a from (select a from t) s");
        assert!(out.ends_with("FROM\n        (SELECT a FROM t) s"));
    }

    #[test]
    fn test_unbalanced_subquery_is_not_extracted() {
        let out = fmt("select a from (select b from t");
        assert!(out.contains("(SELECT b FROM t"));
    }

    // ==================== CASE / OVER tests ====================

    #[test]
    fn test_case_layout() {
        assert_eq!(
            fmt("select id, case when x = 1 then 'a' else 'b' end as k from t"),
            "SELECT\n        id,\n            CASE\n                WHEN x = 1 THEN 'a'\n                ELSE 'b'\n            END AS k\n    FROM\n        t"
        );
    }

    #[test]
    fn test_commas_inside_case_do_not_split() {
        let out = fmt("select case when a in (1, 2) then coalesce(b, c) end, d from t");
        assert!(out.contains("END,\n        d\n"));
    }

    #[test]
    fn test_over_layout() {
        assert_eq!(
            fmt("select row_number() over (partition by p order by d desc) as rn from t"),
            "SELECT\n        ROW_NUMBER()\n            OVER (\n                PARTITION BY p\n                ORDER BY\n                    d desc\n            ) AS rn\n    FROM\n        t"
        );
    }

    #[test]
    fn test_over_without_order() {
        let out = fmt("select count(*) over(partition by p) from t");
        assert!(out.contains("OVER (\n                PARTITION BY p\n            )\n"));
    }

    // ==================== Stability tests ====================

    #[test]
    fn test_reformatting_is_stable() {
        let queries = [
            "select a, b from t1 left join (select x, row_number() over (partition by x order by y) rn from t2 where y > 0) e on t1.id = e.id where t1.z between 1 and 5 and e.rn = 1",
            "select case when a = 1 then 'x' when a = 2 then 'y' else null end as c from t order by c",
            "select a from (select a from (select a from t) i) o",
        ];
        for q in queries {
            let once = fmt(q);
            assert_eq!(fmt(&once), once, "unstable for {}", q);
        }
    }
}
