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

//! Whole-document formatting.
//!
//! Pipeline: protect VARIABLE blocks, the hierarchy tail and SQL bodies;
//! normalise spacing and braces on the remaining lines; re-indent by brace
//! depth; restore SQL (reformatted), the hierarchy tail and VARIABLE
//! blocks; squeeze blank lines.

use crate::config::FormatConfig;
use crate::protect::{split_sql_block, BlockKind, BlockProtector, ProtectedBlock};
use crate::sql::SqlFormatter;
use once_cell::sync::Lazy;
use psl_core::{preprocess, PslResult};
use regex::Regex;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));
static EQUALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*=\s*").expect("valid regex"));
static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\{\s*$").expect("valid regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Formats complete PSL documents.
#[derive(Debug, Clone)]
pub struct ConfigFormatter {
    config: FormatConfig,
    sql: SqlFormatter,
}

impl Default for ConfigFormatter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl ConfigFormatter {
    pub fn new(config: FormatConfig) -> Self {
        let sql = SqlFormatter::new(config.sql_indent()).with_max_depth(config.limits.max_sql_depth);
        Self { config, sql }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format `document`.
    ///
    /// # Errors
    ///
    /// Fails only when the input breaks the configured limits or holds
    /// disallowed control characters.
    pub fn format(&self, document: &str) -> PslResult<String> {
        let text = preprocess(document, &self.config.limits)?;

        let mut protector = BlockProtector::new(&text);
        let masked = protector.protect(&text, BlockKind::Variable);
        let masked = protector.protect(&masked, BlockKind::Hierarchy);
        let masked = protector.protect(&masked, BlockKind::Sql);

        let normalized = normalize(&masked, &protector);
        let indented = self.reindent(&normalized, &protector);

        // Hierarchy text may itself hold VARIABLE tokens, so it goes back
        // before the variables do.
        let restored = protector.restore(&indented, BlockKind::Sql, |b| self.render_sql(b));
        let restored = protector.restore_verbatim(&restored, BlockKind::Hierarchy);
        let restored = protector.restore_verbatim(&restored, BlockKind::Variable);

        tracing::debug!(
            variables = protector.count(BlockKind::Variable),
            queries = protector.count(BlockKind::Sql),
            hierarchy = protector.count(BlockKind::Hierarchy) > 0,
            "formatted PSL document"
        );
        Ok(squeeze_blank_lines(&restored))
    }

    /// Indent every line by brace depth. FEATURE lines stay flush left
    /// and placeholder lines never change the depth.
    fn reindent(&self, text: &str, protector: &BlockProtector) -> String {
        let unit = self.config.indent();
        let mut level = 0usize;
        let mut out = Vec::new();

        for line in text.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                out.push(String::new());
                continue;
            }
            if protector.starts_with_token(trimmed) {
                out.push(format!("{}{}", unit.repeat(level), trimmed));
                continue;
            }
            if is_feature_line(trimmed) {
                out.push(trimmed.to_string());
                continue;
            }
            if trimmed == "}" {
                level = level.saturating_sub(1);
            }
            out.push(format!("{}{}", unit.repeat(level), trimmed));
            if trimmed.ends_with('{') {
                level += 1;
            }
        }
        out.join("\n").trim().to_string()
    }

    fn render_sql(&self, block: &ProtectedBlock) -> String {
        if !self.config.format_sql {
            return block.original.clone();
        }
        match split_sql_block(&block.original) {
            Some((keyword, sql)) => format!("{} = {}", keyword, self.sql.format(sql))
                .trim_end()
                .to_string(),
            None => block.original.clone(),
        }
    }
}

fn is_feature_line(trimmed: &str) -> bool {
    trimmed.len() >= 8 && trimmed.as_bytes()[..8].eq_ignore_ascii_case(b"FEATURE ")
}

/// Spacing and brace rules for every line that holds no placeholder.
fn normalize(text: &str, protector: &BlockProtector) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if protector.is_protected_line(line) || is_feature_line(line.trim()) {
            out.push(line.to_string());
            continue;
        }
        let line = SPACE_RUN.replace_all(line, " ");
        let line = EQUALS.replace_all(&line, "$1 = ");
        let line = OPEN_BRACE.replace(&line, " {").into_owned();

        match split_closing_braces(&line) {
            Some((head, closers)) => {
                out.push(head.to_string());
                out.extend(std::iter::repeat("}".to_string()).take(closers));
            }
            None => out.push(line),
        }
    }
    out.join("\n").trim().to_string()
}

/// Content before the trailing `}`s of a line that opens no block, and
/// how many braces were stripped.
fn split_closing_braces(line: &str) -> Option<(&str, usize)> {
    if line.contains('{') {
        return None;
    }
    let mut head = line.trim_end();
    let mut closers = 0;
    while let Some(rest) = head.strip_suffix('}') {
        head = rest.trim_end();
        closers += 1;
    }
    (closers > 0 && !head.trim().is_empty()).then_some((head, closers))
}

/// Collapse runs of blank lines to one, and inside brace blocks drop
/// blank lines that follow another blank line.
fn squeeze_blank_lines(text: &str) -> String {
    let collapsed = BLANK_RUN.replace_all(text, "\n\n");
    let mut out = Vec::new();
    let mut depth = 0i64;
    let mut last_blank = false;

    for line in collapsed.split('\n') {
        let trimmed = line.trim();
        for c in trimmed.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }
        let blank = trimmed.is_empty();
        if depth > 0 && blank && last_blank {
            continue;
        }
        out.push(line);
        last_blank = blank;
    }
    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str) -> String {
        ConfigFormatter::default().format(text).unwrap()
    }

    const MESSY: &str = "DATASET DEMO{
PRECISION=DAY
   DATASET_VERSION   =  v1 }

VARIABLE CDM {   warehouse.cdm   }
FEATURE PERSON_ID,  Patient, STRING
  FEATURE GENDER, Gender, STRING
CONNECTION P FROM ROOT   {
      CACHE=p_cache
  SORT COLUMN =ptid
  QUERY = select p.ptid, p.gender
      from $CDM.patient p
}



SCHEMA PERSON {


  PERSON_ID
  GENDER }
#---hier---
HIERARCHY FROM X {
     CHILD.CODE = C1
}
";

    // ==================== Document tests ====================

    #[test]
    fn test_messy_document() {
        let expected = [
            "DATASET DEMO {",
            "    PRECISION = DAY",
            "    DATASET_VERSION = v1",
            "}",
            "",
            "VARIABLE CDM {   warehouse.cdm   }",
            "FEATURE PERSON_ID,  Patient, STRING",
            "FEATURE GENDER, Gender, STRING",
            "CONNECTION P FROM ROOT {",
            "    CACHE = p_cache",
            "    SORT COLUMN = ptid",
            "    QUERY = SELECT",
            "                p.ptid,",
            "                p.gender",
            "            FROM",
            "                $CDM.patient p",
            "}",
            "",
            "SCHEMA PERSON {",
            "",
            "    PERSON_ID",
            "    GENDER",
            "}",
            "#---hier---",
            "HIERARCHY FROM X {",
            "     CHILD.CODE = C1",
            "}",
        ]
        .join("\n");
        assert_eq!(format(MESSY), expected);
    }

    #[test]
    fn test_formatting_twice_is_stable() {
        let once = format(MESSY);
        assert_eq!(format(&once), once);
    }

    #[test]
    fn test_sql_left_alone_when_disabled() {
        let formatter = ConfigFormatter::new(FormatConfig::new().with_format_sql(false));
        let out = formatter.format(MESSY).unwrap();
        assert!(out.contains("QUERY = select p.ptid, p.gender\n      from $CDM.patient p\n}"));
    }

    #[test]
    fn test_custom_indent_width() {
        let formatter = ConfigFormatter::new(FormatConfig::new().with_indent_width(2));
        let out = formatter.format("A {\nB {\nC = 1\n}\n}").unwrap();
        assert_eq!(out, "A {\n  B {\n    C = 1\n  }\n}");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(format("A {\r\nB=1\r\n}\r\n"), "A {\n    B = 1\n}");
    }

    #[test]
    fn test_oversized_input_fails() {
        let config = FormatConfig::new().with_limits(psl_core::Limits {
            max_input_size: 4,
            ..psl_core::Limits::default()
        });
        assert!(ConfigFormatter::new(config).format("A {\n}").is_err());
    }

    // ==================== Line rule tests ====================

    #[test]
    fn test_unbalanced_closing_brace_clamps_depth() {
        assert_eq!(format("}\n}\nA = 1"), "}\n}\nA = 1");
    }

    #[test]
    fn test_single_line_block_is_kept() {
        assert_eq!(
            format("CONNECTION F {  FILE = a.csv }"),
            "CONNECTION F { FILE = a.csv }"
        );
    }

    #[test]
    fn test_split_closing_braces() {
        assert_eq!(split_closing_braces("  X = 1 }"), Some(("  X = 1", 1)));
        assert_eq!(split_closing_braces("X } }"), Some(("X", 2)));
        assert_eq!(split_closing_braces("}"), None);
        assert_eq!(split_closing_braces("}}"), None);
        assert_eq!(split_closing_braces("A { B }"), None);
        assert_eq!(split_closing_braces("X = 1"), None);
    }

    #[test]
    fn test_stacked_closing_braces() {
        assert_eq!(
            format("A {\nB {\nC = 1 } }"),
            "A {\n    B {\n        C = 1\n    }\n}"
        );
    }

    #[test]
    fn test_feature_line_detection() {
        assert!(is_feature_line("FEATURE A, b, STRING"));
        assert!(is_feature_line("feature A, b, STRING"));
        assert!(!is_feature_line("FEATURES"));
        assert!(!is_feature_line("SOURCE.FEATURE = \"X\""));
    }

    #[test]
    fn test_squeeze_blank_lines() {
        assert_eq!(squeeze_blank_lines("A\n\n\n\nB"), "A\n\nB");
        assert_eq!(squeeze_blank_lines("A {\n  \n \n}"), "A {\n  \n}");
    }

    #[test]
    fn test_hierarchy_tail_is_verbatim() {
        let doc = "A=1\n#--- hierarchy\n  X   =   Y  \n";
        assert_eq!(format(doc), "A = 1\n#--- hierarchy\n  X   =   Y");
    }
}
