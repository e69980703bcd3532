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

//! Line-oriented view of a PSL document, split at the hierarchy marker.

use psl_core::lex::find_hierarchy_marker;

/// A document as the validation rules see it.
#[derive(Debug, Clone)]
pub struct LintDocument<'a> {
    lines: Vec<&'a str>,
    /// 0-based index of the hierarchy marker line
    marker: Option<usize>,
}

impl<'a> LintDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let marker = find_hierarchy_marker(lines.iter().copied());
        Self { lines, marker }
    }

    /// Every line of the document.
    pub fn all(&self) -> Section<'_> {
        Section {
            lines: &self.lines,
            first_line: 1,
        }
    }

    /// Lines before the hierarchy marker, or all lines when there is none.
    pub fn above(&self) -> Section<'_> {
        let end = self.marker.unwrap_or(self.lines.len());
        Section {
            lines: &self.lines[..end],
            first_line: 1,
        }
    }

    /// Lines after the hierarchy marker; empty when there is none.
    pub fn below(&self) -> Section<'_> {
        match self.marker {
            Some(m) => Section {
                lines: &self.lines[m + 1..],
                first_line: m + 2,
            },
            None => Section {
                lines: &[],
                first_line: self.lines.len() + 1,
            },
        }
    }

    /// 1-based line number of the hierarchy marker.
    pub fn marker_line(&self) -> Option<usize> {
        self.marker.map(|m| m + 1)
    }
}

/// A contiguous run of document lines that remembers where it starts.
#[derive(Debug, Clone, Copy)]
pub struct Section<'d> {
    lines: &'d [&'d str],
    first_line: usize,
}

impl<'d> Section<'d> {
    pub fn lines(&self) -> &'d [&'d str] {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the section holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Document line number of the line at `index`.
    pub fn line_number(&self, index: usize) -> usize {
        self.first_line + index
    }

    /// `(line number, line)` pairs.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &'d str)> + 'd {
        let first = self.first_line;
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (first + i, *line))
    }

    /// `(line number, line)` pairs, comment lines left out.
    pub fn code(&self) -> impl Iterator<Item = (usize, &'d str)> + 'd {
        self.numbered().filter(|(_, line)| !is_comment_line(line))
    }

    /// Index one past the last line of the brace block whose header sits
    /// at `start`.
    ///
    /// The block ends where the brace depth returns to zero. A header
    /// that never opens a brace ends at the next block header, or at the
    /// end of the section.
    pub fn block_end(&self, start: usize) -> usize {
        let mut depth = 0i64;
        let mut opened = false;
        for (i, line) in self.lines.iter().enumerate().skip(start) {
            if i > start && !opened && starts_block(line) {
                return i;
            }
            if is_comment_line(line) {
                continue;
            }
            for c in line.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            if opened && depth <= 0 {
                return i + 1;
            }
        }
        self.lines.len()
    }

    /// The lines of the block whose header sits at `start`.
    pub fn block(&self, start: usize) -> Section<'d> {
        Section {
            lines: &self.lines[start..self.block_end(start)],
            first_line: self.line_number(start),
        }
    }
}

/// Keywords that open a top-level PSL block.
pub const BLOCK_KEYWORDS: [&str; 9] = [
    "CONNECTION",
    "QUERY",
    "TRANSFORM",
    "SCHEMA",
    "HIERARCHY",
    "TQL",
    "CSV",
    "DATASET",
    "FEATURE",
];

/// Whether `line` starts with one of [`BLOCK_KEYWORDS`] as a whole word.
pub fn starts_block(line: &str) -> bool {
    BLOCK_KEYWORDS.iter().any(|kw| starts_with_keyword(line, kw))
}

/// Whether the first word of `line` is exactly `keyword`.
pub fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(keyword)
        && !trimmed[keyword.len()..]
            .bytes()
            .next()
            .is_some_and(psl_core::lex::is_word_byte)
}

/// `#` and `//` line comments.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "DATASET D {\n  PRECISION = DAY\n}\n#----- HIERARCHIES -----\nTQL UTILIZATION {\n}\n";

    // ==================== Section split tests ====================

    #[test]
    fn test_split_at_marker() {
        let doc = LintDocument::new(DOC);
        assert_eq!(doc.marker_line(), Some(4));
        assert_eq!(doc.above().len(), 3);
        let below: Vec<_> = doc.below().numbered().collect();
        assert_eq!(below[0], (5, "TQL UTILIZATION {"));
    }

    #[test]
    fn test_no_marker_means_everything_above() {
        let doc = LintDocument::new("A {\n}\n");
        assert_eq!(doc.marker_line(), None);
        assert_eq!(doc.above().len(), doc.all().len());
        assert!(doc.below().is_empty());
        assert!(doc.below().is_blank());
    }

    #[test]
    fn test_first_marker_wins() {
        let doc = LintDocument::new("#--- hier ---\nA\n#--- hierarchies ---\nB");
        assert_eq!(doc.marker_line(), Some(1));
        assert_eq!(doc.below().len(), 3);
    }

    #[test]
    fn test_crlf_lines() {
        let doc = LintDocument::new("A {\r\n}\r\n");
        assert_eq!(doc.all().lines()[0], "A {");
    }

    // ==================== Block tests ====================

    #[test]
    fn test_block_end_tracks_depth() {
        let doc = LintDocument::new("CONNECTION A {\n  X = { 1 }\n}\nCONNECTION B {\n}");
        let all = doc.all();
        assert_eq!(all.block_end(0), 3);
        assert_eq!(all.block(3).line_number(0), 4);
    }

    #[test]
    fn test_braceless_header_stops_at_next_block() {
        let doc = LintDocument::new("FEATURE A, a, STRING\nFEATURE B, b, STRING\n");
        assert_eq!(doc.all().block_end(0), 1);
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let doc = LintDocument::new("CONNECTION A {\n  CACHE = a\n");
        assert_eq!(doc.all().block_end(0), 3);
    }

    #[test]
    fn test_starts_block_needs_whole_word() {
        assert!(starts_block("  QUERY P FROM C {"));
        assert!(starts_block("CSV out {"));
        assert!(!starts_block("QUERYX = 1"));
        assert!(!starts_block("FEATURES"));
        assert!(!starts_block("# QUERY"));
        assert!(starts_with_keyword("HIERARCHY FROM T {", "HIERARCHY"));
        assert!(!starts_with_keyword("HIERARCHIES", "HIERARCHY"));
    }

    #[test]
    fn test_comment_lines() {
        assert!(is_comment_line("  # note"));
        assert!(is_comment_line("// note"));
        assert!(!is_comment_line("A = 1 # trailing"));
    }
}
