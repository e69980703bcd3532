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

//! Lexical helpers shared by the parser, the validator and the formatters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[^\n]*").expect("valid regex"));

static HIERARCHY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#-+\s*hier").expect("valid regex"));

/// Remove every `#` line comment.
///
/// Quoting is not considered: a `#` inside a string literal starts a
/// comment as well.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    LINE_COMMENT.replace_all(text, "")
}

/// Whether `line` is the comment line that opens the hierarchy section
/// (`#---hier---` and its variants).
pub fn is_hierarchy_marker(line: &str) -> bool {
    HIERARCHY_MARKER.is_match(line.trim())
}

/// Index of the first hierarchy marker line in `lines`, if any.
pub fn find_hierarchy_marker<'a, I>(lines: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().position(is_hierarchy_marker)
}

/// Byte index of the `)` matching the `(` at `open`.
///
/// Returns `None` when `open` is not a `(` or the parenthesis is never
/// closed.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Smallest char boundary of `text` that is `>= index`.
pub fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// `true` for bytes that belong to a `\w` word in ASCII text.
#[inline]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// ASCII case-insensitive `starts_with`.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Comment stripping tests ====================

    #[test]
    fn test_strip_comments_removes_to_end_of_line() {
        let text = "FEATURE A, a, STRING # trailing\n# full line\nB";
        assert_eq!(strip_comments(text), "FEATURE A, a, STRING \n\nB");
    }

    #[test]
    fn test_strip_comments_ignores_quotes() {
        assert_eq!(strip_comments("X = \"a#b\""), "X = \"a");
    }

    #[test]
    fn test_strip_comments_borrows_when_clean() {
        assert!(matches!(strip_comments("no comments"), Cow::Borrowed(_)));
    }

    // ==================== Hierarchy marker tests ====================

    #[test]
    fn test_hierarchy_marker_variants() {
        assert!(is_hierarchy_marker("#---hier---"));
        assert!(is_hierarchy_marker("  #------ HIERARCHIES"));
        assert!(is_hierarchy_marker("#-hier"));
        assert!(!is_hierarchy_marker("# hier"));
        assert!(!is_hierarchy_marker("#-----PERSON-----"));
    }

    #[test]
    fn test_find_hierarchy_marker_first_wins() {
        let lines = ["a", "#---hier---", "b", "#---hier---"];
        assert_eq!(find_hierarchy_marker(lines), Some(1));
        assert_eq!(find_hierarchy_marker(["a", "b"]), None);
    }

    // ==================== Paren matching tests ====================

    #[test]
    fn test_matching_paren_nested() {
        let text = "x (a (b) c) d";
        assert_eq!(matching_paren(text, 2), Some(10));
        assert_eq!(matching_paren(text, 5), Some(7));
    }

    #[test]
    fn test_matching_paren_unclosed() {
        assert_eq!(matching_paren("(a (b)", 0), None);
    }

    #[test]
    fn test_matching_paren_not_a_paren() {
        assert_eq!(matching_paren("abc", 1), None);
        assert_eq!(matching_paren("abc", 10), None);
    }

    // ==================== Misc helper tests ====================

    #[test]
    fn test_ceil_char_boundary() {
        let text = "aé b";
        assert_eq!(ceil_char_boundary(text, 2), 3);
        assert_eq!(ceil_char_boundary(text, 1), 1);
        assert_eq!(ceil_char_boundary(text, 99), text.len());
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("select x", "SELECT"));
        assert!(!starts_with_ignore_case("sel", "SELECT"));
    }

    #[test]
    fn test_is_word_byte() {
        assert!(is_word_byte(b'a'));
        assert!(is_word_byte(b'_'));
        assert!(is_word_byte(b'9'));
        assert!(!is_word_byte(b'.'));
    }
}
