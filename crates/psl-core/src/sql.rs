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

//! Source-table attribution for columns referenced by feature mappings.
//!
//! Attribution reads the SQL text of a connection with a handful of
//! patterns. It does not parse SQL; the fallback chain in
//! [`resolve_source_table`] decides which table a column is reported under.

use crate::lex::matching_paren;
use crate::model::UNKNOWN_TABLE;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static FIRST_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)FROM\s+([\w.]+)").expect("valid regex"));

static FROM_WITH_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)FROM\s+([\w.]+)\s+(?:AS\s+)?(\w+)").expect("valid regex"));

static JOIN_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:LEFT|RIGHT|INNER|OUTER)?\s*JOIN\s+").expect("valid regex")
});

static LEADING_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:AS\s+)?(\w+)").expect("valid regex"));

static SELECT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)SELECT\s+(.+?)\s+FROM").expect("valid regex"));

static QUALIFIED_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\w+)\.(\w+)(?:\s+(?:as\s+)?(\w+))?").expect("valid regex")
});

/// Words that can follow a FROM table but are never aliases.
const NON_ALIASES: [&str; 5] = ["WHERE", "LEFT", "INNER", "RIGHT", "JOIN"];

/// Alias to table name, as declared in a query.
pub type TableAliases = BTreeMap<String, String>;

/// First table named after a `FROM`, if any.
pub fn first_from_table(query: &str) -> Option<&str> {
    FIRST_FROM
        .captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// First table named after a `FROM`, or [`UNKNOWN_TABLE`].
pub fn extract_table_from_query(query: &str) -> String {
    first_from_table(query).unwrap_or(UNKNOWN_TABLE).to_string()
}

/// Collect table aliases from `FROM table [AS] alias` occurrences and from
/// `JOIN (subquery) alias` constructs.
///
/// A join subquery's alias maps to the first FROM table inside the
/// subquery. Plain `JOIN table alias` clauses are not collected.
pub fn parse_table_aliases(query: &str) -> TableAliases {
    let mut aliases = TableAliases::new();

    for caps in FROM_WITH_ALIAS.captures_iter(query) {
        let table = &caps[1];
        let alias = &caps[2];
        if NON_ALIASES.iter().any(|w| w.eq_ignore_ascii_case(alias)) {
            continue;
        }
        aliases.insert(alias.to_string(), table.to_string());
    }

    let bytes = query.as_bytes();
    let mut i = 0;
    while i < query.len() {
        let Some(m) = JOIN_KEYWORD.find(&query[i..]) else {
            break;
        };
        let after_join = i + m.end();
        let mut pos = after_join;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if bytes.get(pos) != Some(&b'(') {
            i = after_join;
            continue;
        }

        let (subquery, end) = match matching_paren(query, pos) {
            Some(close) => (&query[pos + 1..close], close + 1),
            None => (&query[pos + 1..], query.len()),
        };

        if let Some(alias) = LEADING_ALIAS.captures(&query[end..]).map(|c| c[1].to_string()) {
            if let Some(inner) = first_from_table(subquery) {
                tracing::trace!(alias = %alias, table = inner, "join subquery alias");
                aliases.insert(alias, inner.to_string());
            }
        }
        i = end;
    }

    aliases
}

/// Alias of the SELECT projection `alias.column [AS name]` whose column or
/// output name equals `column` (ASCII case-insensitive).
pub fn find_column_alias_in_select(column: &str, query: &str) -> Option<String> {
    let select = SELECT_CLAUSE.captures(query)?.get(1)?.as_str();
    QUALIFIED_COLUMN.captures_iter(select).find_map(|caps| {
        let actual = caps.get(2).map(|m| m.as_str());
        let output = caps.get(3).map(|m| m.as_str());
        let matches = actual.map_or(false, |a| a.eq_ignore_ascii_case(column))
            || output.map_or(false, |o| o.eq_ignore_ascii_case(column));
        matches.then(|| caps[1].to_string())
    })
}

/// Table a mapped column is attributed to.
///
/// 1. `alias.col`: the table registered for `alias`, else [`UNKNOWN_TABLE`].
/// 2. A SELECT projection exposing the column through a known alias.
/// 3. The first FROM table of the query.
/// 4. [`UNKNOWN_TABLE`].
pub fn resolve_source_table(column: &str, aliases: &TableAliases, query: &str) -> String {
    if let Some((alias, _)) = column.split_once('.') {
        return aliases
            .get(alias)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TABLE.to_string());
    }

    if let Some(alias) = find_column_alias_in_select(column, query) {
        if let Some(table) = aliases.get(&alias) {
            return table.clone();
        }
    }

    extract_table_from_query(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAGNOSIS_QUERY: &str = "select d.ptid, d.diag_date, e.interaction_type \
        FROM cdm.diag d \
        LEFT JOIN (select encid, interaction_type from cdm.enc where x = 1) e ON d.encid = e.encid \
        WHERE d.ptid is not null";

    // ==================== First FROM tests ====================

    #[test]
    fn test_extract_table_from_query() {
        assert_eq!(extract_table_from_query("select * from a.b where x"), "a.b");
        assert_eq!(extract_table_from_query("select 1"), UNKNOWN_TABLE);
    }

    #[test]
    fn test_first_from_table_is_case_insensitive() {
        assert_eq!(first_from_table("SELECT x FrOm vocab.icd9"), Some("vocab.icd9"));
    }

    // ==================== Alias table tests ====================

    #[test]
    fn test_aliases_from_and_join_subquery() {
        let aliases = parse_table_aliases(DIAGNOSIS_QUERY);
        assert_eq!(aliases.get("d").map(String::as_str), Some("cdm.diag"));
        assert_eq!(aliases.get("e").map(String::as_str), Some("cdm.enc"));
    }

    #[test]
    fn test_aliases_skip_keywords() {
        let aliases = parse_table_aliases("select x from t where y = 1");
        assert!(aliases.is_empty());
        let aliases = parse_table_aliases("select x from t left join u on t.a = u.a");
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_aliases_with_as_keyword() {
        let aliases = parse_table_aliases("select m.x from s.meds AS m");
        assert_eq!(aliases.get("m").map(String::as_str), Some("s.meds"));
    }

    #[test]
    fn test_plain_join_table_is_not_an_alias() {
        let aliases = parse_table_aliases("select a.x from s.a a left join s.b b on a.id = b.id");
        assert_eq!(aliases.len(), 1);
        assert!(aliases.contains_key("a"));
    }

    #[test]
    fn test_unclosed_join_subquery_does_not_panic() {
        let aliases = parse_table_aliases("select x from s.t t join (select y from s.u");
        assert_eq!(aliases.get("t").map(String::as_str), Some("s.t"));
    }

    // ==================== SELECT alias tests ====================

    #[test]
    fn test_find_column_alias_by_column() {
        assert_eq!(
            find_column_alias_in_select("interaction_type", DIAGNOSIS_QUERY),
            Some("e".to_string())
        );
    }

    #[test]
    fn test_find_column_alias_by_output_name() {
        let query = "select rx.rxnorm as code, m.rxdate from s.presc m";
        assert_eq!(find_column_alias_in_select("CODE", query), Some("rx".to_string()));
        assert_eq!(find_column_alias_in_select("missing", query), None);
    }

    // ==================== Resolution chain tests ====================

    #[test]
    fn test_resolve_qualified_column() {
        let aliases = parse_table_aliases(DIAGNOSIS_QUERY);
        assert_eq!(resolve_source_table("d.ptid", &aliases, DIAGNOSIS_QUERY), "cdm.diag");
        assert_eq!(resolve_source_table("z.ptid", &aliases, DIAGNOSIS_QUERY), UNKNOWN_TABLE);
    }

    #[test]
    fn test_resolve_through_select_projection() {
        let aliases = parse_table_aliases(DIAGNOSIS_QUERY);
        assert_eq!(
            resolve_source_table("interaction_type", &aliases, DIAGNOSIS_QUERY),
            "cdm.enc"
        );
    }

    #[test]
    fn test_resolve_falls_back_to_first_from() {
        let query = "select rx.rxnorm as rxnorm from s.presc m left join s.ndc rx on m.ndc = rx.ndc";
        let aliases = parse_table_aliases(query);
        assert_eq!(resolve_source_table("rxnorm", &aliases, query), "s.presc");
    }

    #[test]
    fn test_resolve_unknown_without_from() {
        assert_eq!(resolve_source_table("x", &TableAliases::new(), "select 1"), UNKNOWN_TABLE);
    }
}
