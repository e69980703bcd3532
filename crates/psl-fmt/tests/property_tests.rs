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

//! Property-based tests for formatter stability.

use proptest::prelude::*;
use psl_fmt::{flatten, format_config, format_sql};

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("not a keyword", |s| {
        !matches!(
            s.as_str(),
            "select" | "from" | "where" | "and" | "or" | "on" | "as" | "in" | "is" | "not"
                | "null" | "case" | "when" | "then" | "else" | "end" | "over" | "join"
                | "left" | "right" | "inner" | "full" | "cross" | "outer" | "order" | "group"
                | "by" | "having" | "like" | "between" | "cast" | "distinct"
        )
    })
}

fn query() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(ident(), 1..5),
        ident(),
        proptest::option::of((ident(), ident())),
        proptest::option::of(ident()),
    )
        .prop_map(|(columns, table, join, filter)| {
            let mut sql = format!("select {} from {} t", columns.join(", "), table);
            if let Some((other, key)) = join {
                sql.push_str(&format!(
                    " left join (select {} from {}) j on t.{} = j.{}",
                    key, other, key, key
                ));
            }
            if let Some(f) = filter {
                sql.push_str(&format!(" where t.{} is not null and t.{} > 0", f, f));
            }
            sql
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: flatten then format of formatted SQL reproduces it.
    #[test]
    fn prop_sql_round_trip(sql in query()) {
        let once = format_sql(&flatten(&sql), "        ");
        let twice = format_sql(&flatten(&once), "        ");
        prop_assert_eq!(once, twice);
    }

    /// Property: formatting a formatted document changes nothing.
    #[test]
    fn prop_config_idempotent(
        name in "[A-Z][A-Z_]{0,8}",
        key in "[A-Z][A-Z_]{0,8}",
        value in "[a-z0-9]{1,8}",
        sql in query(),
        pad in "[ \t]{0,3}",
    ) {
        let doc = format!(
            "DATASET {name}{pad}{{\n{pad}{key}{pad}={pad}{value}\n}}\n\nCONNECTION C FROM R {{\n{pad}QUERY = {sql}\n}}\n",
            name = name, pad = pad, key = key, value = value, sql = sql
        );
        let once = format_config(&doc).unwrap();
        prop_assert_eq!(format_config(&once).unwrap(), once);
    }

    /// Property: arbitrary printable text formats without error and stays
    /// stable on the second pass.
    #[test]
    fn prop_config_idempotent_on_noise(doc in "[ -~\n]{0,200}") {
        let once = format_config(&doc).unwrap();
        prop_assert_eq!(format_config(&once).unwrap(), once);
    }
}
