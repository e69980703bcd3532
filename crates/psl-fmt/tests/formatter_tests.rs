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

//! Formatting of a complete claims document.

use psl_fmt::{format_config, format_config_with_config, format_sql, FormatConfig};

const CLAIMS: &str = "DATASET CLAIMS {
  DATASET_VERSION=2024_Q3
}
VARIABLE CDM {
    warehouse.cdm
}
FEATURE ICD10, Diagnosis code, STRING
CONNECTION DIAG FROM ROOT {
CACHE = diag
SORT COLUMN = ptid
QUERY = select d.ptid, d.diag_cd,
  row_number() over (partition by d.ptid order by d.diag_date) as rn
  from $CDM.diagnosis d
  left join (select encid, visit_start from $CDM.encounter where visit_start is not null) e on d.encid = e.encid
  where d.diag_cd is not null and d.diag_date between '2020-01-01' and '2024-12-31'
}
SCHEMA DIAGNOSIS {
ICD10
}
QUERY DIAGNOSIS FROM DIAG {
PID = *d.ptid*
ICD10 = *d.diag_cd*
}
#----- HIERARCHIES -----
HIERARCHY FROM TREE {
  CHILD.CODE = C1
}
";

#[test]
fn claims_document_layout() {
    let expected = [
        "DATASET CLAIMS {",
        "    DATASET_VERSION = 2024_Q3",
        "}",
        "VARIABLE CDM {",
        "    warehouse.cdm",
        "}",
        "FEATURE ICD10, Diagnosis code, STRING",
        "CONNECTION DIAG FROM ROOT {",
        "    CACHE = diag",
        "    SORT COLUMN = ptid",
        "    QUERY = SELECT",
        "                d.ptid,",
        "                d.diag_cd,",
        "                ROW_NUMBER()",
        "                    OVER (",
        "                        PARTITION BY d.ptid",
        "                        ORDER BY",
        "                            d.diag_date",
        "                    ) AS rn",
        "            FROM",
        "                $CDM.diagnosis d",
        "            LEFT JOIN (",
        "                SELECT",
        "                    encid,",
        "                    visit_start",
        "                FROM",
        "                    $CDM.encounter",
        "                WHERE",
        "                    visit_start IS NOT NULL",
        "            ) e",
        "                ON",
        "                    d.encid = e.encid",
        "            WHERE",
        "                d.diag_cd IS NOT NULL",
        "                AND d.diag_date BETWEEN '2020-01-01' AND '2024-12-31'",
        "}",
        "SCHEMA DIAGNOSIS {",
        "    ICD10",
        "}",
        "QUERY DIAGNOSIS FROM DIAG {",
        "    PID = *d.ptid*",
        "    ICD10 = *d.diag_cd*",
        "}",
        "#----- HIERARCHIES -----",
        "HIERARCHY FROM TREE {",
        "  CHILD.CODE = C1",
        "}",
    ]
    .join("\n");
    assert_eq!(format_config(CLAIMS).unwrap(), expected);
}

#[test]
fn claims_document_is_stable() {
    let once = format_config(CLAIMS).unwrap();
    assert_eq!(format_config(&once).unwrap(), once);
}

#[test]
fn sql_base_indent_is_configurable() {
    let config = FormatConfig::builder().sql_base_indent(0).build();
    let out = format_config_with_config("C {\nQUERY = select a from t\n}", &config).unwrap();
    assert_eq!(out, "C {\n    QUERY = SELECT\n        a\n    FROM\n        t\n}");
}

#[test]
fn standalone_sql_matches_embedded_layout() {
    let embedded = format_config("C {\nQUERY = select a from t\n}").unwrap();
    let standalone = format_sql("select a from t", "        ");
    assert!(embedded.contains(&standalone));
}

#[test]
fn empty_document() {
    assert_eq!(format_config("").unwrap(), "");
    assert_eq!(format_config("\n\n\n").unwrap(), "");
}
