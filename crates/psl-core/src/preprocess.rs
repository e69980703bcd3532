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

//! Input preprocessing shared by all entry points.

use crate::error::{PslError, PslResult};
use crate::limits::Limits;
use std::borrow::Cow;

/// Check `input` against `limits` and normalize it for processing.
///
/// A leading byte-order mark is dropped and CRLF line endings become LF.
/// Tabs, line feeds and carriage returns are the only control characters
/// accepted.
pub fn preprocess<'a>(input: &'a str, limits: &Limits) -> PslResult<Cow<'a, str>> {
    if input.len() > limits.max_input_size {
        return Err(PslError::security(
            format!("input too large: exceeds limit of {} bytes", limits.max_input_size),
            0,
        ));
    }

    let text = input.strip_prefix('\u{FEFF}').unwrap_or(input);

    let mut line_num = 1;
    let mut line_len = 0usize;
    for b in text.bytes() {
        if b == b'\n' {
            line_num += 1;
            line_len = 0;
            continue;
        }
        line_len += 1;
        if line_len > limits.max_line_length {
            return Err(PslError::security(
                format!("line too long: exceeds limit of {} bytes", limits.max_line_length),
                line_num,
            ));
        }
        if b < 0x20 && b != b'\t' && b != b'\r' {
            return Err(PslError::syntax(
                format!("control character U+{:04X} not allowed", b),
                line_num,
            ));
        }
    }

    if text.contains("\r\n") {
        Ok(Cow::Owned(text.replace("\r\n", "\n")))
    } else {
        Ok(Cow::Borrowed(text))
    }
}

/// Decode raw bytes as UTF-8 and preprocess them.
pub fn preprocess_bytes(input: &[u8], limits: &Limits) -> PslResult<String> {
    let text = std::str::from_utf8(input).map_err(|e| {
        let line = input[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1;
        PslError::syntax(format!("invalid UTF-8 encoding: {}", e), line)
    })?;
    preprocess(text, limits).map(Cow::into_owned)
}
