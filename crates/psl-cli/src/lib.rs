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

//! PSL CLI library.
//!
//! The `psl` binary is a thin shell around this crate. Everything it does is
//! reachable from here so the command implementations can be tested without
//! spawning a process.
//!
//! # Modules
//!
//! - [`cli`]: clap command definitions grouped by concern
//! - [`commands`]: one function per subcommand, returning `Result<(), String>`
//! - [`batch`]: parallel multi-file processing on top of `rayon`
//! - [`error`]: structured [`error::CliError`] used by the batch layer
//!
//! # Environment
//!
//! - `PSL_MAX_FILE_SIZE`: largest file (in bytes) the CLI will read, default 1 GB
//! - `PSL_LOG`: `tracing` filter directive, default `warn`

pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
