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

//! Batch processing commands.

use crate::commands;
use clap::Subcommand;

/// Commands over many PSL files at once.
///
/// Large batches run on the `rayon` thread pool automatically; `--parallel`
/// forces it for small ones. Pass the global `-v` for one line per file.
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Validate multiple PSL files
    BatchValidate {
        /// Input file paths
        #[arg(value_name = "FILES", num_args = 1..)]
        files: Vec<String>,

        /// Treat warnings as errors
        #[arg(short = 'W', long)]
        warn_error: bool,

        /// Force parallel processing
        #[arg(short, long)]
        parallel: bool,
    },
}

impl BatchCommands {
    pub fn execute(self, verbose: bool) -> Result<(), String> {
        match self {
            BatchCommands::BatchValidate {
                files,
                warn_error,
                parallel,
            } => commands::batch_validate(files, warn_error, parallel, verbose),
        }
    }
}
