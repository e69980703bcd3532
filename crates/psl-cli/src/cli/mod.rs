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

//! Command-line definitions for the `psl` binary.
//!
//! Commands are grouped by concern and flattened into one top-level
//! namespace, so users type `psl validate`, never `psl core validate`.

mod batch;
mod core;
mod utility;

pub use self::batch::BatchCommands;
pub use self::core::CoreCommands;
pub use self::utility::UtilityCommands;

use clap::{Parser, Subcommand};

/// PSL - Pipeline Specification Language toolkit
#[derive(Parser)]
#[command(name = "psl")]
#[command(author, version, about = "PSL - Pipeline Specification Language toolkit", long_about = None)]
pub struct Cli {
    /// Enable debug logging (PSL_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Every `psl` subcommand.
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Batch(BatchCommands),

    #[command(flatten)]
    Utility(UtilityCommands),
}

impl Commands {
    /// Run the selected subcommand. `verbose` is the global `-v` flag.
    pub fn execute(self, verbose: bool) -> Result<(), String> {
        match self {
            Commands::Core(cmd) => cmd.execute(),
            Commands::Batch(cmd) => cmd.execute(verbose),
            Commands::Utility(cmd) => cmd.execute(),
        }
    }
}
