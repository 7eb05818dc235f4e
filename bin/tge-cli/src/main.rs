// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tge
//!
//! Command-line shell for the tensor-graph model editor core.
//!
//! ## Usage
//! ```bash
//! # Inspect model structure
//! tge inspect --model model.tgph
//!
//! # Apply a JSON edit request and write the result
//! tge edit --model model.tgph --request edit.json --output edited.tgph
//!
//! # Decode a custom operator's attribute payload
//! tge custom-options --model model.tgph --subgraph 0 --operator 3
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tge",
    about = "Editor core for tensor-graph model files",
    version
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a model: print subgraphs, tensors, and operators.
    Inspect {
        /// Path to the model file.
        #[arg(short, long)]
        model: std::path::PathBuf,
    },

    /// Apply one JSON edit request to a model and write the result.
    Edit {
        /// Path to the model file.
        #[arg(short, long)]
        model: std::path::PathBuf,

        /// Path to the JSON edit request.
        #[arg(short, long)]
        request: std::path::PathBuf,

        /// Output path (defaults to editing the model file in place).
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Decode and print a custom operator's attribute payload.
    CustomOptions {
        /// Path to the model file.
        #[arg(short, long)]
        model: std::path::PathBuf,

        /// Subgraph index.
        #[arg(short, long)]
        subgraph: usize,

        /// Operator index within the subgraph.
        #[arg(short = 'p', long)]
        operator: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { model } => commands::inspect::execute(model),
        Commands::Edit {
            model,
            request,
            output,
        } => commands::edit::execute(model, request, output),
        Commands::CustomOptions {
            model,
            subgraph,
            operator,
        } => commands::custom::execute(model, subgraph, operator),
    }
}
