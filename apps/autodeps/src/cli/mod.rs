//! # autodeps CLI Module
//!
//! This module implements the CLI interface for autodeps.
//!
//! ## Available Commands
//!
//! - `analyze` - Annotate a model with depends-on lists
//! - `order` - Print the evaluation order
//! - `check` - Validate a model (duplicates, cycles) without output
//! - `graph` - Print the dependency graph

mod commands;

use crate::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// autodeps - dependency sorter for service models
///
/// Works out which model entries consume which other entries' results,
/// orders them, and records the dependencies on the model.
#[derive(Parser, Debug)]
#[command(name = "autodeps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a model and attach depends-on annotations
    Analyze {
        /// Path to the model document
        #[arg(short, long)]
        file: PathBuf,

        /// Document format (json, toml); defaults to the file extension
        #[arg(short = 't', long)]
        format: Option<String>,

        /// Write the annotated model (JSON) to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the evaluation order of a model
    Order {
        /// Path to the model document
        #[arg(short, long)]
        file: PathBuf,

        /// Document format (json, toml); defaults to the file extension
        #[arg(short = 't', long)]
        format: Option<String>,
    },

    /// Validate a model; exits non-zero on duplicates or cycles
    Check {
        /// Path to the model document
        #[arg(short, long)]
        file: PathBuf,

        /// Document format (json, toml); defaults to the file extension
        #[arg(short = 't', long)]
        format: Option<String>,
    },

    /// Print the dependency graph of a model
    Graph {
        /// Path to the model document
        #[arg(short, long)]
        file: PathBuf,

        /// Document format (json, toml); defaults to the file extension
        #[arg(short = 't', long)]
        format: Option<String>,
    },
}

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let mode = OutputMode {
        json: cli.json_mode,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Analyze {
            file,
            format,
            output,
        } => cmd_analyze(mode, &file, format.as_deref(), output.as_deref()),
        Commands::Order { file, format } => cmd_order(mode, &file, format.as_deref()),
        Commands::Check { file, format } => cmd_check(mode, &file, format.as_deref()),
        Commands::Graph { file, format } => cmd_graph(mode, &file, format.as_deref()),
    }
}
