//! CLI command definitions for task-graph-engine
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::store::snapshot::default_file_name;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Task graph workflow engine CLI tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a snapshot file against the record and graph invariants
    Validate(ValidateArgs),

    /// Render a snapshot file as a task board
    Show(ShowArgs),

    /// Print the next actionable task from a snapshot file
    Next(NextArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Snapshot file to validate (.json or .json.gz)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Project name; resolves to <data_dir>/<name>.json unless --file is given
    pub project: String,

    /// Explicit snapshot file path
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format: json or markdown
    #[arg(long, default_value = "markdown")]
    pub format: String,
}

impl ShowArgs {
    /// Explicit --file wins; otherwise the canonical path under `data_dir`.
    pub fn resolve_file(&self, data_dir: &Path) -> PathBuf {
        match &self.file {
            Some(path) => path.clone(),
            None => data_dir.join(default_file_name(&self.project)),
        }
    }
}

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Project name; resolves to <data_dir>/<name>.json unless --file is given
    pub project: String,

    /// Explicit snapshot file path
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl NextArgs {
    /// Explicit --file wins; otherwise the canonical path under `data_dir`.
    pub fn resolve_file(&self, data_dir: &Path) -> PathBuf {
        match &self.file {
            Some(path) => path.clone(),
            None => data_dir.join(default_file_name(&self.project)),
        }
    }
}
