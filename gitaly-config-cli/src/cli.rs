//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    ApplyCommand, CompletionsCommand, RenderCommand, ResolveCommand, ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for rendering gitaly's configuration.
#[derive(Parser)]
#[command(name = "gitaly-config")]
#[command(version, about = "Resolve and render gitaly configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Settings file to load; later files take precedence
    #[arg(
        long,
        value_name = "PATH",
        global = true,
        env = "GITALY_CONFIG_SETTINGS",
        value_delimiter = ','
    )]
    pub settings: Vec<PathBuf>,

    /// Ignore GITALY_* environment overrides
    #[arg(long, global = true)]
    pub no_env: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Render config.toml to stdout or a file
    Render(RenderCommand),

    /// Show the resolved configuration
    Resolve(ResolveCommand),

    /// Check that the settings resolve and render
    Validate(ValidateCommand),

    /// Converge the service on disk
    Apply(ApplyCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
