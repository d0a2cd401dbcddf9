//! Main entry point for the gitaly-config CLI.
//!
//! This is the command-line interface for resolving gitaly settings into
//! `config.toml` and converging the service on disk:
//! - `render`: Print or write the rendered configuration document
//! - `resolve`: Show the resolved configuration as JSON or YAML
//! - `validate`: Check that settings resolve and render cleanly
//! - `apply`: Create directories, write the document and register the service
//! - `completions`: Generate shell completion scripts

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let _logger = gitaly_config::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        settings: cli.settings,
        no_env: cli.no_env,
    };

    let result = match cli.command {
        cli::Command::Render(cmd) => cmd.execute(&global),
        cli::Command::Resolve(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::Apply(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
