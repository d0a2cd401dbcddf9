//! Build script for gitaly-config-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("gitaly-config")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve and render gitaly configuration")
        .long_about(
            "Command-line tool for resolving gitaly settings into config.toml and converging the gitaly service on disk",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .help("Settings file to load; later files take precedence")
                .value_name("PATH")
                .global(true)
                .action(clap::ArgAction::Append)
                .value_delimiter(',')
                .env("GITALY_CONFIG_SETTINGS"),
        )
        .arg(
            Arg::new("no-env")
                .long("no-env")
                .help("Ignore GITALY_* environment overrides")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("render")
                .about("Render config.toml to stdout or a file")
                .long_about("Resolve the settings and print the rendered config.toml, or write it atomically with --output"),
            Command::new("resolve")
                .about("Show the resolved configuration")
                .long_about("Print the resolved configuration as JSON or YAML"),
            Command::new("validate")
                .about("Check that the settings resolve and render")
                .long_about("Load, resolve and render the settings without writing anything"),
            Command::new("apply")
                .about("Converge the service on disk")
                .long_about("Create the gitaly directories, write config.toml and register the service with the supervisor"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("gitaly-config.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
