//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands:
//! settings loading and the resolve/render pipeline.

use crate::error::CliError;
use gitaly_config::{
    ConfigResolver, Document, DocumentRenderer, ResolvedConfig, SettingsBuilder, SettingsTree,
};
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)] // verbose is consumed by the logger in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Settings files, in increasing precedence.
    pub settings: Vec<PathBuf>,

    /// Ignore `GITALY_*` environment overrides.
    pub no_env: bool,
}

/// Load layered settings.
///
/// Settings are merged from multiple sources with precedence:
/// 1. Environment variables (unless `--no-env`)
/// 2. Settings files, later files first
///
/// Built-in defaults are applied per path during resolution.
pub fn load_settings(global: &GlobalOptions) -> Result<SettingsTree, CliError> {
    let mut builder = SettingsBuilder::new().with_files(&global.settings);
    if global.no_env {
        builder = builder.skip_env();
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Resolve the configuration against the built-in defaults.
pub fn resolve_config(settings: &SettingsTree) -> Result<ResolvedConfig, CliError> {
    Ok(ConfigResolver::default().resolve(settings)?)
}

/// Load, resolve and render in one step.
pub fn render_document(global: &GlobalOptions) -> Result<Document, CliError> {
    let settings = load_settings(global)?;
    let config = resolve_config(&settings)?;
    Ok(DocumentRenderer::render(&config))
}
