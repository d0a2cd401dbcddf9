//! Common test utilities for integration tests.
//!
//! This module provides fixture loading and small helpers shared by the
//! gitaly-config integration tests.

use std::path::{Path, PathBuf};

use gitaly_config::{ConfigResolver, Document, DocumentRenderer, SettingsBuilder, SettingsTree};

/// Path to a settings fixture under `tests/fixtures/settings`.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("settings")
        .join(name)
}

/// Loads a fixture without consulting the process environment.
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> SettingsTree {
    SettingsBuilder::new()
        .with_file(fixture_path(name))
        .skip_env()
        .build()
        .unwrap()
}

/// Parses inline YAML settings.
#[allow(dead_code)]
pub fn settings(yaml: &str) -> SettingsTree {
    SettingsTree::from_yaml_str(yaml).unwrap()
}

/// Resolves and renders with the built-in defaults.
#[allow(dead_code)]
pub fn render(settings: &SettingsTree) -> Document {
    let config = ConfigResolver::default().resolve(settings).unwrap();
    DocumentRenderer::render(&config)
}

/// Parses a rendered document as TOML, failing the test if it is malformed.
#[allow(dead_code)]
pub fn parse_toml(doc: &Document) -> toml::Table {
    toml::from_str(doc.as_str())
        .unwrap_or_else(|e| panic!("rendered document is not valid TOML: {e}\n{doc}"))
}

/// Writes `content` to `dir/name` and returns the path.
#[allow(dead_code)]
pub fn write_settings(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
