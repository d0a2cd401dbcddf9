//! Settings file loading.
//!
//! This module reads YAML settings files and tags each with the precedence
//! it was given on the command line or by the embedding program.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::settings::tree::SettingsTree;

/// Settings source with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::{SettingsSource, SettingsTree};
/// use std::path::PathBuf;
///
/// let base = SettingsSource {
///     path: PathBuf::from("/etc/gitlab/gitaly.yml"),
///     precedence: 1,
///     settings: SettingsTree::new(),
/// };
/// assert_eq!(base.precedence, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SettingsSource {
    /// Path to the settings file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Parsed settings.
    pub settings: SettingsTree,
}

/// Loads settings from YAML files.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load every file in `paths`, later files taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read or parsed.
    pub fn load_all(paths: &[PathBuf]) -> Result<Vec<SettingsSource>> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let settings = Self::load_file(path)?;
                log::debug!("loaded settings layer {} from {}", index + 1, path.display());
                Ok(SettingsSource {
                    path: path.clone(),
                    precedence: u8::try_from(index + 1).unwrap_or(u8::MAX),
                    settings,
                })
            })
            .collect()
    }

    /// Load and parse a YAML settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<SettingsTree> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read settings file: {e}"),
        })?;

        SettingsTree::from_yaml_str(&contents).map_err(|e| match e {
            Error::Settings(yaml) => Error::Validation {
                field: format!("{}", path.display()),
                message: format!("Invalid YAML: {yaml}"),
            },
            other => other,
        })
    }
}
