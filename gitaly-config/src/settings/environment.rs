//! Environment variable handling for settings overrides.
//!
//! This module provides support for `GITALY_*` environment variables that
//! override settings file values.

use std::env;

use crate::error::{Error, Result};
use crate::settings::tree::SettingsTree;
use crate::settings::value::SettingValue;

/// String-valued overrides: environment variable and the settings path it sets.
const STRING_OVERRIDES: &[(&str, &str)] = &[
    ("GITALY_SOCKET_PATH", "gitaly.socket_path"),
    ("GITALY_LISTEN_ADDR", "gitaly.listen_addr"),
    ("GITALY_PROMETHEUS_LISTEN_ADDR", "gitaly.prometheus_listen_addr"),
    ("GITALY_LOGGING_FORMAT", "gitaly.logging_format"),
    ("GITALY_SENTRY_DSN", "gitaly.sentry_dsn"),
    ("GITALY_GRPC_LATENCY_BUCKETS", "gitaly.grpc_latency_buckets"),
];

/// Handles environment variable overrides for settings.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::{EnvironmentSettings, SettingsTree};
///
/// let mut settings = SettingsTree::new();
/// EnvironmentSettings::apply_overrides_from(&mut settings, |name| {
///     (name == "GITALY_LISTEN_ADDR").then(|| "localhost:7777".to_string())
/// })
/// .unwrap();
/// assert_eq!(settings.get_str("gitaly.listen_addr").unwrap(), Some("localhost:7777"));
/// ```
pub struct EnvironmentSettings;

impl EnvironmentSettings {
    /// Apply `GITALY_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable holds an invalid value.
    pub fn apply_overrides(settings: &mut SettingsTree) -> Result<()> {
        Self::apply_overrides_from(settings, |name| env::var(name).ok())
    }

    /// Apply overrides read through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable holds an invalid value.
    pub fn apply_overrides_from<F>(settings: &mut SettingsTree, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Set-but-empty variables are treated like unset ones.
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        for (var, path) in STRING_OVERRIDES {
            if let Some(value) = lookup(var) {
                log::debug!("{var} overrides {path}");
                settings.set(path, SettingValue::String(value));
            }
        }

        if let Some(value) = lookup("GITALY_ENABLE") {
            let enabled = Self::parse_bool("GITALY_ENABLE", &value)?;
            settings.set("gitaly.enable", SettingValue::Bool(enabled));
        }

        Ok(())
    }

    /// Parse a boolean value from an environment variable.
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
