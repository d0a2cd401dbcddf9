//! On-disk layout of the gitaly service.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::settings::{DefaultsTable, SettingValue, SettingsTree};

/// File name of the rendered configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name the service is registered under with the supervisor.
pub const SERVICE_NAME: &str = "gitaly";

/// Where the service lives on disk and who owns it.
///
/// # Examples
///
/// ```
/// use gitaly_config::lifecycle::ServiceLayout;
/// use gitaly_config::settings::{DefaultsTable, SettingsTree};
/// use std::path::Path;
///
/// let layout = ServiceLayout::resolve(&SettingsTree::new(), DefaultsTable::builtin()).unwrap();
/// assert!(layout.enabled);
/// assert_eq!(layout.config_path(), Path::new("/var/opt/gitlab/gitaly/config.toml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
    /// Whether the service should exist at all.
    pub enabled: bool,
    /// Working directory; holds `config.toml`.
    pub data_dir: PathBuf,
    /// Log directory.
    pub log_dir: PathBuf,
    /// Environment directory read by the supervisor (one file per variable).
    pub env_dir: PathBuf,
    /// Environment variables written into `env_dir`, in order.
    pub env: Vec<(String, String)>,
    /// The gitaly executable.
    pub bin_path: PathBuf,
    /// Account owning data and logs.
    pub user: String,
    /// Group of that account.
    pub group: String,
    /// Directory holding service definitions.
    pub sv_dir: PathBuf,
    /// Directory of active service links.
    pub service_dir: PathBuf,
}

impl ServiceLayout {
    /// Resolves the layout from settings, falling back to `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting has the wrong type, a path is not
    /// absolute, or a required setting has no value anywhere.
    pub fn resolve(settings: &SettingsTree, defaults: &DefaultsTable) -> Result<Self> {
        let lookup = Lookup { settings, defaults };

        Ok(Self {
            enabled: lookup.bool("gitaly.enable")?,
            data_dir: lookup.absolute_path("gitaly.dir")?,
            log_dir: lookup.absolute_path("gitaly.log_directory")?,
            env_dir: lookup.absolute_path("gitaly.env_directory")?,
            env: lookup.env("gitaly.env")?,
            bin_path: lookup.absolute_path("gitaly.bin_path")?,
            user: lookup.string("user.username")?,
            group: lookup.string("user.group")?,
            sv_dir: lookup.absolute_path("runit.sv_dir")?,
            service_dir: lookup.absolute_path("runit.service_dir")?,
        })
    }

    /// Path the rendered document is written to.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    /// The service definition directory.
    #[must_use]
    pub fn service_definition_dir(&self) -> PathBuf {
        self.sv_dir.join(SERVICE_NAME)
    }

    /// The active service link.
    #[must_use]
    pub fn service_link(&self) -> PathBuf {
        self.service_dir.join(SERVICE_NAME)
    }
}

/// User value first, default second.
struct Lookup<'a> {
    settings: &'a SettingsTree,
    defaults: &'a DefaultsTable,
}

impl Lookup<'_> {
    fn value(&self, path: &str) -> Result<&SettingValue> {
        self.settings
            .get(path)
            .or_else(|| self.defaults.get(path))
            .ok_or_else(|| Error::MissingConfiguration {
                field: path.to_string(),
            })
    }

    fn bool(&self, path: &str) -> Result<bool> {
        match self.value(path)? {
            SettingValue::Bool(b) => Ok(*b),
            other => Err(SettingsTree::wrong_kind(path, "boolean", other)),
        }
    }

    fn string(&self, path: &str) -> Result<String> {
        match self.value(path)? {
            SettingValue::String(s) => Ok(s.clone()),
            other => Err(SettingsTree::wrong_kind(path, "string", other)),
        }
    }

    fn absolute_path(&self, path: &str) -> Result<PathBuf> {
        let value = PathBuf::from(self.string(path)?);
        if !value.is_absolute() {
            return Err(Error::validation(
                path,
                format!("'{}' must be an absolute path", value.display()),
            ));
        }
        Ok(value)
    }

    /// The user's record replaces the default one entirely.
    fn env(&self, path: &str) -> Result<Vec<(String, String)>> {
        let value = match self.settings.get(path).or_else(|| self.defaults.get(path)) {
            Some(value) => value,
            None => return Ok(Vec::new()),
        };
        let Some(record) = value.as_record() else {
            return Err(SettingsTree::wrong_kind(path, "record", value));
        };

        record
            .iter()
            .map(|(name, value)| {
                if name.is_empty() || name == "." || name == ".." || name.contains(['/', '=']) {
                    return Err(Error::validation(
                        format!("{path}.{name}"),
                        "not a valid environment variable name",
                    ));
                }
                match value {
                    SettingValue::String(s) => Ok((name.clone(), s.clone())),
                    SettingValue::Number(n) => Ok((name.clone(), n.literal().to_string())),
                    SettingValue::Bool(b) => Ok((name.clone(), b.to_string())),
                    other => Err(SettingsTree::wrong_kind(&format!("{path}.{name}"), "string", other)),
                }
            })
            .collect()
    }
}
