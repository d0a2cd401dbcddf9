//! Built-in default values for gitaly settings.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::settings::value::SettingValue;

/// Default location of gitaly's unix socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/opt/gitlab/gitaly/gitaly.socket";

/// Default base directory of the `default` repository storage.
pub const DEFAULT_GIT_DATA_DIR: &str = "/var/opt/gitlab/git-data";

/// Suffix appended to legacy `git_data_dirs` base paths.
pub const REPOSITORIES_SUFFIX: &str = "repositories";

/// Default gitaly working directory (holds `config.toml`).
pub const DEFAULT_DATA_DIR: &str = "/var/opt/gitlab/gitaly";

/// Default gitaly log directory.
pub const DEFAULT_LOG_DIR: &str = "/var/log/gitlab/gitaly";

/// Default directory of the supervised process environment.
pub const DEFAULT_ENV_DIR: &str = "/opt/gitlab/etc/gitaly";

/// Default gitaly executable.
pub const DEFAULT_BIN_PATH: &str = "/opt/gitlab/embedded/bin/gitaly";

/// Default executable lookup path handed to the service.
pub const DEFAULT_ENV_PATH: &str = "/opt/gitlab/bin:/opt/gitlab/embedded/bin:/bin:/usr/bin";

/// Default account owning gitaly's data.
pub const DEFAULT_USER: &str = "git";

/// Default service definition directory.
pub const DEFAULT_SV_DIR: &str = "/opt/gitlab/sv";

/// Default directory of active service links.
pub const DEFAULT_SERVICE_DIR: &str = "/opt/gitlab/service";

/// Read-only mapping from settings path to default value.
///
/// The built-in table is created on first use and shared process-wide.
/// Custom tables exist for tests and embedding.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::{DefaultsTable, DEFAULT_SOCKET_PATH};
///
/// let defaults = DefaultsTable::builtin();
/// assert_eq!(
///     defaults.get("gitaly.socket_path").and_then(|v| v.as_str()),
///     Some(DEFAULT_SOCKET_PATH)
/// );
/// assert!(defaults.get("gitaly.listen_addr").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsTable {
    entries: BTreeMap<String, SettingValue>,
}

impl DefaultsTable {
    /// The process-wide built-in defaults.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<DefaultsTable> = OnceLock::new();
        BUILTIN.get_or_init(Self::gitaly)
    }

    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns this table with `value` registered as the default for `path`.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.entries.insert(path.into(), value.into());
        self
    }

    /// The default for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&SettingValue> {
        self.entries.get(path)
    }

    /// The default string for `path`, if one exists and is a string.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(SettingValue::as_str)
    }

    /// Iterates over all registered defaults in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn gitaly() -> Self {
        let default_data_dir = SettingValue::Record(vec![(
            "default".to_string(),
            SettingValue::Record(vec![("path".to_string(), DEFAULT_GIT_DATA_DIR.into())]),
        )]);
        let default_env = SettingValue::Record(vec![("PATH".to_string(), DEFAULT_ENV_PATH.into())]);

        Self::empty()
            .with("gitaly.enable", true)
            .with("gitaly.socket_path", DEFAULT_SOCKET_PATH)
            .with("gitaly.dir", DEFAULT_DATA_DIR)
            .with("gitaly.log_directory", DEFAULT_LOG_DIR)
            .with("gitaly.env_directory", DEFAULT_ENV_DIR)
            .with("gitaly.bin_path", DEFAULT_BIN_PATH)
            .with("gitaly.env", default_env)
            .with("git_data_dirs", default_data_dir)
            .with("user.username", DEFAULT_USER)
            .with("user.group", DEFAULT_USER)
            .with("runit.sv_dir", DEFAULT_SV_DIR)
            .with("runit.service_dir", DEFAULT_SERVICE_DIR)
    }
}
