//! Builder assembling a settings tree from files, environment and overrides.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::settings::environment::EnvironmentSettings;
use crate::settings::loader::SettingsLoader;
use crate::settings::merger::SettingsMerger;
use crate::settings::tree::SettingsTree;

/// Builds the effective [`SettingsTree`].
///
/// Precedence, highest first: programmatic overrides, `GITALY_*`
/// environment variables, later settings files, earlier settings files.
/// Defaults are not merged in here; the resolver consults them per path.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::{SettingsBuilder, SettingsTree};
///
/// let settings = SettingsBuilder::new()
///     .skip_env()
///     .with_overrides(SettingsTree::new().with("gitaly.enable", false))
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.get_bool("gitaly.enable").unwrap(), Some(false));
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    files: Vec<PathBuf>,
    skip_env: bool,
    overrides: Option<SettingsTree>,
}

impl SettingsBuilder {
    /// Creates a builder with no files and environment overrides enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a settings file above all previously added ones.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds several settings files, in increasing precedence.
    #[must_use]
    pub fn with_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.files
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Ignores `GITALY_*` environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Layers `overrides` above every other source.
    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsTree) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Builds the merged tree.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be loaded or an environment
    /// variable is invalid.
    pub fn build(self) -> Result<SettingsTree> {
        let sources = SettingsLoader::load_all(&self.files)?;
        let mut settings = SettingsMerger::merge(sources);

        if !self.skip_env {
            EnvironmentSettings::apply_overrides(&mut settings)?;
        }

        if let Some(ref overrides) = self.overrides {
            SettingsMerger::merge_into(&mut settings, overrides);
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_builder() {
        let settings = SettingsBuilder::new().skip_env().build().unwrap();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_later_files_win() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base.yml");
        let local = temp.path().join("local.yml");
        fs::write(&base, "gitaly:\n  listen_addr: 'base:1'\n  sentry_dsn: base\n").unwrap();
        fs::write(&local, "gitaly:\n  listen_addr: 'local:2'\n").unwrap();

        let settings = SettingsBuilder::new()
            .with_files([&base, &local])
            .skip_env()
            .build()
            .unwrap();

        assert_eq!(settings.get_str("gitaly.listen_addr").unwrap(), Some("local:2"));
        assert_eq!(settings.get_str("gitaly.sentry_dsn").unwrap(), Some("base"));
    }

    #[test]
    fn test_overrides_win_over_files() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base.yml");
        fs::write(&base, "gitaly:\n  enable: true\n").unwrap();

        let settings = SettingsBuilder::new()
            .with_file(&base)
            .skip_env()
            .with_overrides(SettingsTree::new().with("gitaly.enable", false))
            .build()
            .unwrap();

        assert_eq!(settings.get_bool("gitaly.enable").unwrap(), Some(false));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = SettingsBuilder::new()
            .with_file("/nonexistent/gitaly.yml")
            .skip_env()
            .build();
        assert!(result.is_err());
    }
}
