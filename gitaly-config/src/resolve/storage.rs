//! Repository storage resolution.
//!
//! Storages can be configured two ways: the current `gitaly.storage` list of
//! `{name, path}` records, or the legacy `git_data_dirs` mapping from storage
//! name to `{path}` where `path` is the git data directory and repositories
//! live below it. The input shape is classified once into [`StorageInput`]
//! and resolved by fixed precedence; entries are never merged across shapes.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::resolve::model::StorageEntry;
use crate::settings::{DefaultsTable, SettingValue, SettingsTree, REPOSITORIES_SUFFIX};

/// Settings path of the current-style storage list.
pub const CURRENT_STORAGE_PATH: &str = "gitaly.storage";

/// Settings path of the legacy storage mapping.
pub const LEGACY_STORAGE_PATH: &str = "git_data_dirs";

/// A legacy `git_data_dirs` entry before path translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDataDir {
    /// Storage name (the mapping key).
    pub name: String,
    /// Git data directory; repositories live in its `repositories` child.
    pub base_path: String,
}

impl LegacyDataDir {
    /// Translates this entry into a storage entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaly_config::resolve::LegacyDataDir;
    ///
    /// let dir = LegacyDataDir { name: "nfs1".into(), base_path: "/mnt/nfs1".into() };
    /// assert_eq!(dir.to_storage().path, "/mnt/nfs1/repositories");
    /// ```
    #[must_use]
    pub fn to_storage(&self) -> StorageEntry {
        let base = self.base_path.trim_end_matches('/');
        StorageEntry::new(&self.name, format!("{base}/{REPOSITORIES_SUFFIX}"))
    }
}

/// The storage input shape found in a settings tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageInput {
    /// `gitaly.storage` was supplied (possibly empty).
    Current(Vec<StorageEntry>),
    /// Only `git_data_dirs` was supplied, with at least one entry.
    Legacy(Vec<LegacyDataDir>),
    /// Neither shape was supplied.
    Absent,
}

impl StorageInput {
    /// Classifies the storage input of `settings`.
    ///
    /// When the current shape is present the legacy mapping is not
    /// inspected beyond noting that it was ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the chosen shape is malformed.
    pub fn from_settings(settings: &SettingsTree) -> Result<Self> {
        if let Some(value) = settings.get(CURRENT_STORAGE_PATH) {
            if Self::has_legacy_entries(settings) {
                log::warn!(
                    "both {CURRENT_STORAGE_PATH} and {LEGACY_STORAGE_PATH} are set; \
                     ignoring {LEGACY_STORAGE_PATH}"
                );
            }
            return Ok(Self::Current(Self::parse_current(value)?));
        }

        // An empty legacy mapping carries no storage and falls back to the default.
        match settings.get(LEGACY_STORAGE_PATH) {
            Some(value) => {
                let dirs = Self::parse_legacy(LEGACY_STORAGE_PATH, value)?;
                Ok(if dirs.is_empty() {
                    Self::Absent
                } else {
                    Self::Legacy(dirs)
                })
            }
            None => Ok(Self::Absent),
        }
    }

    fn has_legacy_entries(settings: &SettingsTree) -> bool {
        settings
            .get(LEGACY_STORAGE_PATH)
            .and_then(SettingValue::as_record)
            .is_some_and(|record| !record.is_empty())
    }

    fn parse_current(value: &SettingValue) -> Result<Vec<StorageEntry>> {
        let SettingValue::List(items) = value else {
            return Err(SettingsTree::wrong_kind(CURRENT_STORAGE_PATH, "list", value));
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let field = format!("{CURRENT_STORAGE_PATH}[{index}]");
                if item.as_record().is_none() {
                    return Err(SettingsTree::wrong_kind(&field, "record", item));
                }
                let name = Self::required_str(&field, item, "name")?;
                let path = Self::required_str(&field, item, "path")?;
                Ok(StorageEntry::new(name, path))
            })
            .collect()
    }

    pub(crate) fn parse_legacy(field: &str, value: &SettingValue) -> Result<Vec<LegacyDataDir>> {
        let Some(record) = value.as_record() else {
            return Err(SettingsTree::wrong_kind(field, "record", value));
        };

        record
            .iter()
            .map(|(name, entry)| {
                let entry_field = format!("{field}.{name}");
                if entry.as_record().is_none() {
                    return Err(SettingsTree::wrong_kind(&entry_field, "record", entry));
                }
                let base_path = Self::required_str(&entry_field, entry, "path")?;
                Ok(LegacyDataDir {
                    name: name.clone(),
                    base_path: base_path.to_string(),
                })
            })
            .collect()
    }

    fn required_str<'a>(field: &str, record: &'a SettingValue, key: &str) -> Result<&'a str> {
        match record.field(key) {
            Some(SettingValue::String(s)) => Ok(s),
            Some(other) => Err(SettingsTree::wrong_kind(&format!("{field}.{key}"), "string", other)),
            None => Err(Error::validation(field, format!("missing '{key}'"))),
        }
    }
}

/// Resolves the ordered storage list.
///
/// Precedence, first match wins:
/// 1. `gitaly.storage`, verbatim and in order (an explicit empty list stays empty)
/// 2. a non-empty `git_data_dirs`, each base path suffixed with `/repositories`, in key order
/// 3. the default `git_data_dirs` from the [`DefaultsTable`]
///
/// Duplicate names in the result are rejected with
/// [`Error::ConfigConflict`].
///
/// # Examples
///
/// ```
/// use gitaly_config::resolve::StorageMerger;
/// use gitaly_config::settings::{DefaultsTable, SettingsTree};
///
/// let storage = StorageMerger::new(DefaultsTable::builtin())
///     .resolve(&SettingsTree::new())
///     .unwrap();
/// assert_eq!(storage.len(), 1);
/// assert_eq!(storage[0].path, "/var/opt/gitlab/git-data/repositories");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StorageMerger<'a> {
    defaults: &'a DefaultsTable,
}

impl<'a> StorageMerger<'a> {
    /// Creates a merger falling back to `defaults`.
    #[must_use]
    pub const fn new(defaults: &'a DefaultsTable) -> Self {
        Self { defaults }
    }

    /// Resolves the storage list of `settings`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input,
    /// [`Error::ConfigConflict`] for duplicate names, and
    /// [`Error::MissingConfiguration`] when no input is given and the
    /// defaults table has no storage either.
    pub fn resolve(&self, settings: &SettingsTree) -> Result<Vec<StorageEntry>> {
        let entries = match StorageInput::from_settings(settings)? {
            StorageInput::Current(entries) => {
                if entries.is_empty() {
                    log::warn!("{CURRENT_STORAGE_PATH} is an empty list; no storages configured");
                }
                entries
            }
            StorageInput::Legacy(dirs) => dirs.iter().map(LegacyDataDir::to_storage).collect(),
            StorageInput::Absent => self.default_storage()?,
        };

        Self::check_unique(&entries)?;
        Ok(entries)
    }

    fn default_storage(&self) -> Result<Vec<StorageEntry>> {
        let value = self
            .defaults
            .get(LEGACY_STORAGE_PATH)
            .ok_or_else(|| Error::MissingConfiguration {
                field: CURRENT_STORAGE_PATH.to_string(),
            })?;
        let dirs = StorageInput::parse_legacy(LEGACY_STORAGE_PATH, value)?;
        Ok(dirs.iter().map(LegacyDataDir::to_storage).collect())
    }

    fn check_unique(entries: &[StorageEntry]) -> Result<()> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::ConfigConflict {
                    details: format!("storage name '{}' is configured more than once", entry.name),
                });
            }
        }
        Ok(())
    }
}
