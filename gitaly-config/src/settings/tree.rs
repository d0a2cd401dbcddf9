//! The hierarchical settings tree.

use crate::error::{Error, Result};
use crate::settings::value::{Record, SettingValue};

/// Hierarchical, ordered user settings addressed by dotted paths.
///
/// A tree is built once (from YAML, layering and environment overrides)
/// and read thereafter. Lookups of absent paths return `None`, never an
/// error; typed getters only fail when a value is present with the wrong
/// shape.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::SettingsTree;
///
/// let settings = SettingsTree::from_yaml_str("gitaly:\n  listen_addr: 'localhost:7777'\n").unwrap();
/// assert_eq!(settings.get_str("gitaly.listen_addr").unwrap(), Some("localhost:7777"));
/// assert_eq!(settings.get_str("gitaly.socket_path").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsTree {
    root: Record,
}

impl SettingsTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML document into a tree.
    ///
    /// An empty document yields an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or its root is not a mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Self::from_yaml(value)
    }

    /// Builds a tree from an already parsed YAML value.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a mapping or a key is unsupported.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self> {
        match value {
            serde_yaml::Value::Null => Ok(Self::new()),
            serde_yaml::Value::Mapping(mapping) => Ok(Self {
                root: SettingValue::record_from_mapping("", mapping)?,
            }),
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value),
            other => Err(Error::validation(
                "<root>",
                format!("settings must be a mapping, found {other:?}"),
            )),
        }
    }

    /// Returns a copy of this tree with `value` stored at `path`.
    ///
    /// Intermediate records are created as needed; a non-record value in
    /// the way is replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitaly_config::settings::SettingsTree;
    ///
    /// let settings = SettingsTree::new().with("gitaly.enable", false);
    /// assert_eq!(settings.get_bool("gitaly.enable").unwrap(), Some(false));
    /// ```
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<SettingValue>) -> Self {
        self.set(path, value.into());
        self
    }

    /// The top-level record.
    #[must_use]
    pub fn root(&self) -> &Record {
        &self.root
    }

    /// Whether the tree holds no settings at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Looks up the value at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&SettingValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.iter().find_map(|(k, v)| (k == first).then_some(v))?;
        for segment in segments {
            current = current.field(segment)?;
        }
        Some(current)
    }

    /// Whether a value is present at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Reads a string setting.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is present but not a string.
    pub fn get_str(&self, path: &str) -> Result<Option<&str>> {
        match self.get(path) {
            None => Ok(None),
            Some(SettingValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(Self::wrong_kind(path, "string", other)),
        }
    }

    /// Reads a boolean setting.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is present but not a boolean.
    pub fn get_bool(&self, path: &str) -> Result<Option<bool>> {
        match self.get(path) {
            None => Ok(None),
            Some(SettingValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(Self::wrong_kind(path, "boolean", other)),
        }
    }

    /// Reads a record setting.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is present but not a record.
    pub fn get_record(&self, path: &str) -> Result<Option<&Record>> {
        match self.get(path) {
            None => Ok(None),
            Some(SettingValue::Record(r)) => Ok(Some(r)),
            Some(other) => Err(Self::wrong_kind(path, "record", other)),
        }
    }

    pub(crate) fn wrong_kind(path: &str, expected: &str, found: &SettingValue) -> Error {
        Error::validation(path, format!("expected a {expected}, found a {}", found.kind()))
    }

    pub(crate) fn from_record(root: Record) -> Self {
        Self { root }
    }

    pub(crate) fn set(&mut self, path: &str, value: SettingValue) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::set_in(&mut self.root, &segments, value);
    }

    fn set_in(record: &mut Record, segments: &[&str], value: SettingValue) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };

        let position = record.iter().position(|(k, _)| k == head);
        if rest.is_empty() {
            match position {
                Some(i) => record[i].1 = value,
                None => record.push(((*head).to_string(), value)),
            }
            return;
        }

        let index = match position {
            Some(i) => {
                if !matches!(record[i].1, SettingValue::Record(_)) {
                    record[i].1 = SettingValue::Record(Vec::new());
                }
                i
            }
            None => {
                record.push(((*head).to_string(), SettingValue::Record(Vec::new())));
                record.len() - 1
            }
        };

        if let SettingValue::Record(child) = &mut record[index].1 {
            Self::set_in(child, rest, value);
        }
    }
}
