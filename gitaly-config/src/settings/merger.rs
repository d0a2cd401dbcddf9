//! Settings layering and precedence handling.
//!
//! Layers are deep-merged: records merge key by key, everything else
//! (scalars and lists) is replaced wholesale by the higher layer.

use crate::settings::loader::SettingsSource;
use crate::settings::tree::SettingsTree;
use crate::settings::value::{Record, SettingValue};

/// Merges settings layers according to precedence rules.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::{SettingsMerger, SettingsTree};
///
/// let low = SettingsTree::new().with("gitaly.listen_addr", "low:1");
/// let high = SettingsTree::new().with("gitaly.listen_addr", "high:2");
///
/// let mut result = low;
/// SettingsMerger::merge_into(&mut result, &high);
/// assert_eq!(result.get_str("gitaly.listen_addr").unwrap(), Some("high:2"));
/// ```
pub struct SettingsMerger;

impl SettingsMerger {
    /// Merge multiple settings sources into one tree.
    ///
    /// Sources are sorted by precedence first; on ties the later source wins.
    #[must_use]
    pub fn merge(mut sources: Vec<SettingsSource>) -> SettingsTree {
        sources.sort_by_key(|s| s.precedence);

        let mut result = SettingsTree::new();
        for source in &sources {
            Self::merge_into(&mut result, &source.settings);
        }
        result
    }

    /// Merge `source` into `target` (source overwrites target).
    pub fn merge_into(target: &mut SettingsTree, source: &SettingsTree) {
        let merged = Self::merge_records(target.root(), source.root());
        *target = SettingsTree::from_record(merged);
    }

    fn merge_value(existing: &SettingValue, incoming: &SettingValue) -> SettingValue {
        match (existing, incoming) {
            (SettingValue::Record(low), SettingValue::Record(high)) => {
                SettingValue::Record(Self::merge_records(low, high))
            }
            _ => incoming.clone(),
        }
    }

    fn merge_records(low: &Record, high: &Record) -> Record {
        let mut merged = low.clone();
        for (key, value) in high {
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = Self::merge_value(slot, value),
                None => merged.push((key.clone(), value.clone())),
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tree(yaml: &str) -> SettingsTree {
        SettingsTree::from_yaml_str(yaml).unwrap()
    }

    fn make_source(precedence: u8, settings: SettingsTree) -> SettingsSource {
        SettingsSource {
            path: PathBuf::from(format!("test-{precedence}.yml")),
            precedence,
            settings,
        }
    }

    #[test]
    fn test_merge_nested_records_field_by_field() {
        let mut target = tree("gitaly:\n  listen_addr: 'a:1'\n  socket_path: /tmp/a.sock\n");
        let source = tree("gitaly:\n  listen_addr: 'b:2'\n  sentry_dsn: dsn\n");

        SettingsMerger::merge_into(&mut target, &source);
        assert_eq!(target.get_str("gitaly.listen_addr").unwrap(), Some("b:2"));
        assert_eq!(
            target.get_str("gitaly.socket_path").unwrap(),
            Some("/tmp/a.sock")
        );
        assert_eq!(target.get_str("gitaly.sentry_dsn").unwrap(), Some("dsn"));
    }

    #[test]
    fn test_merge_lists_replace() {
        let mut target = tree(
            "gitaly:\n  storage:\n    - {name: a, path: /a}\n    - {name: b, path: /b}\n",
        );
        let source = tree("gitaly:\n  storage:\n    - {name: c, path: /c}\n");

        SettingsMerger::merge_into(&mut target, &source);
        match target.get("gitaly.storage") {
            Some(SettingValue::List(items)) => assert_eq!(items.len(), 1),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_legacy_mapping_accumulates() {
        let mut target = tree("git_data_dirs:\n  default:\n    path: /a\n");
        let source = tree("git_data_dirs:\n  nfs1:\n    path: /mnt/nfs1\n");

        SettingsMerger::merge_into(&mut target, &source);
        let keys: Vec<&str> = target
            .get_record("git_data_dirs")
            .unwrap()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["default", "nfs1"]);
    }

    #[test]
    fn test_merge_empty_is_identity() {
        let original = tree("gitaly:\n  enable: false\n");
        let mut target = original.clone();
        SettingsMerger::merge_into(&mut target, &SettingsTree::new());
        assert_eq!(target, original);
    }

    #[test]
    fn test_merge_multiple_sources_by_precedence() {
        let sources = vec![
            make_source(3, tree("gitaly:\n  listen_addr: 'top:3'\n")),
            make_source(1, tree("gitaly:\n  listen_addr: 'base:1'\n  sentry_dsn: base\n")),
            make_source(2, tree("gitaly:\n  sentry_dsn: middle\n")),
        ];

        let result = SettingsMerger::merge(sources);
        assert_eq!(result.get_str("gitaly.listen_addr").unwrap(), Some("top:3"));
        assert_eq!(result.get_str("gitaly.sentry_dsn").unwrap(), Some("middle"));
    }
}
