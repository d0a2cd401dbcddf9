//! Property-based tests for resolution and rendering.

use super::resolver::ConfigResolver;
use super::storage::StorageMerger;
use crate::render::DocumentRenderer;
use crate::settings::{DefaultsTable, SettingValue, SettingsTree};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

fn path_strategy() -> impl Strategy<Value = String> {
    "(/[a-z0-9_-]{1,8}){1,4}"
}

fn storage_record(name: &str, path: &str) -> SettingValue {
    SettingValue::Record(vec![
        ("name".to_string(), name.into()),
        ("path".to_string(), path.into()),
    ])
}

// Distinct storage names with arbitrary paths.
fn storages_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map(name_strategy(), path_strategy(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

fn settings_strategy() -> impl Strategy<Value = SettingsTree> {
    (
        prop::option::of("[a-z]{1,8}:[0-9]{2,5}"),
        prop::option::of("[a-z]{1,8}:[0-9]{2,5}"),
        prop::option::of("json|text"),
        prop::option::of(storages_strategy()),
    )
        .prop_map(|(listen, prometheus, format, storages)| {
            let mut settings = SettingsTree::new();
            if let Some(addr) = listen {
                settings = settings.with("gitaly.listen_addr", addr);
            }
            if let Some(addr) = prometheus {
                settings = settings.with("gitaly.prometheus_listen_addr", addr);
            }
            if let Some(format) = format {
                settings = settings.with("gitaly.logging_format", format);
            }
            if let Some(storages) = storages {
                let list = storages
                    .iter()
                    .map(|(name, path)| storage_record(name, path))
                    .collect();
                settings = settings.with("gitaly.storage", SettingValue::List(list));
            }
            settings
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    // Resolving and rendering the same settings twice is byte-identical.
    #[test]
    fn resolve_and_render_are_deterministic(settings in settings_strategy()) {
        let resolver = ConfigResolver::default();
        let first = resolver.resolve(&settings).unwrap();
        let second = resolver.resolve(&settings.clone()).unwrap();
        prop_assert_eq!(&first, &second);

        let doc_a = DocumentRenderer::render(&first);
        let doc_b = DocumentRenderer::render(&second);
        prop_assert_eq!(doc_a.as_bytes(), doc_b.as_bytes());
    }

    // Current-style storage is returned verbatim whatever the legacy mapping holds.
    #[test]
    fn current_storage_ignores_legacy(
        current in storages_strategy(),
        legacy in storages_strategy(),
    ) {
        let list = current.iter().map(|(n, p)| storage_record(n, p)).collect();
        let legacy_record = legacy
            .iter()
            .map(|(n, p)| {
                (n.clone(), SettingValue::Record(vec![("path".to_string(), p.as_str().into())]))
            })
            .collect();
        let settings = SettingsTree::new()
            .with("gitaly.storage", SettingValue::List(list))
            .with("git_data_dirs", SettingValue::Record(legacy_record));

        let storage = StorageMerger::new(DefaultsTable::builtin()).resolve(&settings).unwrap();
        let pairs: Vec<(String, String)> = storage.into_iter().map(|e| (e.name, e.path)).collect();
        prop_assert_eq!(pairs, current);
    }

    // Legacy storage keeps key order and always ends in /repositories.
    #[test]
    fn legacy_storage_suffix(legacy in storages_strategy()) {
        // An empty mapping falls back to the default storage.
        prop_assume!(!legacy.is_empty());
        let record = legacy
            .iter()
            .map(|(n, p)| {
                (n.clone(), SettingValue::Record(vec![("path".to_string(), p.as_str().into())]))
            })
            .collect();
        let settings = SettingsTree::new().with("git_data_dirs", SettingValue::Record(record));

        let storage = StorageMerger::new(DefaultsTable::builtin()).resolve(&settings).unwrap();
        prop_assert_eq!(storage.len(), legacy.len());
        for (entry, (name, path)) in storage.iter().zip(&legacy) {
            prop_assert_eq!(&entry.name, name);
            prop_assert_eq!(&entry.path, &format!("{path}/repositories"));
        }
    }
}
