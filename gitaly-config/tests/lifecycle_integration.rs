//! Lifecycle convergence under a temporary filesystem root.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{load_fixture, parse_toml, render, settings};
use gitaly_config::{
    DefaultsTable, LifecycleAction, LifecycleExecutor, ServiceLifecycle, SettingsTree,
};
use tempfile::TempDir;

#[test]
fn test_enabled_service_converges() {
    let root = TempDir::new().unwrap();
    let plan =
        ServiceLifecycle::plan_from_settings(&load_fixture("legacy.yml"), DefaultsTable::builtin())
            .unwrap();
    let result = LifecycleExecutor::new(root.path()).execute(&plan).unwrap();

    assert!(!result.dry_run);
    assert_eq!(result.changed, plan.len());
    assert!(root.path().join("var/opt/gitlab/gitaly").is_dir());
    assert!(root.path().join("var/log/gitlab/gitaly").is_dir());
    assert!(root.path().join("opt/gitlab/etc/gitaly/PATH").is_file());

    let config = fs::read_to_string(root.path().join("var/opt/gitlab/gitaly/config.toml")).unwrap();
    let expected = render(&load_fixture("legacy.yml"));
    assert_eq!(config, expected.as_str());
    parse_toml(&expected);

    let run = fs::read_to_string(root.path().join("opt/gitlab/sv/gitaly/run")).unwrap();
    assert!(run.contains("/var/opt/gitlab/gitaly/config.toml"));
    assert!(root.path().join("opt/gitlab/sv/gitaly/log/run").is_file());
}

#[cfg(unix)]
#[test]
fn test_enabled_service_modes_and_link() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().unwrap();
    let plan = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
        .unwrap();
    LifecycleExecutor::new(root.path()).execute(&plan).unwrap();

    let mode = |p: &str| fs::metadata(root.path().join(p)).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode("var/opt/gitlab/gitaly"), 0o700);
    assert_eq!(mode("var/log/gitlab/gitaly"), 0o700);
    assert_eq!(mode("var/opt/gitlab/gitaly/config.toml"), 0o640);
    assert_eq!(mode("opt/gitlab/sv/gitaly/run"), 0o755);

    assert_eq!(
        fs::read_link(root.path().join("opt/gitlab/service/gitaly")).unwrap(),
        PathBuf::from("/opt/gitlab/sv/gitaly")
    );
}

#[test]
fn test_second_run_changes_nothing() {
    let root = TempDir::new().unwrap();
    let plan = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
        .unwrap();
    let executor = LifecycleExecutor::new(root.path());

    executor.execute(&plan).unwrap();
    let second = executor.execute(&plan).unwrap();
    assert_eq!(second.changed, 0);
}

#[test]
fn test_changed_settings_rewrite_config() {
    let root = TempDir::new().unwrap();
    let executor = LifecycleExecutor::new(root.path());
    let config_path = root.path().join("var/opt/gitlab/gitaly/config.toml");

    let first = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
        .unwrap();
    executor.execute(&first).unwrap();
    assert!(!fs::read_to_string(&config_path).unwrap().contains("listen_addr"));

    let updated = settings("gitaly:\n  listen_addr: 'localhost:7777'\n");
    let second = ServiceLifecycle::plan_from_settings(&updated, DefaultsTable::builtin()).unwrap();
    assert_eq!(executor.execute(&second).unwrap().changed, 1);
    assert!(fs::read_to_string(&config_path)
        .unwrap()
        .contains("listen_addr = 'localhost:7777'"));
}

#[test]
fn test_disabled_service_creates_nothing() {
    let root = TempDir::new().unwrap();
    let plan =
        ServiceLifecycle::plan_from_settings(&load_fixture("disabled.yml"), DefaultsTable::builtin())
            .unwrap();
    assert!(plan.is_empty());

    let result = LifecycleExecutor::new(root.path()).execute(&plan).unwrap();
    assert_eq!(result.changed, 0);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_dry_run_reports_plan() {
    let root = TempDir::new().unwrap();
    let plan = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
        .unwrap();
    let result = LifecycleExecutor::new(root.path()).dry_run().execute(&plan).unwrap();

    assert!(result.dry_run);
    assert_eq!(result.actions_taken.len(), plan.len());
    assert!(result.actions_taken[0].starts_with("Create directory /var/opt/gitlab/gitaly"));
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_config_written_before_registration() {
    let plan = ServiceLifecycle::plan_from_settings(&SettingsTree::new(), DefaultsTable::builtin())
        .unwrap();
    let config_index = plan
        .actions
        .iter()
        .position(|a| matches!(a, LifecycleAction::WriteFile { path, .. } if path.ends_with("config.toml")))
        .unwrap();
    let register_index = plan
        .actions
        .iter()
        .position(|a| matches!(a, LifecycleAction::RegisterService { .. }))
        .unwrap();
    assert!(config_index < register_index);
}

#[test]
fn test_failed_resolution_leaves_disk_untouched() {
    let root = TempDir::new().unwrap();
    let result =
        ServiceLifecycle::plan_from_settings(&load_fixture("duplicate.yml"), DefaultsTable::builtin());
    assert!(result.is_err());
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}
