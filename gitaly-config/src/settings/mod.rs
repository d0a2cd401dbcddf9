//! User settings for gitaly.
//!
//! This module provides the layered input side of configuration:
//! - YAML settings files, mirroring the nested `gitaly:` / `git_data_dirs:` hash
//! - Environment variable overrides (`GITALY_*`)
//! - Programmatic overrides via [`SettingsBuilder`]
//! - The built-in [`DefaultsTable`]
//!
//! # Precedence
//!
//! Highest to lowest:
//!
//! 1. Programmatic overrides (via `SettingsBuilder::with_overrides`)
//! 2. Environment variables (`GITALY_*`)
//! 3. Settings files, later files above earlier ones
//! 4. Built-in defaults, consulted per path by the resolver
//!
//! # Examples
//!
//! ```
//! use gitaly_config::settings::SettingsTree;
//!
//! let settings = SettingsTree::from_yaml_str(
//!     "gitaly:\n  storage:\n    - name: default\n      path: /tmp/path-1\n",
//! )
//! .unwrap();
//! assert!(settings.contains("gitaly.storage"));
//! ```

pub mod builder;
pub mod defaults;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod tree;
pub mod value;

pub use builder::SettingsBuilder;
pub use defaults::{
    DefaultsTable, DEFAULT_BIN_PATH, DEFAULT_DATA_DIR, DEFAULT_ENV_DIR, DEFAULT_ENV_PATH,
    DEFAULT_GIT_DATA_DIR, DEFAULT_LOG_DIR, DEFAULT_SERVICE_DIR, DEFAULT_SOCKET_PATH,
    DEFAULT_SV_DIR, DEFAULT_USER, REPOSITORIES_SUFFIX,
};
pub use environment::EnvironmentSettings;
pub use loader::{SettingsLoader, SettingsSource};
pub use merger::SettingsMerger;
pub use tree::SettingsTree;
pub use value::{Number, Record, SettingValue};
