#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # gitaly-config
//!
//! A library for resolving and rendering gitaly's `config.toml`.
//!
//! User settings are layered from YAML files and `GITALY_*` environment
//! variables, merged with built-in defaults, and rendered into the document
//! gitaly reads at startup. The service lifecycle then creates the
//! directories the service needs, writes the document and registers the
//! service with the supervisor.
//!
//! ## Core Types
//!
//! - [`SettingsTree`] and [`SettingsBuilder`]: Layered user settings
//! - [`DefaultsTable`]: Built-in defaults
//! - [`ConfigResolver`] and [`StorageMerger`]: Resolution into [`ResolvedConfig`]
//! - [`DocumentRenderer`]: Rendering into a [`Document`]
//! - [`ServiceLifecycle`] and [`LifecycleExecutor`]: Convergence on disk
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use gitaly_config::{ConfigResolver, DocumentRenderer, SettingsTree};
//!
//! let settings = SettingsTree::from_yaml_str(
//!     "gitaly:\n  listen_addr: 'localhost:7777'\ngit_data_dirs:\n  default:\n    path: /tmp/default/git-data\n",
//! )
//! .unwrap();
//!
//! let config = ConfigResolver::default().resolve(&settings).unwrap();
//! let doc = DocumentRenderer::render(&config);
//! assert!(doc.as_str().contains("listen_addr = 'localhost:7777'"));
//! assert!(doc.as_str().contains("path = '/tmp/default/git-data/repositories'"));
//! ```

pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod resolve;
pub mod settings;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use lifecycle::{
    ExecutionResult, LifecycleAction, LifecycleExecutor, LifecyclePlan, Ownership,
    ServiceLayout, ServiceLifecycle,
};
pub use logging::{init_logger, LogLevel, Logger};
pub use render::{Document, DocumentRenderer};
pub use resolve::{
    ConfigResolver, LatencyBucket, LoggingSection, PrometheusSection, ResolvedConfig,
    StorageEntry, StorageMerger,
};
pub use settings::{DefaultsTable, SettingValue, SettingsBuilder, SettingsTree};
