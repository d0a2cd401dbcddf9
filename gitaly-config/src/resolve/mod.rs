//! Resolution of user settings into the configuration gitaly runs with.
//!
//! - [`ConfigResolver`] applies defaults and decides which optional
//!   sections exist
//! - [`StorageMerger`] reconciles the current and legacy storage shapes
//!
//! Resolution is pure and synchronous: no I/O, no shared mutable state.
//! Resolvers may be used from several threads at once.

pub mod model;
pub mod resolver;
pub mod storage;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use model::{LatencyBucket, LoggingSection, PrometheusSection, ResolvedConfig, StorageEntry};
pub use resolver::ConfigResolver;
pub use storage::{LegacyDataDir, StorageInput, StorageMerger};
