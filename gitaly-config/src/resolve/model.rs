//! The fully resolved gitaly configuration.
//!
//! Every optional section is an explicit `Option`, set by the resolver when
//! the user supplied at least one of its fields.

use serde::{Deserialize, Serialize, Serializer};

use crate::settings::Number;

/// One repository storage location.
///
/// # Examples
///
/// ```
/// use gitaly_config::resolve::StorageEntry;
///
/// let entry = StorageEntry::new("default", "/var/opt/gitlab/git-data/repositories");
/// assert_eq!(entry.name, "default");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Storage name, unique within a resolved list.
    pub name: String,
    /// Repository root. Not checked for existence.
    pub path: String,
}

impl StorageEntry {
    /// Creates a storage entry.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The `[logging]` section.
///
/// A sub-field the user did not supply stays `None` and is not rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSection {
    /// Log output format, e.g. `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Sentry DSN for error reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentry_dsn: Option<String>,
}

/// One histogram bucket bound, keeping the literal text it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyBucket(Number);

impl LatencyBucket {
    /// Wraps a parsed number.
    #[must_use]
    pub const fn new(number: Number) -> Self {
        Self(number)
    }

    /// The literal text as supplied.
    #[must_use]
    pub fn literal(&self) -> &str {
        self.0.literal()
    }

    /// The numeric bound.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0.value()
    }
}

impl Serialize for LatencyBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// The `[prometheus]` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrometheusSection {
    /// gRPC latency histogram buckets, in the order given.
    pub grpc_latency_buckets: Vec<LatencyBucket>,
}

/// The authoritative configuration rendered into `config.toml`.
///
/// Built once per resolution pass and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Unix socket gitaly listens on.
    pub socket_path: String,
    /// Optional TCP listen address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_addr: Option<String>,
    /// Optional Prometheus listen address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus_listen_addr: Option<String>,
    /// Present iff the user supplied a logging setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
    /// Present iff the user supplied latency buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusSection>,
    /// Repository storages, in order.
    pub storage: Vec<StorageEntry>,
}
