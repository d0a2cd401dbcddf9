//! Resolution of user settings into a [`ResolvedConfig`].

use crate::error::{Error, Result};
use crate::resolve::model::{
    LatencyBucket, LoggingSection, PrometheusSection, ResolvedConfig,
};
use crate::resolve::storage::StorageMerger;
use crate::settings::{DefaultsTable, Number, SettingValue, SettingsTree};

const SOCKET_PATH: &str = "gitaly.socket_path";
const LISTEN_ADDR: &str = "gitaly.listen_addr";
const PROMETHEUS_LISTEN_ADDR: &str = "gitaly.prometheus_listen_addr";
const LOGGING_FORMAT: &str = "gitaly.logging_format";
const SENTRY_DSN: &str = "gitaly.sentry_dsn";
const GRPC_LATENCY_BUCKETS: &str = "gitaly.grpc_latency_buckets";

/// Composes defaults, user settings and storage resolution into one
/// [`ResolvedConfig`].
///
/// Resolution is a pure function of the settings and the defaults table:
/// unknown keys are ignored, and resolving the same input twice yields equal
/// results.
///
/// # Examples
///
/// ```
/// use gitaly_config::resolve::ConfigResolver;
/// use gitaly_config::settings::SettingsTree;
///
/// let config = ConfigResolver::default().resolve(&SettingsTree::new()).unwrap();
/// assert_eq!(config.socket_path, "/var/opt/gitlab/gitaly/gitaly.socket");
/// assert!(config.logging.is_none());
/// assert!(config.prometheus.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    defaults: &'a DefaultsTable,
}

impl Default for ConfigResolver<'static> {
    fn default() -> Self {
        Self::new(DefaultsTable::builtin())
    }
}

impl<'a> ConfigResolver<'a> {
    /// Creates a resolver consulting `defaults` for absent settings.
    #[must_use]
    pub const fn new(defaults: &'a DefaultsTable) -> Self {
        Self { defaults }
    }

    /// Resolves `settings` into the configuration to render.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] if the socket path has no
    /// value, [`Error::ConfigConflict`] for duplicate storage names, and a
    /// validation error for settings of the wrong shape.
    pub fn resolve(&self, settings: &SettingsTree) -> Result<ResolvedConfig> {
        let socket_path = self
            .scalar(settings, SOCKET_PATH)?
            .ok_or_else(|| Error::MissingConfiguration {
                field: SOCKET_PATH.to_string(),
            })?;

        let config = ResolvedConfig {
            socket_path,
            listen_addr: self.scalar(settings, LISTEN_ADDR)?,
            prometheus_listen_addr: self.scalar(settings, PROMETHEUS_LISTEN_ADDR)?,
            logging: Self::logging(settings)?,
            prometheus: Self::prometheus(settings)?,
            storage: StorageMerger::new(self.defaults).resolve(settings)?,
        };

        log::debug!(
            "resolved gitaly config with {} storage(s)",
            config.storage.len()
        );
        Ok(config)
    }

    /// User value at `path`, else the default, else `None`.
    fn scalar(&self, settings: &SettingsTree, path: &str) -> Result<Option<String>> {
        if let Some(value) = settings.get_str(path)? {
            return Ok(Some(value.to_string()));
        }
        match self.defaults.get(path) {
            None => Ok(None),
            Some(SettingValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(SettingsTree::wrong_kind(path, "string", other)),
        }
    }

    /// Present iff the user supplied at least one logging setting; never defaulted.
    fn logging(settings: &SettingsTree) -> Result<Option<LoggingSection>> {
        let format = settings.get_str(LOGGING_FORMAT)?.map(str::to_string);
        let sentry_dsn = settings.get_str(SENTRY_DSN)?.map(str::to_string);

        if format.is_none() && sentry_dsn.is_none() {
            return Ok(None);
        }
        Ok(Some(LoggingSection { format, sentry_dsn }))
    }

    fn prometheus(settings: &SettingsTree) -> Result<Option<PrometheusSection>> {
        let Some(value) = settings.get(GRPC_LATENCY_BUCKETS) else {
            return Ok(None);
        };
        Ok(Some(PrometheusSection {
            grpc_latency_buckets: parse_buckets(value)?,
        }))
    }
}

/// Reads latency buckets from a list of numbers or a `"[a, b, c]"` string.
///
/// Each bound keeps its literal text.
fn parse_buckets(value: &SettingValue) -> Result<Vec<LatencyBucket>> {
    match value {
        SettingValue::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                SettingValue::Number(n) => Ok(LatencyBucket::new(n.clone())),
                other => Err(SettingsTree::wrong_kind(
                    &format!("{GRPC_LATENCY_BUCKETS}[{index}]"),
                    "number",
                    other,
                )),
            })
            .collect(),
        SettingValue::String(text) => parse_bucket_literal(text),
        other => Err(SettingsTree::wrong_kind(GRPC_LATENCY_BUCKETS, "list", other)),
    }
}

fn parse_bucket_literal(text: &str) -> Result<Vec<LatencyBucket>> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            Error::validation(
                GRPC_LATENCY_BUCKETS,
                format!("expected a bracketed list like '[0.1, 1.0]', got '{text}'"),
            )
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|item| {
            Number::parse(item).map(LatencyBucket::new).ok_or_else(|| {
                Error::validation(
                    GRPC_LATENCY_BUCKETS,
                    format!("'{}' is not a valid TOML number", item.trim()),
                )
            })
        })
        .collect()
}
