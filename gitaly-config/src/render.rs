//! Rendering of a [`ResolvedConfig`] into gitaly's `config.toml`.
//!
//! Key order is fixed: top-level scalars, then `[logging]`, then
//! `[prometheus]`, then one `[[storage]]` block per storage. Strings are
//! written as single-quoted literals; a value a literal string cannot hold
//! falls back to an escaped basic string.

use std::fmt::{self, Write};

use crate::resolve::{LatencyBucket, LoggingSection, PrometheusSection, ResolvedConfig};

const HEADER: &str = "\
# Gitaly configuration file
# This file is managed by gitaly-config. Manual changes will be
# erased! Edit the settings file and run `gitaly-config apply`.
";

/// A rendered configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(String);

impl Document {
    /// The document text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The document bytes, as written to disk.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consumes the document, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes resolved configuration into the `config.toml` format.
///
/// # Examples
///
/// ```
/// use gitaly_config::render::DocumentRenderer;
/// use gitaly_config::resolve::ConfigResolver;
/// use gitaly_config::settings::SettingsTree;
///
/// let config = ConfigResolver::default().resolve(&SettingsTree::new()).unwrap();
/// let doc = DocumentRenderer::render(&config);
/// assert!(doc.as_str().contains("socket_path = '/var/opt/gitlab/gitaly/gitaly.socket'"));
/// assert!(!doc.as_str().contains("[logging]"));
/// ```
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Renders `config`. Pure; never touches the filesystem.
    #[must_use]
    pub fn render(config: &ResolvedConfig) -> Document {
        let mut out = String::with_capacity(512);
        out.push_str(HEADER);
        out.push('\n');

        Self::key_value(&mut out, "socket_path", &config.socket_path);
        if let Some(ref addr) = config.listen_addr {
            Self::key_value(&mut out, "listen_addr", addr);
        }
        if let Some(ref addr) = config.prometheus_listen_addr {
            Self::key_value(&mut out, "prometheus_listen_addr", addr);
        }

        if let Some(ref logging) = config.logging {
            Self::logging(&mut out, logging);
        }
        if let Some(ref prometheus) = config.prometheus {
            Self::prometheus(&mut out, prometheus);
        }

        for storage in &config.storage {
            out.push_str("\n[[storage]]\n");
            Self::key_value(&mut out, "name", &storage.name);
            Self::key_value(&mut out, "path", &storage.path);
        }

        Document(out)
    }

    fn logging(out: &mut String, logging: &LoggingSection) {
        out.push_str("\n[logging]\n");
        if let Some(ref format) = logging.format {
            Self::key_value(out, "format", format);
        }
        if let Some(ref dsn) = logging.sentry_dsn {
            Self::key_value(out, "sentry_dsn", dsn);
        }
    }

    fn prometheus(out: &mut String, prometheus: &PrometheusSection) {
        let items: Vec<&str> = prometheus
            .grpc_latency_buckets
            .iter()
            .map(LatencyBucket::literal)
            .collect();
        out.push_str("\n[prometheus]\n");
        // Writing to a String cannot fail.
        let _ = writeln!(out, "grpc_latency_buckets = [{}]", items.join(", "));
    }

    fn key_value(out: &mut String, key: &str, value: &str) {
        let _ = writeln!(out, "{key} = {}", quote(value));
    }
}

/// Quotes `value` as a TOML literal string when possible.
fn quote(value: &str) -> String {
    let literal_safe = !value.contains('\'') && !value.chars().any(char::is_control);
    if literal_safe {
        return format!("'{value}'");
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\u{:04X}", u32::from(c));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
