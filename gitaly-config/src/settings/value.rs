//! Typed leaf values of a settings tree.
//!
//! Values are converted eagerly from YAML so the resolver never probes
//! loosely typed data. Numbers keep the literal text they were written with,
//! which the renderer reproduces verbatim.

use std::fmt;

use crate::error::{Error, Result};

/// A numeric setting that remembers how it was written.
///
/// # Examples
///
/// ```
/// use gitaly_config::settings::Number;
///
/// let n = Number::parse("1.0").unwrap();
/// assert_eq!(n.literal(), "1.0");
/// assert!((n.value() - 1.0).abs() < f64::EPSILON);
/// assert!(Number::parse("abc").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    literal: String,
    value: f64,
}

impl Number {
    /// Parses a finite number, keeping `text` (trimmed) as its literal form.
    ///
    /// The literal must also be a valid TOML integer or float, since it is
    /// rendered verbatim: `.5`, `1.` and `01` are rejected.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let literal = text.trim();
        if !is_toml_number(literal) {
            return None;
        }
        let value: f64 = literal.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            literal: literal.to_string(),
            value,
        })
    }

    /// The literal text as supplied.
    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The numeric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

/// `[+-]? int ('.' digits)? ([eE] [+-]? digits)?` where `int` has no
/// leading zero unless it is exactly `0`.
fn is_toml_number(literal: &str) -> bool {
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }

    let unsigned = literal.strip_prefix(&['+', '-'][..]).unwrap_or(literal);
    let (mantissa, exponent) = match unsigned.split_once(&['e', 'E'][..]) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };

    if !digits(int) || (int.len() > 1 && int.starts_with('0')) {
        return false;
    }
    if frac.is_some_and(|frac| !digits(frac)) {
        return false;
    }
    match exponent {
        Some(exponent) => digits(exponent.strip_prefix(&['+', '-'][..]).unwrap_or(exponent)),
        None => true,
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// An ordered record of named settings.
pub type Record = Vec<(String, SettingValue)>;

/// A single node of a [`SettingsTree`](crate::settings::SettingsTree).
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// A string scalar.
    String(String),
    /// A boolean scalar.
    Bool(bool),
    /// A numeric scalar.
    Number(Number),
    /// An ordered list (of records, numbers, ...).
    List(Vec<SettingValue>),
    /// A nested, ordered record.
    Record(Record),
}

impl SettingValue {
    /// Short name of the value's kind, used in validation messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    /// Returns the string if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the record fields if this is a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Looks up a direct child of a record by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&SettingValue> {
        self.as_record()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Converts a YAML value into a setting value.
    ///
    /// Returns `Ok(None)` for YAML null, which the tree treats as absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for mapping keys that are not scalars.
    pub fn from_yaml(field: &str, value: serde_yaml::Value) -> Result<Option<Self>> {
        use serde_yaml::Value;

        let converted = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                let text = n.to_string();
                let number = Number::parse(&text).ok_or_else(|| {
                    Error::validation(field, format!("'{text}' is not a finite number"))
                })?;
                Self::Number(number)
            }
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let item_field = format!("{field}[{index}]");
                    // Nulls inside a list are kept positional as empty records.
                    let item = Self::from_yaml(&item_field, item)?
                        .unwrap_or_else(|| Self::Record(Vec::new()));
                    list.push(item);
                }
                Self::List(list)
            }
            Value::Mapping(mapping) => Self::Record(Self::record_from_mapping(field, mapping)?),
            Value::Tagged(tagged) => return Self::from_yaml(field, tagged.value),
        };
        Ok(Some(converted))
    }

    pub(crate) fn record_from_mapping(field: &str, mapping: serde_yaml::Mapping) -> Result<Record> {
        let mut record = Record::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = Self::key_to_string(field, key)?;
            let child_field = if field.is_empty() {
                key.clone()
            } else {
                format!("{field}.{key}")
            };
            if let Some(value) = Self::from_yaml(&child_field, value)? {
                record.push((key, value));
            }
        }
        Ok(record)
    }

    fn key_to_string(field: &str, key: serde_yaml::Value) -> Result<String> {
        use serde_yaml::Value;

        match key {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(Error::validation(
                if field.is_empty() { "<root>" } else { field },
                format!("unsupported mapping key {other:?}"),
            )),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Number> for SettingValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}
