//! Scalar field values and string formats

use chrono::{DateTime, FixedOffset, SecondsFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::core::entity::PropertyKind;

/// A polymorphic scalar value held by a resource attribute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Uuid(Uuid),
    DateTime(DateTime<FixedOffset>),
    String(String),
}

impl FieldValue {
    /// Convert a raw JSON value
    ///
    /// Arrays and objects are not scalars; they are kept as their JSON text so
    /// that kind validation can report them instead of dropping them silently.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => FieldValue::String(s.clone()),
            other => FieldValue::String(other.to_string()),
        }
    }

    /// Convert to a JSON value for rendering
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Uuid(u) => serde_json::Value::String(u.to_string()),
            FieldValue::DateTime(d) => {
                serde_json::Value::String(d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Coerce this value into the declared kind of a property
    ///
    /// Returns `None` when the value cannot represent that kind. Null coerces
    /// to every kind; presence is a separate rule. Integers are already valid
    /// floats and stay integers, so `10` renders back as `10`. Datetimes keep
    /// the offset they were written with.
    pub fn coerce(&self, kind: PropertyKind) -> Option<FieldValue> {
        match (kind, self) {
            (_, FieldValue::Null) => Some(FieldValue::Null),
            (PropertyKind::String, FieldValue::String(_)) => Some(self.clone()),
            (PropertyKind::Integer, FieldValue::Integer(_)) => Some(self.clone()),
            (PropertyKind::Integer, FieldValue::String(s)) => {
                s.trim().parse().ok().map(FieldValue::Integer)
            }
            (PropertyKind::Float, FieldValue::Float(_)) => Some(self.clone()),
            (PropertyKind::Float, FieldValue::Integer(_)) => Some(self.clone()),
            (PropertyKind::Float, FieldValue::String(s)) => {
                s.trim().parse().ok().map(FieldValue::Float)
            }
            (PropertyKind::Boolean, FieldValue::Boolean(_)) => Some(self.clone()),
            (PropertyKind::Boolean, FieldValue::String(s)) => match s.as_str() {
                "true" => Some(FieldValue::Boolean(true)),
                "false" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            (PropertyKind::Uuid, FieldValue::Uuid(_)) => Some(self.clone()),
            (PropertyKind::Uuid, FieldValue::String(s)) => {
                Uuid::parse_str(s).ok().map(FieldValue::Uuid)
            }
            (PropertyKind::DateTime, FieldValue::DateTime(_)) => Some(self.clone()),
            (PropertyKind::DateTime, FieldValue::String(s)) => {
                DateTime::parse_from_rfc3339(s).ok().map(FieldValue::DateTime)
            }
            _ => None,
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Total order used when sorting resources
    ///
    /// Null sorts first. Numbers compare numerically across integer and
    /// float; other mixed kinds fall back to a fixed rank.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Float(_) => 2,
            FieldValue::Uuid(_) => 3,
            FieldValue::DateTime(_) => 4,
            FieldValue::String(_) => 5,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// String formats a property value can be required to match
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "FormatSpec")]
pub enum FieldFormat {
    Email,
    Uuid,
    Url,
    Phone,
    Custom(Regex),
}

/// Declared form of a [`FieldFormat`]: a well-known name or `{ pattern: ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FormatSpec {
    Named(String),
    Pattern { pattern: String },
}

impl TryFrom<FormatSpec> for FieldFormat {
    type Error = String;

    fn try_from(spec: FormatSpec) -> Result<Self, Self::Error> {
        match spec {
            FormatSpec::Named(name) => match name.as_str() {
                "email" => Ok(FieldFormat::Email),
                "uuid" => Ok(FieldFormat::Uuid),
                "url" => Ok(FieldFormat::Url),
                "phone" => Ok(FieldFormat::Phone),
                other => Err(format!("unknown format '{}'", other)),
            },
            FormatSpec::Pattern { pattern } => Regex::new(&pattern)
                .map(FieldFormat::Custom)
                .map_err(|e| format!("invalid pattern '{}': {}", pattern, e)),
        }
    }
}

impl FieldFormat {
    /// Validate a field value against this format
    pub fn validate(&self, value: &FieldValue) -> bool {
        let string_value = match value {
            FieldValue::String(s) => s.as_str(),
            FieldValue::Uuid(_) => return matches!(self, FieldFormat::Uuid),
            _ => return false,
        };

        match self {
            FieldFormat::Email => email_regex().is_match(string_value),
            FieldFormat::Uuid => Uuid::parse_str(string_value).is_ok(),
            FieldFormat::Url => url_regex().is_match(string_value),
            FieldFormat::Phone => phone_regex().is_match(string_value),
            FieldFormat::Custom(regex) => regex.is_match(string_value),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
    })
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern"))
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    // E.164: 8 to 15 digits
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone pattern"))
}
