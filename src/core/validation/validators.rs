//! Reusable property validators

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::entity::EntityTypeDescriptor;
use crate::core::field::{FieldFormat, FieldValue};

/// A validation rule attached to a property
///
/// Declared in configuration either by name (`required`, `positive`) or as a
/// single-key mapping (`{ max_length: 200 }`, `{ format: email }`).
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RuleSpec")]
pub enum PropertyRule {
    /// Value must be present and non-null
    Required,
    /// String must have at least this many characters
    MinLength(usize),
    /// String must have at most this many characters
    MaxLength(usize),
    /// Number must be strictly positive
    Positive,
    /// String must be one of the listed values
    OneOf(Vec<String>),
    /// String must match a format
    Format(FieldFormat),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleSpec {
    Named(String),
    MinLength { min_length: usize },
    MaxLength { max_length: usize },
    OneOf { one_of: Vec<String> },
    Format { format: FieldFormat },
}

impl TryFrom<RuleSpec> for PropertyRule {
    type Error = String;

    fn try_from(spec: RuleSpec) -> Result<Self, Self::Error> {
        match spec {
            RuleSpec::Named(name) => match name.as_str() {
                "required" => Ok(PropertyRule::Required),
                "positive" => Ok(PropertyRule::Positive),
                other => Err(format!("unknown rule '{}'", other)),
            },
            RuleSpec::MinLength { min_length } => Ok(PropertyRule::MinLength(min_length)),
            RuleSpec::MaxLength { max_length } => Ok(PropertyRule::MaxLength(max_length)),
            RuleSpec::OneOf { one_of } => Ok(PropertyRule::OneOf(one_of)),
            RuleSpec::Format { format } => Ok(PropertyRule::Format(format)),
        }
    }
}

impl PropertyRule {
    /// Check one value; null values only fail `Required`
    pub fn check(&self, field: &str, value: &FieldValue) -> Result<(), String> {
        if value.is_null() {
            return match self {
                PropertyRule::Required => Err(format!("{} is required", field)),
                _ => Ok(()),
            };
        }

        match self {
            PropertyRule::Required => Ok(()),
            PropertyRule::MinLength(min) => match value.as_string() {
                Some(s) if s.chars().count() < *min => Err(format!(
                    "{} must be at least {} characters long",
                    field, min
                )),
                _ => Ok(()),
            },
            PropertyRule::MaxLength(max) => match value.as_string() {
                Some(s) if s.chars().count() > *max => {
                    Err(format!("{} must be at most {} characters long", field, max))
                }
                _ => Ok(()),
            },
            PropertyRule::Positive => match value.as_float() {
                Some(n) if n <= 0.0 => Err(format!("{} must be positive", field)),
                _ => Ok(()),
            },
            PropertyRule::OneOf(allowed) => match value.as_string() {
                Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
                    "{} must be one of: {}",
                    field,
                    allowed.join(", ")
                )),
                _ => Ok(()),
            },
            PropertyRule::Format(format) => {
                if format.validate(value) {
                    Ok(())
                } else {
                    Err(format!("{} is invalid", field))
                }
            }
        }
    }
}

/// Validate and coerce a resource's attributes against its type
///
/// Every declared property except the identifier is checked: values are
/// coerced to the declared kind, then the property's rules run in
/// declaration order. Returns the coerced attributes, or every message
/// collected.
pub fn validate_attributes(
    descriptor: &EntityTypeDescriptor,
    attributes: &IndexMap<String, FieldValue>,
) -> Result<IndexMap<String, FieldValue>, Vec<String>> {
    let mut coerced = attributes.clone();
    let mut messages = Vec::new();

    for property in descriptor.properties.iter().filter(|p| !p.is_identifier()) {
        let raw = attributes.get(&property.name).unwrap_or(&FieldValue::Null);
        let value = match raw.coerce(property.kind) {
            Some(value) => value,
            None => {
                messages.push(format!(
                    "{} must be of type {}",
                    property.name,
                    property.kind.as_str()
                ));
                continue;
            }
        };

        for rule in &property.rules {
            if let Err(message) = rule.check(&property.name, &value) {
                messages.push(message);
            }
        }

        if attributes.contains_key(&property.name) {
            coerced.insert(property.name.clone(), value);
        }
    }

    if messages.is_empty() {
        Ok(coerced)
    } else {
        Err(messages)
    }
}
