//! Writable attribute filtering
//!
//! Clients may send anything in a request body. Only declared properties that
//! are neither the identifier nor foreign-key shaped ever reach create or
//! update; everything else is dropped without error.

use serde_json::{Map, Value};

use crate::core::entity::{EntityTypeDescriptor, PropertyDescriptor};
use crate::core::field::FieldValue;
use crate::core::resource::Attributes;

/// Properties a client may write, in declaration order
pub fn writable_attributes(descriptor: &EntityTypeDescriptor) -> Vec<&PropertyDescriptor> {
    descriptor
        .properties
        .iter()
        .filter(|p| p.is_writable())
        .collect()
}

/// Restrict raw body parameters to the writable properties present in them
///
/// The result follows the declaration order of the properties, not the order
/// of the body.
pub fn extract_attributes(
    descriptor: &EntityTypeDescriptor,
    raw: &Map<String, Value>,
) -> Attributes {
    writable_attributes(descriptor)
        .into_iter()
        .filter_map(|property| {
            raw.get(&property.name)
                .map(|value| (property.name.clone(), FieldValue::from_json(value)))
        })
        .collect()
}
