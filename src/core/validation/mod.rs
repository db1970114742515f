//! Declarative property validation
//!
//! Properties carry [`PropertyRule`]s that the data-access layer evaluates
//! when a resource is saved. Kind mismatches are reported the same way, so a
//! failed save always yields a flat list of field-level messages.

pub mod validators;

pub use validators::{PropertyRule, validate_attributes};
