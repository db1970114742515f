//! Hypermedia (HAL) rendering
//!
//! [`HalSerializer`] turns resources and query results into
//! [`Representation`]s; a representation serializes to the
//! `application/hal+json` document clients navigate by following links.

pub mod representation;
pub mod serializer;

pub use representation::{HAL_CONTENT_TYPE, Link, LinkValue, Representation};
pub use serializer::HalSerializer;
