//! Core module containing the resource model and request handling

pub mod attributes;
pub mod controller;
pub mod entity;
pub mod error;
pub mod field;
pub mod pluralize;
pub mod query;
pub mod registry;
pub mod relationship;
pub mod resource;
pub mod store;
pub mod validation;

pub use attributes::{extract_attributes, writable_attributes};
pub use controller::{Operation, Outcome, RequestContext, ResourceController};
pub use entity::{
    Cardinality, EntityTypeDescriptor, PropertyDescriptor, PropertyKind, RelationshipDescriptor,
};
pub use error::{
    ConfigError, DeleteError, HaloError, NotFoundError, OrderError, RequestError, ValidationError,
};
pub use field::{FieldFormat, FieldValue};
pub use pluralize::Pluralizer;
pub use query::{Direction, OrderClause, Paging, Query, QueryBuilder, QueryParams};
pub use registry::EntityRegistry;
pub use relationship::{RelationshipHandle, ToManyHandle, ToOneHandle};
pub use resource::{Attributes, Resource, ResourceId};
pub use store::DataStore;
