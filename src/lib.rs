//! # Halo Framework
//!
//! A generic hypermedia resource layer for building HAL JSON APIs in Rust.
//!
//! ## Features
//!
//! - **Declarative Entity Types**: Properties, validation rules and relationships in YAML or code
//! - **Generic Routes**: List, create, read, update and delete for every type,
//!   with no per-type handlers
//! - **Relationships**: To-one and to-many associations navigable and creatable through sub-paths
//! - **Hypermedia Output**: `_links` and `_embedded` documents served as `application/hal+json`
//! - **Validated Queries**: Paging and ordering checked against the declared properties
//! - **Pluggable Storage**: Any [`DataStore`](core::store::DataStore); an
//!   in-memory store ships by default
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use halo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config_file("schema.yaml")?
//!         .register_type(
//!             EntityTypeDescriptor::new("tag")
//!                 .with_property(PropertyDescriptor::new("label", PropertyKind::String)),
//!         )
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```
//!
//! ```text
//! POST /books {"title": "Dune"}
//! => 201 {"_links":{"self":{"href":"books/1"},"author":{"href":"books/1/author"}},"title":"Dune"}
//! ```

pub mod config;
pub mod core;
pub mod hal;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        attributes::{extract_attributes, writable_attributes},
        controller::{Operation, Outcome, RequestContext, ResourceController},
        entity::{
            Cardinality, EntityTypeDescriptor, PropertyDescriptor, PropertyKind,
            RelationshipDescriptor,
        },
        error::{
            ConfigError, DeleteError, HaloError, NotFoundError, OrderError, RequestError,
            ValidationError,
        },
        field::{FieldFormat, FieldValue},
        pluralize::Pluralizer,
        query::{Direction, Paging, Query, QueryBuilder, QueryParams},
        registry::EntityRegistry,
        relationship::RelationshipHandle,
        resource::{Attributes, Resource, ResourceId},
        store::DataStore,
        validation::PropertyRule,
    };

    // === HAL ===
    pub use crate::hal::{HAL_CONTENT_TYPE, HalSerializer, Representation};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{EntityConfig, HaloConfig, RelationshipConfig, ServerSettings};

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::Router;
}
