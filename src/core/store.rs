//! Data-access layer contract
//!
//! The core never persists anything itself. Every read and write goes through
//! a [`DataStore`], which owns the resources, assigns identities, runs
//! validation on save and traverses relationships. Each call is one unit of
//! work; the core neither batches nor retries them.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::entity::{EntityTypeDescriptor, RelationshipDescriptor};
use crate::core::query::Query;
use crate::core::resource::{Attributes, Resource, ResourceId};

/// Typed CRUD, query execution and relationship traversal
///
/// `Err` is reserved for infrastructure failures. Policy outcomes are values:
/// a missing resource is `Ok(None)`, a refused save or destroy is `Ok(false)`.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Execute a collection query
    async fn find_all(
        &self,
        entity_type: &EntityTypeDescriptor,
        query: &Query,
    ) -> Result<Vec<Resource>>;

    /// Get one resource by primary key
    async fn get(
        &self,
        entity_type: &EntityTypeDescriptor,
        id: ResourceId,
    ) -> Result<Option<Resource>>;

    /// Construct an unsaved resource from attributes
    fn create(&self, entity_type: &EntityTypeDescriptor, attributes: Attributes) -> Resource {
        Resource::new(entity_type.name.clone(), attributes)
    }

    /// Persist a new or modified resource
    ///
    /// On success the resource carries its id; on failure `errors` describes
    /// why and nothing was written.
    async fn save(&self, resource: &mut Resource) -> Result<bool>;

    /// Remove a persisted resource; `false` when a constraint forbids it
    async fn destroy(&self, resource: &Resource) -> Result<bool>;

    /// Messages describing the last failed save of `resource`
    fn errors(&self, resource: &Resource) -> Vec<String> {
        resource.errors().to_vec()
    }

    /// Query the targets of a to-many relationship
    async fn find_related(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
        query: &Query,
    ) -> Result<Vec<Resource>>;

    /// Get one target of a to-many relationship by id
    async fn find_related_by_id(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
        id: ResourceId,
    ) -> Result<Option<Resource>> {
        let query = Query {
            limit: usize::MAX,
            ..Query::first_page(&target_type.name)
        };
        let related = self.find_related(owner, relationship, target_type, &query).await?;
        Ok(related.into_iter().find(|r| r.id() == Some(id)))
    }

    /// Get the target of a to-one relationship
    async fn get_related(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
    ) -> Result<Option<Resource>>;

    /// Add `target` to a to-many relationship
    ///
    /// `target` may be unsaved; the association is persisted with it.
    async fn append(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target: &mut Resource,
    ) -> Result<()>;

    /// Make `target` the association of a to-one relationship
    ///
    /// When `target` is unsaved the association is persisted when it is.
    async fn assign(
        &self,
        owner: &mut Resource,
        relationship: &RelationshipDescriptor,
        target: &mut Resource,
    ) -> Result<()>;
}
