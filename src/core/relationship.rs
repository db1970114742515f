//! Relationship resolution
//!
//! Resolving a relationship name on a resource yields a [`RelationshipHandle`]
//! whose variant fixes the cardinality: a to-one handle can be read and set, a
//! to-many handle can be queried and appended to. Callers branch on the
//! variant instead of asking the resource what kind of association it has.

use std::sync::Arc;

use crate::core::entity::{Cardinality, EntityTypeDescriptor, RelationshipDescriptor};
use crate::core::error::{ConfigError, HaloError, NotFoundError};
use crate::core::query::Query;
use crate::core::registry::EntityRegistry;
use crate::core::resource::{Resource, ResourceId};
use crate::core::store::DataStore;

/// Capability object for one relationship of one resource
pub enum RelationshipHandle<'a> {
    ToOne(ToOneHandle<'a>),
    ToMany(ToManyHandle<'a>),
}

impl<'a> RelationshipHandle<'a> {
    /// Resolve `name` on `owner`
    ///
    /// Fails with `NotFound` when the owner's type declares no relationship
    /// with that name.
    pub fn resolve(
        registry: &EntityRegistry,
        store: &'a dyn DataStore,
        owner: &'a mut Resource,
        name: &str,
    ) -> Result<Self, HaloError> {
        let owner_type = registry
            .get(owner.entity_type())
            .ok_or_else(|| NotFoundError::UnknownType {
                segment: owner.entity_type().to_string(),
            })?;
        let descriptor = owner_type
            .relationship(name)
            .cloned()
            .ok_or_else(|| NotFoundError::UnknownRelationship {
                entity_type: owner_type.name.clone(),
                relationship: name.to_string(),
            })?;
        let target_type = registry
            .get(&descriptor.target)
            .ok_or_else(|| ConfigError::UnknownTarget {
                entity_type: owner_type.name.clone(),
                relationship: descriptor.name.clone(),
                target: descriptor.target.clone(),
            })?;

        Ok(match descriptor.cardinality {
            Cardinality::ToOne => RelationshipHandle::ToOne(ToOneHandle {
                owner,
                descriptor,
                target_type,
                store,
            }),
            Cardinality::ToMany => RelationshipHandle::ToMany(ToManyHandle {
                owner,
                descriptor,
                target_type,
                store,
            }),
        })
    }

    pub fn cardinality(&self) -> Cardinality {
        self.descriptor().cardinality
    }

    pub fn descriptor(&self) -> &RelationshipDescriptor {
        match self {
            RelationshipHandle::ToOne(h) => &h.descriptor,
            RelationshipHandle::ToMany(h) => &h.descriptor,
        }
    }

    /// Descriptor of the related entity type
    pub fn target_type(&self) -> &Arc<EntityTypeDescriptor> {
        match self {
            RelationshipHandle::ToOne(h) => &h.target_type,
            RelationshipHandle::ToMany(h) => &h.target_type,
        }
    }
}

/// Handle on a to-one relationship
pub struct ToOneHandle<'a> {
    owner: &'a mut Resource,
    descriptor: RelationshipDescriptor,
    target_type: Arc<EntityTypeDescriptor>,
    store: &'a dyn DataStore,
}

impl ToOneHandle<'_> {
    /// The associated resource, if any
    pub async fn get(&self) -> Result<Option<Resource>, HaloError> {
        let related = self
            .store
            .get_related(&*self.owner, &self.descriptor, &self.target_type)
            .await?;
        Ok(related)
    }

    /// Make `target` the association
    pub async fn set(&mut self, target: &mut Resource) -> Result<(), HaloError> {
        self.store.assign(&mut *self.owner, &self.descriptor, target).await?;
        Ok(())
    }

    pub fn owner(&self) -> &Resource {
        &*self.owner
    }

    pub fn target_type(&self) -> &Arc<EntityTypeDescriptor> {
        &self.target_type
    }
}

/// Handle on a to-many relationship
pub struct ToManyHandle<'a> {
    owner: &'a Resource,
    descriptor: RelationshipDescriptor,
    target_type: Arc<EntityTypeDescriptor>,
    store: &'a dyn DataStore,
}

impl ToManyHandle<'_> {
    /// Query the associated resources
    ///
    /// `query` must have been built against the target type.
    pub async fn get(&self, query: &Query) -> Result<Vec<Resource>, HaloError> {
        let related = self
            .store
            .find_related(self.owner, &self.descriptor, &self.target_type, query)
            .await?;
        Ok(related)
    }

    /// One associated resource by id
    pub async fn find(&self, id: ResourceId) -> Result<Option<Resource>, HaloError> {
        let related = self
            .store
            .find_related_by_id(self.owner, &self.descriptor, &self.target_type, id)
            .await?;
        Ok(related)
    }

    /// Add `target` to the association
    pub async fn append(&self, target: &mut Resource) -> Result<(), HaloError> {
        self.store.append(self.owner, &self.descriptor, target).await?;
        Ok(())
    }

    pub fn owner(&self) -> &Resource {
        self.owner
    }

    pub fn target_type(&self) -> &Arc<EntityTypeDescriptor> {
        &self.target_type
    }
}
