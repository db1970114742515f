//! In-memory implementation of DataStore for testing and development

use crate::core::entity::{Cardinality, EntityTypeDescriptor, RelationshipDescriptor};
use crate::core::field::FieldValue;
use crate::core::query::{Direction, Query};
use crate::core::registry::EntityRegistry;
use crate::core::resource::{Attributes, PendingAssociation, Resource, ResourceId};
use crate::core::store::DataStore;
use crate::core::validation::validate_attributes;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows of one entity type, in insertion order
#[derive(Debug, Default)]
struct Table {
    last_id: ResourceId,
    rows: IndexMap<ResourceId, Attributes>,
}

impl Table {
    fn next_id(&mut self) -> ResourceId {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory data store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Ids are sequential per entity type, starting at 1. Validation rules
/// declared on the registry's properties run on every save.
#[derive(Clone)]
pub struct InMemoryStore {
    registry: Arc<EntityRegistry>,
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStore {
    /// Create an empty store for the types of `registry`
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self {
            registry,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored resources of a type
    pub fn count(&self, entity_type: &str) -> Result<usize> {
        let tables = self.read()?;
        Ok(tables.get(entity_type).map_or(0, |t| t.rows.len()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    fn descriptor(&self, entity_type: &str) -> Result<Arc<EntityTypeDescriptor>> {
        self.registry
            .get(entity_type)
            .ok_or_else(|| anyhow!("Entity type '{}' is not registered", entity_type))
    }

    /// Rows of `entity_type` matching `filter`, sorted and paged by `query`
    ///
    /// `query` must have been built against `entity_type`, so that every order
    /// clause names one of its properties.
    fn select(
        &self,
        entity_type: &str,
        query: &Query,
        filter: impl Fn(&Attributes) -> bool,
    ) -> Result<Vec<Resource>> {
        if query.entity_type != entity_type {
            return Err(anyhow!(
                "query built for '{}' cannot select '{}'",
                query.entity_type,
                entity_type
            ));
        }

        let tables = self.read()?;
        let Some(table) = tables.get(entity_type) else {
            return Ok(Vec::new());
        };

        let mut resources: Vec<Resource> = table
            .rows
            .iter()
            .filter(|(_, attributes)| filter(*attributes))
            .map(|(id, attributes)| Resource::persisted(entity_type, *id, attributes.clone()))
            .collect();

        // sort_by is stable, so ties keep insertion order
        resources.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|clause| {
                    let left = a.get(&clause.property.name).unwrap_or(FieldValue::Null);
                    let right = b.get(&clause.property.name).unwrap_or(FieldValue::Null);
                    match clause.direction {
                        Direction::Asc => left.compare(&right),
                        Direction::Desc => right.compare(&left),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(resources
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    /// Whether any stored row still points at `resource` through a declared relationship
    fn is_referenced(
        &self,
        tables: &HashMap<String, Table>,
        resource: &Resource,
        id: ResourceId,
    ) -> bool {
        let points_at = |entity_type: &str, foreign_key: &str| {
            tables.get(entity_type).is_some_and(|table| {
                table
                    .rows
                    .values()
                    .any(|row| row.get(foreign_key).and_then(FieldValue::as_integer) == Some(id))
            })
        };

        self.registry.descriptors().any(|descriptor| {
            descriptor.relationships.iter().any(|relationship| match relationship.cardinality {
                Cardinality::ToOne => {
                    relationship.target == resource.entity_type()
                        && points_at(&descriptor.name, &relationship.foreign_key)
                }
                Cardinality::ToMany => {
                    descriptor.name == resource.entity_type()
                        && points_at(&relationship.target, &relationship.foreign_key)
                }
            })
        })
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn find_all(
        &self,
        entity_type: &EntityTypeDescriptor,
        query: &Query,
    ) -> Result<Vec<Resource>> {
        self.select(&entity_type.name, query, |_| true)
    }

    async fn get(
        &self,
        entity_type: &EntityTypeDescriptor,
        id: ResourceId,
    ) -> Result<Option<Resource>> {
        let tables = self.read()?;
        Ok(tables
            .get(&entity_type.name)
            .and_then(|table| table.rows.get(&id))
            .map(|attributes| {
                Resource::persisted(entity_type.name.clone(), id, attributes.clone())
            }))
    }

    async fn save(&self, resource: &mut Resource) -> Result<bool> {
        let descriptor = self.descriptor(resource.entity_type())?;
        let attributes = match validate_attributes(&descriptor, resource.attributes()) {
            Ok(attributes) => attributes,
            Err(messages) => {
                resource.set_errors(messages);
                return Ok(false);
            }
        };

        let mut tables = self.write()?;
        let table = tables.entry(descriptor.name.clone()).or_default();
        let id = match resource.id() {
            Some(id) => id,
            None => table.next_id(),
        };
        table.rows.insert(id, attributes.clone());

        for PendingAssociation {
            owner_type,
            owner_id,
            foreign_key,
        } in resource.take_pending_associations()
        {
            let owner = tables
                .get_mut(&owner_type)
                .and_then(|table| table.rows.get_mut(&owner_id))
                .ok_or_else(|| {
                    anyhow!(
                        "{} '{}' vanished before its association was saved",
                        owner_type,
                        owner_id
                    )
                })?;
            owner.insert(foreign_key, FieldValue::Integer(id));
        }

        resource.set_id(id);
        resource.replace_attributes(attributes);
        resource.set_errors(Vec::new());
        Ok(true)
    }

    async fn destroy(&self, resource: &Resource) -> Result<bool> {
        let id = resource
            .id()
            .ok_or_else(|| anyhow!("Cannot destroy an unsaved {}", resource.entity_type()))?;

        let mut tables = self.write()?;
        if self.is_referenced(&tables, resource, id) {
            return Ok(false);
        }

        Ok(tables
            .get_mut(resource.entity_type())
            .and_then(|table| table.rows.shift_remove(&id))
            .is_some())
    }

    async fn find_related(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
        query: &Query,
    ) -> Result<Vec<Resource>> {
        let Some(owner_id) = owner.id() else {
            return Ok(Vec::new());
        };
        self.select(&target_type.name, query, |row| {
            row.get(&relationship.foreign_key).and_then(FieldValue::as_integer) == Some(owner_id)
        })
    }

    async fn find_related_by_id(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
        id: ResourceId,
    ) -> Result<Option<Resource>> {
        let related = self.get(target_type, id).await?;
        Ok(related.filter(|r| {
            owner.id().is_some() && r.foreign_key(&relationship.foreign_key) == owner.id()
        }))
    }

    async fn get_related(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target_type: &EntityTypeDescriptor,
    ) -> Result<Option<Resource>> {
        match owner.foreign_key(&relationship.foreign_key) {
            Some(target_id) => self.get(target_type, target_id).await,
            None => Ok(None),
        }
    }

    async fn append(
        &self,
        owner: &Resource,
        relationship: &RelationshipDescriptor,
        target: &mut Resource,
    ) -> Result<()> {
        let owner_id = owner
            .id()
            .ok_or_else(|| anyhow!("Cannot append to an unsaved {}", owner.entity_type()))?;
        target.set(relationship.foreign_key.clone(), FieldValue::Integer(owner_id));
        Ok(())
    }

    async fn assign(
        &self,
        owner: &mut Resource,
        relationship: &RelationshipDescriptor,
        target: &mut Resource,
    ) -> Result<()> {
        let owner_id = owner
            .id()
            .ok_or_else(|| anyhow!("Cannot assign to an unsaved {}", owner.entity_type()))?;

        if let Some(target_id) = target.id() {
            let mut tables = self.write()?;
            let row = tables
                .get_mut(owner.entity_type())
                .and_then(|table| table.rows.get_mut(&owner_id))
                .ok_or_else(|| anyhow!("{} '{}' is not stored", owner.entity_type(), owner_id))?;
            row.insert(relationship.foreign_key.clone(), FieldValue::Integer(target_id));
            owner.set(relationship.foreign_key.clone(), FieldValue::Integer(target_id));
            return Ok(());
        }

        target.add_pending_association(PendingAssociation {
            owner_type: owner.entity_type().to_string(),
            owner_id,
            foreign_key: relationship.foreign_key.clone(),
        });
        Ok(())
    }
}
