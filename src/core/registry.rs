//! Entity type registry
//!
//! Built once at startup from the declared entity types and read-only
//! afterwards, so it is shared between concurrent requests without locking.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::entity::EntityTypeDescriptor;
use crate::core::error::{ConfigError, NotFoundError};
use crate::core::pluralize::Pluralizer;

/// Registry of every exposed entity type
#[derive(Debug, Default)]
pub struct EntityRegistry {
    descriptors: Vec<Arc<EntityTypeDescriptor>>,
}

impl EntityRegistry {
    /// Build and validate a registry
    ///
    /// Fails on duplicate type names, duplicate property or relationship
    /// names within a type, and relationships targeting unregistered types.
    pub fn new(descriptors: Vec<EntityTypeDescriptor>) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.name.is_empty() {
                return Err(ConfigError::Invalid {
                    message: "entity type name must not be empty".to_string(),
                });
            }
            if !names.insert(descriptor.name.as_str()) {
                return Err(ConfigError::DuplicateType {
                    name: descriptor.name.clone(),
                });
            }
            Self::check_members(descriptor)?;
        }

        for descriptor in &descriptors {
            for relationship in &descriptor.relationships {
                if !names.contains(relationship.target.as_str()) {
                    return Err(ConfigError::UnknownTarget {
                        entity_type: descriptor.name.clone(),
                        relationship: relationship.name.clone(),
                        target: relationship.target.clone(),
                    });
                }
            }
        }

        Ok(Self {
            descriptors: descriptors.into_iter().map(Arc::new).collect(),
        })
    }

    fn check_members(descriptor: &EntityTypeDescriptor) -> Result<(), ConfigError> {
        let mut members = HashSet::new();
        let property_names = descriptor.properties.iter().map(|p| p.name.as_str());
        let relationship_names = descriptor.relationships.iter().map(|r| r.name.as_str());
        for name in property_names.chain(relationship_names) {
            if !members.insert(name) {
                return Err(ConfigError::DuplicateMember {
                    entity_type: descriptor.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a URL path segment to exactly one entity type
    ///
    /// The segment is case-normalized, then matched against each type's
    /// declared plural, against each type's name, and against each type's
    /// name after singularizing the segment. Zero matches and more than one
    /// match are both failures.
    pub fn resolve(&self, segment: &str) -> Result<Arc<EntityTypeDescriptor>, NotFoundError> {
        let normalized = Pluralizer::normalize_segment(segment);
        let singular = Pluralizer::singularize(&normalized);

        let matches: Vec<&Arc<EntityTypeDescriptor>> = self
            .descriptors
            .iter()
            .filter(|d| d.name == singular || d.plural_name == normalized || d.name == normalized)
            .collect();

        match matches.as_slice() {
            [descriptor] => Ok(Arc::clone(descriptor)),
            [] => Err(NotFoundError::UnknownType {
                segment: segment.to_string(),
            }),
            many => Err(NotFoundError::AmbiguousType {
                segment: segment.to_string(),
                candidates: many.iter().map(|d| d.name.clone()).collect(),
            }),
        }
    }

    /// Get a descriptor by its exact singular name
    pub fn get(&self, name: &str) -> Option<Arc<EntityTypeDescriptor>> {
        self.descriptors.iter().find(|d| d.name == name).cloned()
    }

    /// All registered descriptors, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<EntityTypeDescriptor>> {
        self.descriptors.iter()
    }

    /// Get all registered entity type names
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
