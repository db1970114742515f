//! Configuration loading and management
//!
//! Entity types are declared in YAML:
//!
//! ```yaml
//! server:
//!   default_limit: 30
//!   max_limit: 100
//!
//! entities:
//!   - name: author
//!     properties:
//!       - { name: name, kind: string, rules: [required] }
//!     relationships:
//!       - { name: books, cardinality: to_many, target: book }
//!   - name: book
//!     properties:
//!       - { name: title, kind: string, rules: [required, { max_length: 200 }] }
//!       - { name: author_id, kind: integer }
//!     relationships:
//!       - { name: author, cardinality: to_one, target: author }
//! ```

use crate::core::entity::{
    Cardinality, EntityTypeDescriptor, PropertyDescriptor, RelationshipDescriptor,
};
use crate::core::error::ConfigError;
use crate::core::query::{DEFAULT_LIMIT, DEFAULT_OFFSET, MAX_LIMIT, Paging};
use crate::core::registry::EntityRegistry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Paging settings applied to every collection request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Limit used when a request gives none
    pub default_limit: usize,

    /// Requests asking for more are capped to this
    pub max_limit: usize,

    /// Offset used when a request gives none
    pub default_offset: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            default_offset: DEFAULT_OFFSET,
        }
    }
}

impl ServerSettings {
    pub fn paging(&self) -> Paging {
        Paging {
            default_offset: self.default_offset,
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

/// Declaration of one relationship
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipConfig {
    pub name: String,
    pub cardinality: Cardinality,

    /// Singular name of the target type
    pub target: String,

    /// Defaults to `<name>_id` on the owner for to-one, `<owner>_id` on the
    /// target for to-many
    #[serde(default)]
    pub foreign_key: Option<String>,
}

/// Declaration of one entity type
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    /// Singular snake_case name (e.g. "book")
    pub name: String,

    /// Plural URL segment; derived from the name when omitted
    #[serde(default)]
    pub plural: Option<String>,

    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,

    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
}

impl EntityConfig {
    /// Turn the declaration into a type descriptor
    pub fn to_descriptor(&self) -> EntityTypeDescriptor {
        let mut descriptor = EntityTypeDescriptor::new(self.name.clone());
        if let Some(plural) = &self.plural {
            descriptor = descriptor.with_plural(plural.clone());
        }
        for property in &self.properties {
            descriptor = descriptor.with_property(property.clone());
        }
        for relationship in &self.relationships {
            let mut declared = match relationship.cardinality {
                Cardinality::ToOne => RelationshipDescriptor::to_one(
                    relationship.name.clone(),
                    relationship.target.clone(),
                ),
                Cardinality::ToMany => RelationshipDescriptor::to_many(
                    relationship.name.clone(),
                    &self.name,
                    relationship.target.clone(),
                ),
            };
            if let Some(foreign_key) = &relationship.foreign_key {
                declared = declared.with_foreign_key(foreign_key.clone());
            }
            descriptor = descriptor.with_relationship(declared);
        }
        descriptor
    }
}

/// Complete configuration of a halo server
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HaloConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl HaloConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations
    ///
    /// Entity declarations are concatenated in order; a type declared twice
    /// is rejected when the registry is built. Server settings come from the
    /// last configuration.
    pub fn merge(configs: Vec<HaloConfig>) -> Self {
        let mut merged = HaloConfig::default();
        for config in configs {
            merged.server = config.server;
            merged.entities.extend(config.entities);
        }
        merged
    }

    /// Build and validate the entity registry
    pub fn build_registry(&self) -> Result<EntityRegistry, ConfigError> {
        self.build_registry_with(Vec::new())
    }

    /// Build the registry from the declared types plus `extra` descriptors
    pub fn build_registry_with(
        &self,
        extra: Vec<EntityTypeDescriptor>,
    ) -> Result<EntityRegistry, ConfigError> {
        if self.server.default_limit == 0 || self.server.max_limit == 0 {
            return Err(ConfigError::Invalid {
                message: "server limits must be positive".to_string(),
            });
        }
        let descriptors = self
            .entities
            .iter()
            .map(EntityConfig::to_descriptor)
            .chain(extra)
            .collect();
        EntityRegistry::new(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::PropertyKind;
    use crate::core::validation::PropertyRule;

    const LIBRARY: &str = r#"
entities:
  - name: author
    properties:
      - { name: name, kind: string, rules: [required] }
    relationships:
      - { name: books, cardinality: to_many, target: book }
  - name: book
    properties:
      - { name: title, kind: string, rules: [required, { max_length: 200 }] }
      - { name: author_id, kind: integer }
    relationships:
      - { name: author, cardinality: to_one, target: author }
"#;

    #[test]
    fn test_defaults_when_server_section_missing() {
        let config = HaloConfig::from_yaml_str(LIBRARY).unwrap();
        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.server.paging(), Paging::default());
    }

    #[test]
    fn test_entities_become_descriptors() {
        let registry = HaloConfig::from_yaml_str(LIBRARY)
            .unwrap()
            .build_registry()
            .unwrap();

        let book = registry.resolve("books").unwrap();
        assert_eq!(book.properties[0].name, "id");
        let title = book.property("title").unwrap();
        assert_eq!(title.kind, PropertyKind::String);
        assert!(matches!(
            title.rules.as_slice(),
            [PropertyRule::Required, PropertyRule::MaxLength(200)]
        ));

        let author = book.relationship("author").unwrap();
        assert_eq!(author.foreign_key, "author_id");

        let books = registry.get("author").unwrap().relationship("books").unwrap().clone();
        assert_eq!(books.cardinality, Cardinality::ToMany);
        assert_eq!(books.foreign_key, "author_id");
    }

    #[test]
    fn test_explicit_plural_and_foreign_key() {
        let yaml = r#"
entities:
  - name: person
    plural: folks
    relationships:
      - { name: employer, cardinality: to_one, target: company, foreign_key: company_id }
  - name: company
    plural: companies
"#;
        let registry = HaloConfig::from_yaml_str(yaml).unwrap().build_registry().unwrap();
        let person = registry.resolve("folks").unwrap();
        assert_eq!(person.name, "person");
        assert_eq!(person.relationship("employer").unwrap().foreign_key, "company_id");
    }

    #[test]
    fn test_merge_rejects_duplicate_types() {
        let merged = HaloConfig::merge(vec![
            HaloConfig::from_yaml_str(LIBRARY).unwrap(),
            HaloConfig::from_yaml_str("entities:\n  - name: book\n").unwrap(),
        ]);
        assert_eq!(merged.entities.len(), 3);
        assert_eq!(
            merged.build_registry().unwrap_err(),
            ConfigError::DuplicateType {
                name: "book".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let yaml = r#"
entities:
  - name: book
    properties:
      - { name: title, kind: text }
"#;
        assert!(HaloConfig::from_yaml_str(yaml).is_err());
    }
}
