//! Entity type descriptors
//!
//! Every entity type the server exposes is described once, at startup, by an
//! [`EntityTypeDescriptor`]: its name, the plural used in URLs, its scalar
//! properties and its relationships. Descriptors are immutable once
//! registered and are the only source of type information the core consults.

use serde::{Deserialize, Serialize};

use crate::core::pluralize::Pluralizer;
use crate::core::validation::PropertyRule;

/// Name of the identifier property every entity type carries
pub const ID_PROPERTY: &str = "id";

/// Suffix marking a property as a foreign key
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// Scalar type tag of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    String,
    Integer,
    Float,
    Boolean,
    #[serde(rename = "datetime", alias = "date_time")]
    DateTime,
    Uuid,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Integer => "integer",
            PropertyKind::Float => "float",
            PropertyKind::Boolean => "boolean",
            PropertyKind::DateTime => "datetime",
            PropertyKind::Uuid => "uuid",
        }
    }
}

/// A declared scalar property
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,

    /// Rules the data-access layer checks on save
    #[serde(default)]
    pub rules: Vec<PropertyRule>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rules: Vec::new(),
        }
    }

    /// Add a validation rule
    pub fn with_rule(mut self, rule: PropertyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Whether this is the identifier property
    pub fn is_identifier(&self) -> bool {
        self.name == ID_PROPERTY
    }

    /// Whether the name has the foreign-key shape (`author_id`)
    pub fn is_foreign_key(&self) -> bool {
        self.name.ends_with(FOREIGN_KEY_SUFFIX)
    }

    /// Writable properties are everything but identifiers and foreign keys
    pub fn is_writable(&self) -> bool {
        !self.is_identifier() && !self.is_foreign_key()
    }
}

/// Cardinality of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// A declared relationship to another entity type
///
/// The target is held by name and resolved through the registry, which
/// guarantees at build time that every target exists. Holding names keeps
/// mutually referencing types (author ↔ book) free of reference cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    pub name: String,
    pub cardinality: Cardinality,

    /// Singular name of the target entity type
    pub target: String,

    /// Foreign key backing the relationship
    ///
    /// For to-one it lives on the owner, for to-many on the target.
    pub foreign_key: String,
}

impl RelationshipDescriptor {
    /// A to-one relationship; the owner holds `<name>_id`
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            foreign_key: format!("{}{}", name, FOREIGN_KEY_SUFFIX),
            name,
            cardinality: Cardinality::ToOne,
            target: target.into(),
        }
    }

    /// A to-many relationship; each target holds `<owner>_id`
    pub fn to_many(
        name: impl Into<String>,
        owner: &str,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::ToMany,
            target: target.into(),
            foreign_key: format!("{}{}", owner, FOREIGN_KEY_SUFFIX),
        }
    }

    /// Override the foreign key name
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }
}

/// Static description of one entity type
#[derive(Debug, Clone)]
pub struct EntityTypeDescriptor {
    /// Singular snake_case name (e.g. "book")
    pub name: String,

    /// Plural used as the URL segment (e.g. "books")
    pub plural_name: String,

    /// Declared properties, identifier first
    pub properties: Vec<PropertyDescriptor>,

    /// Declared relationships, in declaration order
    pub relationships: Vec<RelationshipDescriptor>,
}

impl EntityTypeDescriptor {
    /// Start a descriptor with only the identifier property
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            plural_name: Pluralizer::pluralize(&name),
            name,
            properties: vec![PropertyDescriptor::new(ID_PROPERTY, PropertyKind::Integer)],
            relationships: Vec::new(),
        }
    }

    /// Override the derived plural
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural_name = plural.into();
        self
    }

    /// Declare a property
    ///
    /// Redeclaring `id` replaces the implicit identifier property.
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        if property.is_identifier() {
            self.properties.retain(|p| !p.is_identifier());
            self.properties.insert(0, property);
        } else {
            self.properties.push(property);
        }
        self
    }

    /// Declare a to-one relationship with the default foreign key
    pub fn with_to_one(mut self, name: &str, target: &str) -> Self {
        self.relationships
            .push(RelationshipDescriptor::to_one(name, target));
        self
    }

    /// Declare a to-many relationship with the default foreign key
    pub fn with_to_many(mut self, name: &str, target: &str) -> Self {
        let relationship = RelationshipDescriptor::to_many(name, &self.name, target);
        self.relationships.push(relationship);
        self
    }

    /// Declare a fully specified relationship
    pub fn with_relationship(mut self, relationship: RelationshipDescriptor) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Look up a property by exact name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a relationship by exact name
    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|r| r.name == name)
    }
}
