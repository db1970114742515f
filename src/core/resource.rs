//! Resource instances

use indexmap::IndexMap;

use crate::core::entity::ID_PROPERTY;
use crate::core::field::FieldValue;

/// Attribute name to value mapping, in insertion order
pub type Attributes = IndexMap<String, FieldValue>;

/// Primary key assigned by the data-access layer
pub type ResourceId = i64;

/// A to-one association waiting for its target to be persisted
///
/// Assigning an unsaved resource to a to-one relationship cannot write the
/// owner's foreign key yet; the data-access layer records it here and applies
/// it once the target has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAssociation {
    pub owner_type: String,
    pub owner_id: ResourceId,
    pub foreign_key: String,
}

/// An instance of an entity type
///
/// Owned by the data-access layer; the core reads and mutates copies for the
/// duration of one request and never caches them.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    entity_type: String,
    id: Option<ResourceId>,
    attributes: Attributes,
    errors: Vec<String>,
    pending: Vec<PendingAssociation>,
}

impl Resource {
    /// Construct an unsaved resource
    pub fn new(entity_type: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: None,
            attributes,
            errors: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Construct a resource that already has an identity
    pub fn persisted(
        entity_type: impl Into<String>,
        id: ResourceId,
        attributes: Attributes,
    ) -> Self {
        let mut resource = Self::new(entity_type, attributes);
        resource.id = Some(id);
        resource
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Primary key, `None` until saved
    pub fn id(&self) -> Option<ResourceId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Assign the primary key; only the data-access layer calls this
    pub fn set_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    /// Read a value by property name; `id` reads the primary key
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        if name == ID_PROPERTY {
            return Some(self.id.map(FieldValue::Integer).unwrap_or(FieldValue::Null));
        }
        self.attributes.get(name).cloned()
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Overwrite the given attributes, keeping the others
    pub fn apply(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn replace_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// Integer value of a foreign key attribute, if set
    pub fn foreign_key(&self, name: &str) -> Option<ResourceId> {
        self.attributes.get(name).and_then(FieldValue::as_integer)
    }

    /// Messages from the last failed save
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }

    pub fn pending_associations(&self) -> &[PendingAssociation] {
        &self.pending
    }

    pub fn add_pending_association(&mut self, pending: PendingAssociation) {
        self.pending.push(pending);
    }

    pub fn take_pending_associations(&mut self) -> Vec<PendingAssociation> {
        std::mem::take(&mut self.pending)
    }
}
