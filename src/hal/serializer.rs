//! Resource and collection serialization
//!
//! Links are relative hrefs built from plural type names and ids:
//!
//! - self: `<plural>/<id>`
//! - to-many relationship: `<self>/<relationship>`
//! - to-one relationship, unset: `<self>/<relationship>` (POST there to create it)
//! - to-one relationship, set: `<target plural>/<target id>`

use serde_json::json;

use crate::core::entity::{Cardinality, EntityTypeDescriptor};
use crate::core::error::{HaloError, NotFoundError};
use crate::core::query::Query;
use crate::core::registry::EntityRegistry;
use crate::core::resource::Resource;
use crate::hal::representation::Representation;

/// Renders resources against the registry's type descriptors
pub struct HalSerializer<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> HalSerializer<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }

    fn descriptor(&self, name: &str) -> Result<std::sync::Arc<EntityTypeDescriptor>, HaloError> {
        self.registry.get(name).ok_or_else(|| {
            NotFoundError::UnknownType {
                segment: name.to_string(),
            }
            .into()
        })
    }

    /// Self href of a persisted resource
    pub fn self_href(&self, resource: &Resource) -> Result<String, HaloError> {
        let descriptor = self.descriptor(resource.entity_type())?;
        let id = resource.id().ok_or_else(|| {
            HaloError::Internal(format!(
                "cannot link an unsaved {}",
                resource.entity_type()
            ))
        })?;
        Ok(format!("{}/{}", descriptor.plural_name, id))
    }

    /// Render one persisted resource
    pub fn resource(&self, resource: &Resource) -> Result<Representation, HaloError> {
        let descriptor = self.descriptor(resource.entity_type())?;
        let self_href = self.self_href(resource)?;

        let mut representation = Representation::new();
        representation.set_self_link(self_href.clone());

        for relationship in &descriptor.relationships {
            let nested = format!("{}/{}", self_href, relationship.name);
            let href = match relationship.cardinality {
                Cardinality::ToMany => nested,
                Cardinality::ToOne => match resource.foreign_key(&relationship.foreign_key) {
                    Some(target_id) => {
                        let target = self.descriptor(&relationship.target)?;
                        format!("{}/{}", target.plural_name, target_id)
                    }
                    None => nested,
                },
            };
            representation.set_link(relationship.name.clone(), href);
        }

        for property in descriptor.properties.iter().filter(|p| p.is_writable()) {
            if let Some(value) = resource.attributes().get(&property.name) {
                representation.set_property(property.name.clone(), value.to_json());
            }
        }

        Ok(representation)
    }

    /// Render a query result
    ///
    /// Items are linked and embedded under the element type's plural name in
    /// the order given; `offset` and `limit` are echoed from the query.
    pub fn collection(
        &self,
        element_type: &EntityTypeDescriptor,
        resources: &[Resource],
        query: &Query,
        self_href: Option<&str>,
    ) -> Result<Representation, HaloError> {
        let rel = element_type.plural_name.as_str();

        let mut representation = Representation::new();
        if let Some(href) = self_href {
            representation.set_self_link(href);
        }
        representation.ensure_embedded(rel);

        for resource in resources {
            let item = self.resource(resource)?;
            if let Some(href) = item.self_link() {
                representation.push_link(rel, href);
            }
            representation.embed(rel, item);
        }

        representation.set_property("offset", json!(query.offset));
        representation.set_property("limit", json!(query.limit));
        representation.set_property("size", json!(resources.len()));
        Ok(representation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{PropertyDescriptor, PropertyKind};
    use crate::core::field::FieldValue;
    use crate::core::resource::Attributes;
    use serde_json::json;

    fn registry() -> EntityRegistry {
        EntityRegistry::new(vec![
            EntityTypeDescriptor::new("author")
                .with_property(PropertyDescriptor::new("name", PropertyKind::String))
                .with_to_many("books", "book"),
            EntityTypeDescriptor::new("book")
                .with_property(PropertyDescriptor::new("title", PropertyKind::String))
                .with_property(PropertyDescriptor::new("author_id", PropertyKind::Integer))
                .with_to_one("author", "author"),
            EntityTypeDescriptor::new("tag")
                .with_property(PropertyDescriptor::new("label", PropertyKind::String)),
        ])
        .unwrap()
    }

    fn attributes(pairs: &[(&str, FieldValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resource_without_relationships_has_only_self_link() {
        let registry = registry();
        let tag = Resource::persisted("tag", 1, attributes(&[("label", "scifi".into())]));

        let json = HalSerializer::new(&registry).resource(&tag).unwrap().to_json();
        assert_eq!(
            json,
            json!({ "_links": { "self": { "href": "tags/1" } }, "label": "scifi" })
        );
    }

    #[test]
    fn test_to_many_link_points_at_sub_path() {
        let registry = registry();
        let author = Resource::persisted(
            "author",
            1,
            attributes(&[("name", "Frank Herbert".into())]),
        );

        let representation = HalSerializer::new(&registry).resource(&author).unwrap();
        assert_eq!(representation.link("books"), Some("authors/1/books"));
    }

    #[test]
    fn test_to_one_link_follows_association() {
        let registry = registry();
        let serializer = HalSerializer::new(&registry);
        let mut book = Resource::persisted("book", 1, attributes(&[("title", "Dune".into())]));

        let unset = serializer.resource(&book).unwrap();
        assert_eq!(unset.link("author"), Some("books/1/author"));

        book.set("author_id", FieldValue::Integer(4));
        let set = serializer.resource(&book).unwrap();
        assert_eq!(set.link("author"), Some("authors/4"));
    }

    #[test]
    fn test_foreign_keys_are_not_properties() {
        let registry = registry();
        let book = Resource::persisted(
            "book",
            2,
            attributes(&[("title", "Dune".into()), ("author_id", FieldValue::Integer(4))]),
        );

        let representation = HalSerializer::new(&registry).resource(&book).unwrap();
        assert_eq!(representation.property("title"), Some(&json!("Dune")));
        assert!(representation.property("author_id").is_none());
        assert!(representation.property("id").is_none());
    }

    #[test]
    fn test_unsaved_resource_cannot_be_rendered() {
        let registry = registry();
        let book = Resource::new("book", Attributes::new());
        assert!(matches!(
            HalSerializer::new(&registry).resource(&book),
            Err(HaloError::Internal(_))
        ));
    }

    #[test]
    fn test_empty_collection_echoes_query() {
        let registry = registry();
        let book = registry.get("book").unwrap();
        let query = Query::first_page("book");

        let json = HalSerializer::new(&registry)
            .collection(&book, &[], &query, None)
            .unwrap()
            .to_json();
        assert_eq!(
            json,
            json!({ "offset": 0, "limit": 30, "size": 0, "_embedded": { "books": [] } })
        );
    }

    #[test]
    fn test_collection_links_and_embeds_in_order() {
        let registry = registry();
        let book = registry.get("book").unwrap();
        let query = Query {
            offset: 10,
            limit: 2,
            ..Query::first_page("book")
        };
        let books = vec![
            Resource::persisted("book", 7, attributes(&[("title", "Dune".into())])),
            Resource::persisted("book", 3, attributes(&[("title", "Children of Dune".into())])),
        ];

        let representation = HalSerializer::new(&registry)
            .collection(&book, &books, &query, Some("books?offset=10&limit=2"))
            .unwrap();
        let json = representation.to_json();

        assert_eq!(json["_links"]["self"]["href"], "books?offset=10&limit=2");
        assert_eq!(
            json["_links"]["books"],
            json!([{ "href": "books/7" }, { "href": "books/3" }])
        );
        assert_eq!(json["_embedded"]["books"][0]["title"], "Dune");
        assert_eq!(json["_embedded"]["books"][1]["_links"]["self"]["href"], "books/3");
        assert_eq!(json["offset"], 10);
        assert_eq!(json["limit"], 2);
        assert_eq!(json["size"], 2);
    }
}
