//! Request handling for entity types and their relationships
//!
//! Each request runs exactly one [`Operation`] against a [`RequestContext`]
//! and ends in a representation or an error. The controller owns no mutable
//! state; it resolves types through the registry, talks to the data-access
//! layer and hands results to the serializer.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::attributes::extract_attributes;
use crate::core::entity::EntityTypeDescriptor;
use crate::core::error::{DeleteError, HaloError, NotFoundError, ValidationError};
use crate::core::query::{QueryBuilder, QueryParams};
use crate::core::registry::EntityRegistry;
use crate::core::relationship::RelationshipHandle;
use crate::core::resource::{Resource, ResourceId};
use crate::core::store::DataStore;
use crate::hal::{HalSerializer, Representation};

/// The operation a request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListCollection,
    CreateInCollection,
    ReadItem,
    UpdateItem,
    DeleteItem,
    ListRelationship,
    CreateInRelationship,
    ReadRelationshipItem,
}

/// Everything the dispatcher extracted from one request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Type segment as it appeared in the path (e.g. `books`)
    pub type_segment: String,
    pub id: Option<String>,
    pub relationship: Option<String>,
    pub relationship_id: Option<String>,
    pub params: QueryParams,
    pub body: Map<String, Value>,
    /// Request path and query, without the leading slash, used as a collection self link
    pub path: Option<String>,
}

impl RequestContext {
    pub fn new(type_segment: impl Into<String>) -> Self {
        Self {
            type_segment: type_segment.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn with_relationship_id(mut self, relationship_id: impl Into<String>) -> Self {
        self.relationship_id = Some(relationship_id.into());
        self
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn require<'c>(value: &'c Option<String>, name: &str) -> Result<&'c str, HaloError> {
        value.as_deref().ok_or_else(|| {
            HaloError::Internal(format!("request context is missing '{}'", name))
        })
    }
}

/// Result of a successful operation
#[derive(Debug)]
pub enum Outcome {
    Ok(Representation),
    Created(Representation),
    Deleted,
}

impl Outcome {
    pub fn representation(&self) -> Option<&Representation> {
        match self {
            Outcome::Ok(r) | Outcome::Created(r) => Some(r),
            Outcome::Deleted => None,
        }
    }
}

/// Runs operations against the registry and a data-access layer
#[derive(Clone)]
pub struct ResourceController {
    registry: Arc<EntityRegistry>,
    store: Arc<dyn DataStore>,
}

impl ResourceController {
    pub fn new(registry: Arc<EntityRegistry>, store: Arc<dyn DataStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Run `operation` to completion
    pub async fn dispatch(
        &self,
        operation: Operation,
        ctx: &RequestContext,
    ) -> Result<Outcome, HaloError> {
        match operation {
            Operation::ListCollection => self.list_collection(ctx).await.map(Outcome::Ok),
            Operation::CreateInCollection => {
                self.create_in_collection(ctx).await.map(Outcome::Created)
            }
            Operation::ReadItem => self.read_item(ctx).await.map(Outcome::Ok),
            Operation::UpdateItem => self.update_item(ctx).await.map(Outcome::Ok),
            Operation::DeleteItem => self.delete_item(ctx).await.map(|_| Outcome::Deleted),
            Operation::ListRelationship => self.list_relationship(ctx).await.map(Outcome::Ok),
            Operation::CreateInRelationship => {
                self.create_in_relationship(ctx).await.map(Outcome::Created)
            }
            Operation::ReadRelationshipItem => {
                self.read_relationship_item(ctx).await.map(Outcome::Ok)
            }
        }
    }

    fn serializer(&self) -> HalSerializer<'_> {
        HalSerializer::new(&self.registry)
    }

    pub async fn list_collection(&self, ctx: &RequestContext) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let query = QueryBuilder::from_params(&descriptor, &ctx.params)?;
        debug!(
            entity_type = %descriptor.name,
            offset = query.offset,
            limit = query.limit,
            "listing collection"
        );

        let resources = self.store.find_all(&descriptor, &query).await?;
        self.serializer()
            .collection(&descriptor, &resources, &query, ctx.path.as_deref())
    }

    pub async fn create_in_collection(
        &self,
        ctx: &RequestContext,
    ) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        debug!(entity_type = %descriptor.name, "creating resource");

        let attributes = extract_attributes(&descriptor, &ctx.body);
        let mut resource = self.store.create(&descriptor, attributes);
        self.save(&mut resource).await?;
        self.serializer().resource(&resource)
    }

    pub async fn read_item(&self, ctx: &RequestContext) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        debug!(entity_type = %descriptor.name, id, "reading resource");

        let resource = self.load(&descriptor, id).await?;
        self.serializer().resource(&resource)
    }

    pub async fn update_item(&self, ctx: &RequestContext) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        debug!(entity_type = %descriptor.name, id, "updating resource");

        let mut resource = self.load(&descriptor, id).await?;
        resource.apply(extract_attributes(&descriptor, &ctx.body));
        self.save(&mut resource).await?;
        self.serializer().resource(&resource)
    }

    pub async fn delete_item(&self, ctx: &RequestContext) -> Result<(), HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        debug!(entity_type = %descriptor.name, id, "deleting resource");

        let resource = self.load(&descriptor, id).await?;
        if self.store.destroy(&resource).await? {
            Ok(())
        } else {
            warn!(entity_type = %descriptor.name, id, "data-access layer refused delete");
            Err(DeleteError {
                entity_type: descriptor.name.clone(),
                id: id.to_string(),
            }
            .into())
        }
    }

    /// List a relationship
    ///
    /// A to-many relationship is queried with the request's paging and order
    /// resolved against the target type. A to-one relationship ignores the
    /// query and renders its single associated resource.
    pub async fn list_relationship(
        &self,
        ctx: &RequestContext,
    ) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        let name = RequestContext::require(&ctx.relationship, "relationship")?;
        debug!(entity_type = %descriptor.name, id, relationship = name, "listing relationship");

        let mut owner = self.load(&descriptor, id).await?;
        match RelationshipHandle::resolve(&self.registry, self.store.as_ref(), &mut owner, name)? {
            RelationshipHandle::ToMany(handle) => {
                let query = QueryBuilder::from_params(handle.target_type(), &ctx.params)?;
                let related = handle.get(&query).await?;
                self.serializer()
                    .collection(handle.target_type(), &related, &query, ctx.path.as_deref())
            }
            RelationshipHandle::ToOne(handle) => match handle.get().await? {
                Some(related) => self.serializer().resource(&related),
                None => Err(NotFoundError::UnknownResource {
                    entity_type: handle.target_type().name.clone(),
                    id: format!("{}/{}/{}", descriptor.plural_name, id, name),
                }
                .into()),
            },
        }
    }

    /// Create a resource of the relationship's target type and associate it
    ///
    /// The association is made on the unsaved target, then the target is
    /// saved; stores persist the association together with the target.
    pub async fn create_in_relationship(
        &self,
        ctx: &RequestContext,
    ) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        let name = RequestContext::require(&ctx.relationship, "relationship")?;
        debug!(entity_type = %descriptor.name, id, relationship = name, "creating in relationship");

        let mut owner = self.load(&descriptor, id).await?;
        let mut handle =
            RelationshipHandle::resolve(&self.registry, self.store.as_ref(), &mut owner, name)?;

        let target_type = Arc::clone(handle.target_type());
        let attributes = extract_attributes(&target_type, &ctx.body);
        let mut target = self.store.create(&target_type, attributes);

        match &mut handle {
            RelationshipHandle::ToMany(h) => h.append(&mut target).await?,
            RelationshipHandle::ToOne(h) => h.set(&mut target).await?,
        }
        drop(handle);

        self.save(&mut target).await?;
        self.serializer().resource(&target)
    }

    /// Read one associated resource by its id
    pub async fn read_relationship_item(
        &self,
        ctx: &RequestContext,
    ) -> Result<Representation, HaloError> {
        let descriptor = self.registry.resolve(&ctx.type_segment)?;
        let id = RequestContext::require(&ctx.id, "id")?;
        let name = RequestContext::require(&ctx.relationship, "relationship")?;
        let related_id = RequestContext::require(&ctx.relationship_id, "relationship_id")?;
        debug!(
            entity_type = %descriptor.name,
            id,
            relationship = name,
            related_id,
            "reading relationship item"
        );

        let mut owner = self.load(&descriptor, id).await?;
        let handle =
            RelationshipHandle::resolve(&self.registry, self.store.as_ref(), &mut owner, name)?;
        let target_type = Arc::clone(handle.target_type());
        let missing = || -> HaloError {
            NotFoundError::UnknownResource {
                entity_type: target_type.name.clone(),
                id: related_id.to_string(),
            }
            .into()
        };
        let Some(wanted) = parse_id(related_id) else {
            return Err(missing());
        };

        let related = match handle {
            RelationshipHandle::ToMany(h) => h.find(wanted).await?,
            RelationshipHandle::ToOne(h) => h.get().await?.filter(|r| r.id() == Some(wanted)),
        };
        let related = related.ok_or_else(missing)?;
        self.serializer().resource(&related)
    }

    async fn load(
        &self,
        descriptor: &EntityTypeDescriptor,
        raw_id: &str,
    ) -> Result<Resource, HaloError> {
        let missing = || NotFoundError::UnknownResource {
            entity_type: descriptor.name.clone(),
            id: raw_id.to_string(),
        };
        let id = parse_id(raw_id).ok_or_else(missing)?;
        let resource = self.store.get(descriptor, id).await?.ok_or_else(missing)?;
        Ok(resource)
    }

    async fn save(&self, resource: &mut Resource) -> Result<(), HaloError> {
        if self.store.save(resource).await? {
            return Ok(());
        }
        let messages = self.store.errors(resource);
        warn!(
            entity_type = resource.entity_type(),
            errors = messages.len(),
            "save rejected by data-access layer"
        );
        Err(ValidationError {
            entity_type: resource.entity_type().to_string(),
            messages,
        }
        .into())
    }
}

fn parse_id(raw: &str) -> Option<ResourceId> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{PropertyDescriptor, PropertyKind};
    use crate::core::validation::PropertyRule;
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn registry() -> Arc<EntityRegistry> {
        Arc::new(
            EntityRegistry::new(vec![
                EntityTypeDescriptor::new("author")
                    .with_property(
                        PropertyDescriptor::new("name", PropertyKind::String)
                            .with_rule(PropertyRule::Required),
                    )
                    .with_to_many("books", "book"),
                EntityTypeDescriptor::new("book")
                    .with_property(
                        PropertyDescriptor::new("title", PropertyKind::String)
                            .with_rule(PropertyRule::Required),
                    )
                    .with_property(PropertyDescriptor::new("author_id", PropertyKind::Integer))
                    .with_to_one("author", "author"),
                EntityTypeDescriptor::new("event")
                    .with_property(PropertyDescriptor::new("title", PropertyKind::String))
                    .with_property(PropertyDescriptor::new("seats", PropertyKind::Integer))
                    .with_property(PropertyDescriptor::new("price", PropertyKind::Float))
                    .with_property(PropertyDescriptor::new("public", PropertyKind::Boolean))
                    .with_property(PropertyDescriptor::new("starts_at", PropertyKind::DateTime))
                    .with_property(PropertyDescriptor::new("ticket", PropertyKind::Uuid)),
            ])
            .unwrap(),
        )
    }

    fn controller() -> ResourceController {
        let registry = registry();
        let store = InMemoryStore::new(Arc::clone(&registry));
        ResourceController::new(registry, Arc::new(store))
    }

    /// Store whose every call fails, as an unreachable database would
    struct FailingStore;

    #[async_trait::async_trait]
    impl DataStore for FailingStore {
        async fn find_all(
            &self,
            _entity_type: &EntityTypeDescriptor,
            _query: &crate::core::query::Query,
        ) -> anyhow::Result<Vec<Resource>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn get(
            &self,
            _entity_type: &EntityTypeDescriptor,
            _id: ResourceId,
        ) -> anyhow::Result<Option<Resource>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn save(&self, _resource: &mut Resource) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn destroy(&self, _resource: &Resource) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn find_related(
            &self,
            _owner: &Resource,
            _relationship: &crate::core::entity::RelationshipDescriptor,
            _target_type: &EntityTypeDescriptor,
            _query: &crate::core::query::Query,
        ) -> anyhow::Result<Vec<Resource>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn get_related(
            &self,
            _owner: &Resource,
            _relationship: &crate::core::entity::RelationshipDescriptor,
            _target_type: &EntityTypeDescriptor,
        ) -> anyhow::Result<Option<Resource>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn append(
            &self,
            _owner: &Resource,
            _relationship: &crate::core::entity::RelationshipDescriptor,
            _target: &mut Resource,
        ) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn assign(
            &self,
            _owner: &mut Resource,
            _relationship: &crate::core::entity::RelationshipDescriptor,
            _target: &mut Resource,
        ) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("body must be an object"),
        }
    }

    #[tokio::test]
    async fn test_create_renders_self_link_without_id() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));

        let representation = controller.create_in_collection(&ctx).await.unwrap();
        assert_eq!(
            representation.to_json(),
            json!({
                "_links": { "self": { "href": "books/1" }, "author": { "href": "books/1/author" } },
                "title": "Dune"
            })
        );
    }

    #[tokio::test]
    async fn test_create_drops_protected_attributes() {
        let controller = controller();
        let ctx = RequestContext::new("books")
            .with_body(body(json!({ "title": "Dune", "id": 99, "author_id": 5, "isbn": "x" })));

        let representation = controller.create_in_collection(&ctx).await.unwrap();
        assert_eq!(representation.self_link(), Some("books/1"));
        assert_eq!(representation.link("author"), Some("books/1/author"));
        assert!(representation.property("isbn").is_none());
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(Map::new());

        match controller.create_in_collection(&ctx).await.unwrap_err() {
            HaloError::Validation(e) => {
                assert_eq!(e.messages, vec!["title is required".to_string()])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_unknown_type_and_id() {
        let controller = controller();
        let err = controller
            .read_item(&RequestContext::new("widgets").with_id("1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = controller
            .read_item(&RequestContext::new("books").with_id("1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = controller
            .read_item(&RequestContext::new("books").with_id("abc"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_created_properties_match_input_for_every_kind() {
        let controller = controller();
        let input = json!({
            "title": "Launch",
            "seats": 120,
            "price": 10,
            "public": true,
            "starts_at": "2024-01-01T00:00:00Z",
            "ticket": "67e55044-10b1-426f-9247-bb680e5fe0c8"
        });
        let ctx = RequestContext::new("events").with_body(body(input.clone()));

        let representation = controller.create_in_collection(&ctx).await.unwrap();
        let mut expected = input;
        expected["_links"] = json!({ "self": { "href": "events/1" } });
        assert_eq!(representation.to_json(), expected);

        let read = controller
            .read_item(&RequestContext::new("events").with_id("1"))
            .await
            .unwrap();
        assert_eq!(read.property("starts_at"), Some(&json!("2024-01-01T00:00:00Z")));
        assert_eq!(read.property("price"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let controller = controller();

        let ctx = RequestContext::new("books")
            .with_id("7")
            .with_body(body(json!({ "title": "Dune" })));
        match controller.update_item(&ctx).await.unwrap_err() {
            HaloError::NotFound(NotFoundError::UnknownResource { entity_type, id }) => {
                assert_eq!(entity_type, "book");
                assert_eq!(id, "7");
            }
            other => panic!("expected not found, got {:?}", other),
        }

        let err = controller
            .delete_item(&RequestContext::new("books").with_id("7"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let registry = registry();
        let controller = ResourceController::new(registry, Arc::new(FailingStore));

        let err = controller
            .list_collection(&RequestContext::new("books"))
            .await
            .unwrap_err();
        assert!(matches!(err, HaloError::Storage(ref e) if e.to_string() == "connection refused"));

        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        let err = controller.create_in_collection(&ctx).await.unwrap_err();
        assert!(matches!(err, HaloError::Storage(_)));

        let err = controller
            .read_item(&RequestContext::new("books").with_id("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, HaloError::Storage(_)));
    }

    #[tokio::test]
    async fn test_update_applies_attributes() {
        let controller = controller();
        let created = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        controller.create_in_collection(&created).await.unwrap();

        let ctx = RequestContext::new("books")
            .with_id("1")
            .with_body(body(json!({ "title": "Dune Messiah" })));
        let representation = controller.update_item(&ctx).await.unwrap();
        assert_eq!(representation.property("title"), Some(&json!("Dune Messiah")));
    }

    #[tokio::test]
    async fn test_list_collection_orders_and_pages() {
        let controller = controller();
        for title in ["b", "c", "a"] {
            let ctx = RequestContext::new("books").with_body(body(json!({ "title": title })));
            controller.create_in_collection(&ctx).await.unwrap();
        }

        let params = QueryParams {
            offset: 1,
            limit: 2,
            order: vec!["title desc".to_string()],
        };
        let json = controller
            .list_collection(&RequestContext::new("books").with_params(params))
            .await
            .unwrap()
            .to_json();
        assert_eq!(json["size"], 2);
        assert_eq!(json["offset"], 1);
        assert_eq!(json["_embedded"]["books"][0]["title"], "b");
        assert_eq!(json["_embedded"]["books"][1]["title"], "a");
    }

    #[tokio::test]
    async fn test_list_collection_rejects_unknown_order() {
        let controller = controller();
        let params = QueryParams {
            order: vec!["nonexistent".to_string()],
            ..QueryParams::default()
        };
        let err = controller
            .list_collection(&RequestContext::new("books").with_params(params))
            .await
            .unwrap_err();
        match err {
            HaloError::Order(e) => assert_eq!(e.token, "nonexistent"),
            other => panic!("expected order error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_to_many_relationship() {
        let controller = controller();
        let ctx =
            RequestContext::new("authors").with_body(body(json!({ "name": "Frank Herbert" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let json = controller
            .list_relationship(
                &RequestContext::new("authors")
                    .with_id("1")
                    .with_relationship("books"),
            )
            .await
            .unwrap()
            .to_json();
        assert_eq!(
            json,
            json!({ "offset": 0, "limit": 30, "size": 0, "_embedded": { "books": [] } })
        );
    }

    #[tokio::test]
    async fn test_create_in_to_many_relationship() {
        let controller = controller();
        let ctx =
            RequestContext::new("authors").with_body(body(json!({ "name": "Frank Herbert" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let ctx = RequestContext::new("authors")
            .with_id("1")
            .with_relationship("books")
            .with_body(body(json!({ "title": "Dune" })));
        let book = controller.create_in_relationship(&ctx).await.unwrap();
        assert_eq!(book.self_link(), Some("books/1"));
        assert_eq!(book.link("author"), Some("authors/1"));

        let json = controller
            .list_relationship(
                &RequestContext::new("authors")
                    .with_id("1")
                    .with_relationship("books"),
            )
            .await
            .unwrap()
            .to_json();
        assert_eq!(json["size"], 1);
        assert_eq!(json["_embedded"]["books"][0]["title"], "Dune");
    }

    #[tokio::test]
    async fn test_create_in_to_one_relationship_links_owner() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let read = RequestContext::new("books").with_id("1");
        let before = controller.read_item(&read).await.unwrap();
        assert_eq!(before.link("author"), Some("books/1/author"));

        let ctx = RequestContext::new("books")
            .with_id("1")
            .with_relationship("author")
            .with_body(body(json!({ "name": "Frank Herbert" })));
        let author = controller.create_in_relationship(&ctx).await.unwrap();
        assert_eq!(author.self_link(), Some("authors/1"));

        let after = controller.read_item(&read).await.unwrap();
        assert_eq!(after.link("author"), Some("authors/1"));

        let related = controller
            .list_relationship(
                &RequestContext::new("books")
                    .with_id("1")
                    .with_relationship("author"),
            )
            .await
            .unwrap();
        assert_eq!(related.property("name"), Some(&json!("Frank Herbert")));
    }

    #[tokio::test]
    async fn test_failed_create_in_relationship_leaves_no_association() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let ctx = RequestContext::new("books")
            .with_id("1")
            .with_relationship("author")
            .with_body(Map::new());
        let err = controller.create_in_relationship(&ctx).await.unwrap_err();
        assert!(matches!(err, HaloError::Validation(_)));

        let book = controller
            .read_item(&RequestContext::new("books").with_id("1"))
            .await
            .unwrap();
        assert_eq!(book.link("author"), Some("books/1/author"));
    }

    #[tokio::test]
    async fn test_unknown_relationship() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let err = controller
            .list_relationship(
                &RequestContext::new("books")
                    .with_id("1")
                    .with_relationship("publisher"),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HaloError::NotFound(NotFoundError::UnknownRelationship { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_relationship_item() {
        let controller = controller();
        let ctx =
            RequestContext::new("authors").with_body(body(json!({ "name": "Frank Herbert" })));
        controller.create_in_collection(&ctx).await.unwrap();
        let ctx = RequestContext::new("authors")
            .with_id("1")
            .with_relationship("books")
            .with_body(body(json!({ "title": "Dune" })));
        controller.create_in_relationship(&ctx).await.unwrap();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Unrelated" })));
        controller.create_in_collection(&ctx).await.unwrap();

        let base = RequestContext::new("authors").with_id("1").with_relationship("books");
        let book = controller
            .read_relationship_item(&base.clone().with_relationship_id("1"))
            .await
            .unwrap();
        assert_eq!(book.property("title"), Some(&json!("Dune")));

        let err = controller
            .read_relationship_item(&base.with_relationship_id("2"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_referenced_resource_fails() {
        let controller = controller();
        let ctx =
            RequestContext::new("authors").with_body(body(json!({ "name": "Frank Herbert" })));
        controller.create_in_collection(&ctx).await.unwrap();
        let ctx = RequestContext::new("authors")
            .with_id("1")
            .with_relationship("books")
            .with_body(body(json!({ "title": "Dune" })));
        controller.create_in_relationship(&ctx).await.unwrap();

        let err = controller
            .delete_item(&RequestContext::new("authors").with_id("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, HaloError::Delete(_)));

        controller
            .delete_item(&RequestContext::new("books").with_id("1"))
            .await
            .unwrap();
        controller
            .delete_item(&RequestContext::new("authors").with_id("1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_maps_outcomes() {
        let controller = controller();
        let ctx = RequestContext::new("books").with_body(body(json!({ "title": "Dune" })));
        assert!(matches!(
            controller.dispatch(Operation::CreateInCollection, &ctx).await.unwrap(),
            Outcome::Created(_)
        ));

        let ctx = RequestContext::new("books").with_id("1");
        assert!(matches!(
            controller.dispatch(Operation::DeleteItem, &ctx).await.unwrap(),
            Outcome::Deleted
        ));
    }
}
