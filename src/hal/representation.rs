//! The HAL document model

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Media type of every rendered representation
pub const HAL_CONTENT_TYPE: &str = "application/hal+json";

/// Relation name of a representation's own link
pub const SELF_REL: &str = "self";

/// A single hyperlink
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// One link, or the list of links sharing a relation name
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum LinkValue {
    One(Link),
    Many(Vec<Link>),
}

/// Hypermedia document for one resource or one collection
///
/// Built once per response and discarded after serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Representation {
    links: IndexMap<String, LinkValue>,
    embedded: IndexMap<String, Vec<Representation>>,
    properties: IndexMap<String, serde_json::Value>,
}

impl Representation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `self` link; it is always rendered first
    pub fn set_self_link(&mut self, href: impl Into<String>) {
        self.links.shift_insert(0, SELF_REL.to_string(), LinkValue::One(Link::new(href)));
    }

    pub fn self_link(&self) -> Option<&str> {
        match self.links.get(SELF_REL) {
            Some(LinkValue::One(link)) => Some(&link.href),
            _ => None,
        }
    }

    /// Set the single link for a relation
    pub fn set_link(&mut self, rel: impl Into<String>, href: impl Into<String>) {
        self.links.insert(rel.into(), LinkValue::One(Link::new(href)));
    }

    /// Append a link to a multi-valued relation
    pub fn push_link(&mut self, rel: &str, href: impl Into<String>) {
        let entry = self
            .links
            .entry(rel.to_string())
            .or_insert_with(|| LinkValue::Many(Vec::new()));
        match entry {
            LinkValue::Many(links) => links.push(Link::new(href)),
            LinkValue::One(existing) => {
                let first = existing.clone();
                *entry = LinkValue::Many(vec![first, Link::new(href)]);
            }
        }
    }

    /// Href of a single-valued relation
    pub fn link(&self, rel: &str) -> Option<&str> {
        match self.links.get(rel) {
            Some(LinkValue::One(link)) => Some(&link.href),
            _ => None,
        }
    }

    pub fn links(&self) -> &IndexMap<String, LinkValue> {
        &self.links
    }

    /// Make sure an embedded relation is rendered, even when empty
    pub fn ensure_embedded(&mut self, rel: &str) {
        self.embedded.entry(rel.to_string()).or_default();
    }

    pub fn embed(&mut self, rel: &str, representation: Representation) {
        self.embedded
            .entry(rel.to_string())
            .or_default()
            .push(representation);
    }

    pub fn embedded(&self, rel: &str) -> Option<&[Representation]> {
        self.embedded.get(rel).map(Vec::as_slice)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.properties.insert(name.into(), value);
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &IndexMap<String, serde_json::Value> {
        &self.properties
    }

    /// Render as a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Pair with a status code for an HTTP response
    pub fn with_status(self, status: StatusCode) -> HalResponse {
        HalResponse {
            status,
            representation: self,
        }
    }
}

impl Serialize for Representation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut len = self.properties.len();
        if !self.links.is_empty() {
            len += 1;
        }
        if !self.embedded.is_empty() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        if !self.links.is_empty() {
            map.serialize_entry("_links", &self.links)?;
        }
        if !self.embedded.is_empty() {
            map.serialize_entry("_embedded", &self.embedded)?;
        }
        for (name, value) in &self.properties {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A representation rendered as an `application/hal+json` response
#[derive(Debug)]
pub struct HalResponse {
    status: StatusCode,
    representation: Representation,
}

impl IntoResponse for Representation {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK).into_response()
    }
}

impl IntoResponse for HalResponse {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.representation) {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, HAL_CONTENT_TYPE)],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize representation");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_document_shape() {
        let mut representation = Representation::new();
        representation.set_property("title", json!("Dune"));
        representation.set_link("author", "authors/1");
        representation.set_self_link("books/1");

        assert_eq!(
            representation.to_json(),
            json!({
                "_links": {
                    "self": { "href": "books/1" },
                    "author": { "href": "authors/1" }
                },
                "title": "Dune"
            })
        );
        let keys: Vec<&String> = representation.links().keys().collect();
        assert_eq!(keys, vec!["self", "author"]);
    }

    #[test]
    fn test_push_link_builds_link_list() {
        let mut representation = Representation::new();
        representation.push_link("books", "books/1");
        representation.push_link("books", "books/2");
        assert_eq!(
            representation.to_json(),
            json!({ "_links": { "books": [{ "href": "books/1" }, { "href": "books/2" }] } })
        );
    }

    #[test]
    fn test_empty_embedded_relation_is_rendered() {
        let mut representation = Representation::new();
        representation.ensure_embedded("books");
        representation.set_property("size", json!(0));
        assert_eq!(
            representation.to_json(),
            json!({ "_embedded": { "books": [] }, "size": 0 })
        );
    }

    #[test]
    fn test_empty_representation_has_no_reserved_keys() {
        assert_eq!(Representation::new().to_json(), json!({}));
    }
}
