//! HTTP handlers for entity resources
//!
//! Every handler does the same three things: coerce the request into a
//! [`RequestContext`], run one [`Operation`] on the controller and render the
//! outcome. None of them knows anything about a particular entity type.

use axum::{
    body::Bytes,
    extract::{
        FromRequestParts, OriginalUri, Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::controller::{Operation, Outcome, RequestContext, ResourceController};
use crate::core::error::{HaloError, RequestError};
use crate::core::query::{Paging, QueryParams};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: ResourceController,
    pub paging: Paging,
}

impl From<PathRejection> for HaloError {
    fn from(rejection: PathRejection) -> Self {
        RequestError::MalformedUri {
            message: rejection.body_text(),
        }
        .into()
    }
}

impl From<QueryRejection> for HaloError {
    fn from(rejection: QueryRejection) -> Self {
        RequestError::MalformedUri {
            message: rejection.body_text(),
        }
        .into()
    }
}

/// Path segments; rejections render as JSON errors
pub struct ResourcePath<T>(pub T);

impl<T, S> FromRequestParts<S> for ResourcePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HaloError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Raw query pairs, in request order; rejections render as JSON errors
pub struct QueryPairs(pub Vec<(String, String)>);

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = HaloError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) =
            Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(Self(pairs))
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Ok(representation) => representation.into_response(),
            Outcome::Created(representation) => {
                representation.with_status(StatusCode::CREATED).into_response()
            }
            Outcome::Deleted => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Parse a request body into a parameter mapping; empty means no parameters
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RequestError::InvalidBody {
            message: format!("got {}", json_kind(&other)),
        }),
        Err(e) => Err(RequestError::InvalidBody {
            message: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Path and query of the request, relative like every other href
fn path_hint(uri: &OriginalUri) -> Option<String> {
    uri.0
        .path_and_query()
        .map(|pq| pq.as_str().trim_start_matches('/').to_string())
}

async fn run(
    state: &AppState,
    operation: Operation,
    ctx: RequestContext,
) -> Result<Response, HaloError> {
    let outcome = state.controller.dispatch(operation, &ctx).await?;
    Ok(outcome.into_response())
}

/// GET /{entity_type}
pub async fn list_collection(
    State(state): State<AppState>,
    ResourcePath(entity_type): ResourcePath<String>,
    QueryPairs(pairs): QueryPairs,
    uri: OriginalUri,
) -> Result<Response, HaloError> {
    let mut ctx = RequestContext::new(entity_type)
        .with_params(QueryParams::from_pairs(&pairs, state.paging)?);
    ctx.path = path_hint(&uri);
    run(&state, Operation::ListCollection, ctx).await
}

/// POST /{entity_type}
pub async fn create_in_collection(
    State(state): State<AppState>,
    ResourcePath(entity_type): ResourcePath<String>,
    body: Bytes,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type).with_body(parse_body(&body)?);
    run(&state, Operation::CreateInCollection, ctx).await
}

/// GET /{entity_type}/{id}
pub async fn read_item(
    State(state): State<AppState>,
    ResourcePath((entity_type, id)): ResourcePath<(String, String)>,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type).with_id(id);
    run(&state, Operation::ReadItem, ctx).await
}

/// PUT|PATCH /{entity_type}/{id}
pub async fn update_item(
    State(state): State<AppState>,
    ResourcePath((entity_type, id)): ResourcePath<(String, String)>,
    body: Bytes,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type)
        .with_id(id)
        .with_body(parse_body(&body)?);
    run(&state, Operation::UpdateItem, ctx).await
}

/// DELETE /{entity_type}/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    ResourcePath((entity_type, id)): ResourcePath<(String, String)>,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type).with_id(id);
    run(&state, Operation::DeleteItem, ctx).await
}

/// GET /{entity_type}/{id}/{relationship}
pub async fn list_relationship(
    State(state): State<AppState>,
    ResourcePath((entity_type, id, relationship)): ResourcePath<(String, String, String)>,
    QueryPairs(pairs): QueryPairs,
    uri: OriginalUri,
) -> Result<Response, HaloError> {
    let mut ctx = RequestContext::new(entity_type)
        .with_id(id)
        .with_relationship(relationship)
        .with_params(QueryParams::from_pairs(&pairs, state.paging)?);
    ctx.path = path_hint(&uri);
    run(&state, Operation::ListRelationship, ctx).await
}

/// POST /{entity_type}/{id}/{relationship}
pub async fn create_in_relationship(
    State(state): State<AppState>,
    ResourcePath((entity_type, id, relationship)): ResourcePath<(String, String, String)>,
    body: Bytes,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type)
        .with_id(id)
        .with_relationship(relationship)
        .with_body(parse_body(&body)?);
    run(&state, Operation::CreateInRelationship, ctx).await
}

type ItemPath = (String, String, String, String);

/// GET /{entity_type}/{id}/{relationship}/{relationship_id}
pub async fn read_relationship_item(
    State(state): State<AppState>,
    ResourcePath((entity_type, id, relationship, relationship_id)): ResourcePath<ItemPath>,
) -> Result<Response, HaloError> {
    let ctx = RequestContext::new(entity_type)
        .with_id(id)
        .with_relationship(relationship)
        .with_relationship_id(relationship_id);
    run(&state, Operation::ReadRelationshipItem, ctx).await
}
