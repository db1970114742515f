//! Router builder utilities for resource routes

use crate::server::handlers::{
    AppState, create_in_collection, create_in_relationship, delete_item, list_collection,
    list_relationship, read_item, read_relationship_item, update_item,
};
use axum::{Router, routing::get};

/// Build resource routes
///
/// These routes are generic and work for all registered entity types:
/// - GET|POST /{entity_type} - List or create
/// - GET|PUT|PATCH|DELETE /{entity_type}/{id} - Read, update or delete one resource
/// - GET|POST /{entity_type}/{id}/{relationship} - List or create through a relationship
/// - GET /{entity_type}/{id}/{relationship}/{relationship_id} - Read one related resource
pub fn build_resource_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/{entity_type}",
            get(list_collection).post(create_in_collection),
        )
        .route(
            "/{entity_type}/{id}",
            get(read_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .route(
            "/{entity_type}/{id}/{relationship}",
            get(list_relationship).post(create_in_relationship),
        )
        .route(
            "/{entity_type}/{id}/{relationship}/{relationship_id}",
            get(read_relationship_item),
        )
        .with_state(state)
}
