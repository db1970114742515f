//! REST API exposure for the framework
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`
//! serving `application/hal+json` documents.

use super::super::host::ServerHost;
use crate::server::router::build_resource_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - Custom routes
    /// - Resource and relationship routes
    ///
    /// every request traced through `TraceLayer`.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let resource_routes = build_resource_routes(host.app_state());

        let mut app = Self::health_routes();
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }
        app = app.merge(resource_routes);

        Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "halo"
        }))
    }
}
