//! Server module for building HTTP servers with auto-registered routes
//!
//! This module provides a `ServerBuilder` that registers, for every declared
//! entity type, collection, item and relationship routes plus health checks.

pub mod builder;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use handlers::AppState;
pub use host::ServerHost;
