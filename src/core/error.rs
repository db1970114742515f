//! Typed error handling for the halo framework
//!
//! Every core operation returns [`HaloError`], which groups failures into the
//! categories a client can act on:
//!
//! - [`NotFoundError`]: unknown entity type, resource id or relationship
//! - [`OrderError`]: an order token names a property the type does not declare
//! - [`ValidationError`]: the data-access layer refused to save a resource
//! - [`DeleteError`]: the data-access layer refused to destroy a resource
//! - [`RequestError`]: malformed request input the dispatcher could not coerce
//! - [`ConfigError`]: invalid entity declarations at startup
//! - `Storage`: infrastructure failures, propagated unmodified
//! - `Internal`: broken invariants inside the framework itself
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.read_item(&ctx).await {
//!     Ok(representation) => println!("{}", representation.to_json()),
//!     Err(HaloError::NotFound(e)) => println!("missing: {}", e),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// The main error type for the halo framework
#[derive(Debug, Error)]
pub enum HaloError {
    /// Unknown type, id or relationship
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Invalid order token
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Failed save
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed destroy
    #[error(transparent)]
    Delete(#[from] DeleteError),

    /// Malformed request input
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Invalid entity declarations
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Infrastructure failure reported by the data-access layer
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),

    /// Broken internal invariant (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl HaloError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HaloError::NotFound(_) => StatusCode::NOT_FOUND,
            HaloError::Order(_) => StatusCode::BAD_REQUEST,
            HaloError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HaloError::Delete(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HaloError::Request(_) => StatusCode::BAD_REQUEST,
            HaloError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HaloError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HaloError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HaloError::NotFound(_) => "NOT_FOUND",
            HaloError::Order(_) => "INVALID_ORDER",
            HaloError::Validation(_) => "VALIDATION_FAILED",
            HaloError::Delete(_) => "DELETE_FAILED",
            HaloError::Request(_) => "BAD_REQUEST",
            HaloError::Config(_) => "CONFIG_ERROR",
            HaloError::Storage(_) => "STORAGE_ERROR",
            HaloError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check whether this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, HaloError::NotFound(_))
    }

    /// Render the JSON error body
    ///
    /// Validation failures carry the full message list under `errors`,
    /// everything else a single `error` message.
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            HaloError::Validation(e) => json!({ "errors": e.messages }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl IntoResponse for HaloError {
    fn into_response(self) -> Response {
        match &self {
            HaloError::Storage(e) => {
                tracing::error!(error = %e, "request failed in data-access layer")
            }
            HaloError::Config(e) => {
                tracing::error!(error = %e, "request hit a configuration error")
            }
            HaloError::Internal(message) => tracing::error!(%message, "internal error"),
            _ => {}
        }
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

// =============================================================================
// Not Found
// =============================================================================

/// Something addressed by the request does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// No registered type matches the path segment
    #[error("unknown resource type '{segment}'")]
    UnknownType { segment: String },

    /// More than one registered type matches the path segment
    #[error("resource type '{segment}' is ambiguous (matches {})", .candidates.join(", "))]
    AmbiguousType {
        segment: String,
        candidates: Vec<String>,
    },

    /// No resource of this type has this id
    #[error("{entity_type} '{id}' not found")]
    UnknownResource { entity_type: String, id: String },

    /// The type declares no relationship with this name
    #[error("{entity_type} has no relationship '{relationship}'")]
    UnknownRelationship {
        entity_type: String,
        relationship: String,
    },
}

// =============================================================================
// Order
// =============================================================================

/// An order token could not be resolved against the queried type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order '{token}': {reason}")]
pub struct OrderError {
    /// The raw token as supplied by the client
    pub token: String,
    /// What was wrong with it
    pub reason: String,
}

impl OrderError {
    pub fn unknown_property(token: impl Into<String>, entity_type: &str) -> Self {
        Self {
            token: token.into(),
            reason: format!("{} has no such property", entity_type),
        }
    }

    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation / Delete
// =============================================================================

/// The data-access layer rejected a save
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity_type} is invalid: {}", .messages.join("; "))]
pub struct ValidationError {
    pub entity_type: String,
    /// Field-level messages, in the order the data-access layer produced them
    pub messages: Vec<String>,
}

/// The data-access layer refused to destroy a resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not delete {entity_type} '{id}'")]
pub struct DeleteError {
    pub entity_type: String,
    pub id: String,
}

// =============================================================================
// Request
// =============================================================================

/// Request input the dispatcher could not turn into typed parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid query parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("request body must be a JSON object: {message}")]
    InvalidBody { message: String },

    #[error("malformed request URI: {message}")]
    MalformedUri { message: String },
}

// =============================================================================
// Config
// =============================================================================

/// Invalid entity declarations, detected while building the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("entity type '{name}' is declared more than once")]
    DuplicateType { name: String },

    #[error("entity type '{entity_type}' declares '{name}' more than once")]
    DuplicateMember { entity_type: String, name: String },

    #[error("relationship '{entity_type}.{relationship}' targets unknown type '{target}'")]
    UnknownTarget {
        entity_type: String,
        relationship: String,
        target: String,
    },

    #[error("invalid entity declaration: {message}")]
    Invalid { message: String },
}
