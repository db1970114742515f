//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::HaloConfig;
use crate::core::entity::EntityTypeDescriptor;
use crate::core::registry::EntityRegistry;
use crate::core::store::DataStore;
use anyhow::Result;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config_file("schema.yaml")?
///     .build()?;
/// ```
pub struct ServerBuilder {
    configs: Vec<HaloConfig>,
    entity_types: Vec<EntityTypeDescriptor>,
    store: Option<Arc<dyn DataStore>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            configs: Vec::new(),
            entity_types: Vec::new(),
            store: None,
            custom_routes: Vec::new(),
        }
    }

    /// Add a configuration; several are merged in order
    pub fn with_config(mut self, config: HaloConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Load and add a YAML configuration file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = HaloConfig::from_yaml_file(path)?;
        Ok(self.with_config(config))
    }

    /// Register an entity type declared in code
    pub fn register_type(mut self, descriptor: EntityTypeDescriptor) -> Self {
        self.entity_types.push(descriptor);
        self
    }

    /// Set the data-access layer
    ///
    /// Defaults to an [`InMemoryStore`](crate::storage::InMemoryStore) over
    /// the built registry when the `in-memory` feature is enabled.
    pub fn with_store(mut self, store: impl DataStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this to add routes that don't fit the resource pattern. Static
    /// paths take precedence over the generic `/{entity_type}` routes.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Merges every configuration, validates the registry and attaches the
    /// data-access layer.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = HaloConfig::merge(std::mem::take(&mut self.configs));
        let extra = std::mem::take(&mut self.entity_types);
        let registry = Arc::new(config.build_registry_with(extra)?);
        if registry.is_empty() {
            tracing::warn!("no entity types registered");
        }

        let store = match self.store.take() {
            Some(store) => store,
            None => Self::default_store(&registry)?,
        };

        tracing::debug!(entity_types = ?registry.entity_types(), "server host built");
        Ok(ServerHost::new(config.server, registry, store))
    }

    #[cfg(feature = "in-memory")]
    fn default_store(registry: &Arc<EntityRegistry>) -> Result<Arc<dyn DataStore>> {
        Ok(Arc::new(crate::storage::InMemoryStore::new(Arc::clone(registry))))
    }

    #[cfg(not(feature = "in-memory"))]
    fn default_store(_registry: &Arc<EntityRegistry>) -> Result<Arc<dyn DataStore>> {
        Err(anyhow::anyhow!("DataStore is required. Call .with_store()"))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
