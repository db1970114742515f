//! Server host for transport-agnostic API exposure
//!
//! The host holds everything an exposure needs to serve requests: the frozen
//! entity registry, the data-access layer and the paging settings. It is
//! built once by [`ServerBuilder`](super::ServerBuilder) and shared read-only.

use crate::config::ServerSettings;
use crate::core::controller::ResourceController;
use crate::core::registry::EntityRegistry;
use crate::core::store::DataStore;
use crate::server::handlers::AppState;
use std::sync::Arc;

/// Host context containing all framework state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(settings, registry, store));
/// let app = RestExposure::build_router(host, vec![])?;
/// ```
pub struct ServerHost {
    /// Paging settings from the merged configuration
    pub settings: ServerSettings,

    /// Registry of every exposed entity type
    pub registry: Arc<EntityRegistry>,

    /// Data-access layer behind every operation
    pub store: Arc<dyn DataStore>,
}

impl ServerHost {
    pub fn new(
        settings: ServerSettings,
        registry: Arc<EntityRegistry>,
        store: Arc<dyn DataStore>,
    ) -> Self {
        Self {
            settings,
            registry,
            store,
        }
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.registry.entity_types()
    }

    /// Controller bound to this host's registry and store
    pub fn controller(&self) -> ResourceController {
        ResourceController::new(Arc::clone(&self.registry), Arc::clone(&self.store))
    }

    /// Handler state for the REST exposure
    pub fn app_state(&self) -> AppState {
        AppState {
            controller: self.controller(),
            paging: self.settings.paging(),
        }
    }
}

#[cfg(all(test, feature = "in-memory"))]
mod tests {
    use super::*;
    use crate::core::entity::EntityTypeDescriptor;
    use crate::storage::InMemoryStore;

    fn make_host() -> ServerHost {
        let registry = Arc::new(
            EntityRegistry::new(vec![EntityTypeDescriptor::new("order")]).expect("valid registry"),
        );
        let store = Arc::new(InMemoryStore::new(Arc::clone(&registry)));
        ServerHost::new(ServerSettings::default(), registry, store)
    }

    #[test]
    fn test_entity_types_listed() {
        let host = make_host();
        assert_eq!(host.entity_types(), vec!["order"]);
    }

    #[test]
    fn test_app_state_carries_paging() {
        let mut host = make_host();
        host.settings.max_limit = 10;
        let state = host.app_state();
        assert_eq!(state.paging.max_limit, 10);
        assert_eq!(state.paging.default_limit, 30);
    }

    #[test]
    fn test_controller_shares_registry() {
        let host = make_host();
        let controller = host.controller();
        assert!(Arc::ptr_eq(controller.registry(), &host.registry));
    }
}
