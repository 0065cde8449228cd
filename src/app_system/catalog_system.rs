use tracing::{error, info, instrument};

use super::config::CatalogConfig;
use crate::actor_framework::{ResourceActor, ResourceClient};
use crate::clients::CatalogClient;
use crate::domain::Product;
use crate::product_actor::{sequential_ids, CatalogService};
use crate::transport::CommandRouter;

/// The application system that owns every actor.
///
/// Starts the store before the catalog that depends on it, hands out the
/// catalog client, and shuts everything down in reverse order.
pub struct CatalogSystem {
    pub catalog_client: CatalogClient,
    store_client: ResourceClient<Product>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CatalogSystem {
    /// Create and start the actor system
    #[instrument(name = "catalog_system", skip(config))]
    pub fn new(config: &CatalogConfig) -> Self {
        let mut handles = Vec::new();

        info!(buffer = config.channel_buffer, "Starting catalog system");

        let (store, store_client) =
            ResourceActor::<Product>::new(config.channel_buffer, sequential_ids());
        handles.push(tokio::spawn(store.run()));

        let (catalog_service, catalog_client) =
            CatalogService::new(config.channel_buffer, store_client.clone());
        handles.push(tokio::spawn(catalog_service.run()));

        info!("Catalog system started successfully");

        Self {
            catalog_client,
            store_client,
            handles,
        }
    }

    /// Command router for the asynchronous transport.
    pub fn router(&self) -> CommandRouter {
        CommandRouter::new(self.catalog_client.clone())
    }

    /// Gracefully shutdown the system: catalog first, then the store.
    ///
    /// Errors are logged and shutdown continues, so it never hangs on a
    /// failed task.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        info!("Shutting down catalog system");

        if let Err(e) = self.catalog_client.shutdown().await {
            error!(error = %e, "Catalog shutdown request failed");
        }
        if let Err(e) = self.store_client.shutdown().await {
            error!(error = %e, "Store shutdown request failed");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
            }
        }

        info!("Catalog system shutdown complete");
    }
}
