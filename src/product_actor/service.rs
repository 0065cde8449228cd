use tokio::sync::mpsc;
use tracing::{debug, info, instrument, Instrument};

use super::ProductCatalog;
use crate::actor_framework::ResourceClient;
use crate::clients::CatalogClient;
use crate::domain::Product;
use crate::messages::CatalogRequest;

/// Catalog actor. Receives [`CatalogRequest`]s and runs each one on its own
/// task, so a slow store round-trip never holds up other callers.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    catalog: ProductCatalog,
}

impl CatalogService {
    pub fn new(buffer_size: usize, store: ResourceClient<Product>) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            catalog: ProductCatalog::new(store),
        };
        let client = CatalogClient::new(sender);
        (service, client)
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            if let CatalogRequest::Shutdown = msg {
                info!("CatalogService shutting down");
                break;
            }
            let catalog = self.catalog.clone();
            tokio::spawn(handle_request(catalog, msg).in_current_span());
        }

        info!("CatalogService stopped");
    }
}

/// The spawned task owns `respond_to` and replies once the work is done.
async fn handle_request(catalog: ProductCatalog, request: CatalogRequest) {
    match request {
        CatalogRequest::CreateProduct { payload, respond_to } => {
            let _ = respond_to.send(catalog.create(payload).await);
        }
        CatalogRequest::ListProducts { pagination, respond_to } => {
            let _ = respond_to.send(catalog.list(pagination).await);
        }
        CatalogRequest::GetProduct { id, respond_to } => {
            let _ = respond_to.send(catalog.get_by_id(id).await);
        }
        CatalogRequest::UpdateProduct { id, patch, respond_to } => {
            let _ = respond_to.send(catalog.update(id, patch).await);
        }
        CatalogRequest::RemoveProduct { id, respond_to } => {
            let _ = respond_to.send(catalog.remove(id).await);
        }
        CatalogRequest::ValidateProducts { ids, respond_to } => {
            let _ = respond_to.send(catalog.validate_batch(ids).await);
        }
        CatalogRequest::Shutdown => debug!("Shutdown reached a request task"),
    }
}
