use tokio::sync::mpsc;
use tracing::{debug, instrument};

use super::macros::client_method;
use crate::domain::{
    DeleteResponse, Pagination, Product, ProductCreate, ProductId, ProductPage, ProductPatch,
    ProductResponse,
};
use crate::messages::CatalogRequest;
use crate::product_actor::ProductError;

/// Client for the catalog actor. Thin, cloneable wrapper around the
/// request channel; every method replies with the raw [`ProductError`] so the
/// caller picks how failures are rendered.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    /// Manual method for the one message that expects no response
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), ProductError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CatalogRequest::Shutdown)
            .await
            .map_err(|_| ProductError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(CatalogClient => fn create_product(payload: ProductCreate) -> Product as CatalogRequest::CreateProduct, Error = ProductError);
client_method!(CatalogClient => fn get_all_products(pagination: Pagination) -> ProductPage as CatalogRequest::ListProducts, Error = ProductError);
client_method!(CatalogClient => fn get_product_by_id(id: ProductId) -> ProductResponse as CatalogRequest::GetProduct, Error = ProductError);
client_method!(CatalogClient => fn update_product(id: ProductId, patch: ProductPatch) -> ProductResponse as CatalogRequest::UpdateProduct, Error = ProductError);
client_method!(CatalogClient => fn delete_product(id: ProductId) -> DeleteResponse as CatalogRequest::RemoveProduct, Error = ProductError);
client_method!(CatalogClient => fn validate_products(ids: Vec<ProductId>) -> Vec<Product> as CatalogRequest::ValidateProducts, Error = ProductError);
