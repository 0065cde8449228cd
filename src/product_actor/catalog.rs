use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use super::entity::ProductFilter;
use super::error::ProductError;
use crate::actor_framework::{ResourceClient, StoreError};
use crate::domain::{
    DeleteResponse, Pagination, Product, ProductCreate, ProductId, ProductPage, ProductPatch,
    ProductResponse,
};

/// The catalog operations over the product store.
///
/// Holds nothing but a store handle, so clones are cheap and every call is
/// independent of the others. `update` and `remove` read then write without
/// any version check: concurrent writers to the same id race and the last
/// write wins.
#[derive(Clone)]
pub struct ProductCatalog {
    store: ResourceClient<Product>,
}

impl ProductCatalog {
    pub fn new(store: ResourceClient<Product>) -> Self {
        Self { store }
    }

    #[instrument(fields(product_name = %payload.name), skip(self, payload))]
    pub async fn create(&self, payload: ProductCreate) -> Result<Product, ProductError> {
        debug!("Processing create_product request");
        let product = self.store.insert(payload).await?;
        info!(product_id = product.id, "Product created successfully");
        Ok(product)
    }

    /// Count and page are two separate reads; under concurrent writes the
    /// total may not match the page exactly.
    #[instrument(fields(page = pagination.page(), limit = pagination.limit()), skip(self, pagination))]
    pub async fn list(&self, pagination: Pagination) -> Result<ProductPage, ProductError> {
        debug!("Processing get_all_product request");
        let limit = pagination.limit();
        let total = self.store.count(ProductFilter::Available).await?;
        let products = self
            .store
            .find_page(ProductFilter::Available, pagination.offset(), limit as usize)
            .await?;

        info!(total_products = total, returned = products.len(), "Listed products");
        Ok(ProductPage::new(total as u64, limit, products))
    }

    #[instrument(fields(product_id = id), skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<ProductResponse, ProductError> {
        debug!("Processing get_product_by_id request");
        match self.store.find_by_id(id).await? {
            Some(product) if product.available.is_active() => {
                debug!(product_name = %product.name, "Product found");
                Ok(ProductResponse { product })
            }
            _ => {
                debug!("Product not found or removed");
                Err(ProductError::not_found(id))
            }
        }
    }

    #[instrument(fields(product_id = id), skip(self, patch))]
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<ProductResponse, ProductError> {
        debug!("Processing update_product request");
        self.get_by_id(id).await?;

        // Lifecycle changes go through `remove` only
        let patch = ProductPatch { available: None, ..patch };
        match self.store.update_fields(id, patch).await? {
            Some(product) => {
                info!("Product updated successfully");
                Ok(ProductResponse { product })
            }
            None => {
                warn!("Product vanished between lookup and update");
                Err(StoreError::Unknown(format!("record to update not found: {id}")).into())
            }
        }
    }

    #[instrument(fields(product_id = id), skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<DeleteResponse, ProductError> {
        debug!("Processing delete_product request");
        self.get_by_id(id).await?;

        let removed = self.store.update_fields(id, ProductPatch::removal()).await?;
        let product_deleted = removed.is_some();
        info!(product_deleted, "Product soft-deleted");
        Ok(DeleteResponse { product_deleted })
    }

    /// Checks that every id in `ids` resolves to a stored product, removed
    /// rows included.
    ///
    /// The lookup runs over the distinct ids but the result is compared with
    /// the length of the input as given, so a batch containing duplicates is
    /// always reported as failing.
    #[instrument(fields(requested = ids.len()), skip(self, ids))]
    pub async fn validate_batch(&self, ids: Vec<ProductId>) -> Result<Vec<Product>, ProductError> {
        debug!("Processing validate_products request");
        let distinct: BTreeSet<ProductId> = ids.iter().copied().collect();
        let products = self.store.find_by_ids(distinct.into_iter().collect()).await?;

        if products.len() != ids.len() {
            warn!(found = products.len(), "Some products aren't found");
            return Err(ProductError::missing_products());
        }

        info!(found = products.len(), "Products validated");
        Ok(products)
    }
}
