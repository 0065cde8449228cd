use tokio::sync::oneshot;

use crate::domain::{
    DeleteResponse, Pagination, Product, ProductCreate, ProductId, ProductPage, ProductPatch,
    ProductResponse,
};
use crate::product_actor::ProductError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed messages for the catalog actor. Each variant includes parameters
/// and a oneshot channel for the response.
#[derive(Debug)]
pub enum CatalogRequest {
    CreateProduct {
        payload: ProductCreate,
        respond_to: ServiceResponse<Product, ProductError>,
    },
    ListProducts {
        pagination: Pagination,
        respond_to: ServiceResponse<ProductPage, ProductError>,
    },
    GetProduct {
        id: ProductId,
        respond_to: ServiceResponse<ProductResponse, ProductError>,
    },
    UpdateProduct {
        id: ProductId,
        patch: ProductPatch,
        respond_to: ServiceResponse<ProductResponse, ProductError>,
    },
    RemoveProduct {
        id: ProductId,
        respond_to: ServiceResponse<DeleteResponse, ProductError>,
    },
    ValidateProducts {
        ids: Vec<ProductId>,
        respond_to: ServiceResponse<Vec<Product>, ProductError>,
    },
    Shutdown,
}
