use thiserror::Error;

use crate::actor_framework::StoreError;
use crate::domain::ProductId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ValidationFailure(String),
    #[error("Product store error: {0}")]
    Store(#[from] StoreError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn not_found(id: ProductId) -> Self {
        Self::NotFound(format!("Product with id: {id}, not found"))
    }

    pub fn missing_products() -> Self {
        Self::ValidationFailure("Some Products aren't found".to_string())
    }
}
