use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Availability, Product, ProductCreate, ProductId, ProductPatch};

/// Row selection for product queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductFilter {
    /// Every row, removed ones included
    #[default]
    All,
    /// Only rows that have not been soft-deleted
    Available,
}

impl Entity for Product {
    type Id = ProductId;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Filter = ProductFilter;

    fn id(&self) -> ProductId {
        self.id
    }

    /// Creates a new, available Product from creation parameters.
    fn from_create(id: ProductId, params: ProductCreate) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            available: Availability::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the fields present in `patch` and refreshes `updated_at`.
    ///
    /// # Fields Updated
    /// - `name`, `description`, `price`: business attributes
    /// - `available`: only ever moved to `Removed`
    fn on_update(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if patch.available == Some(Availability::Removed) {
            self.available = Availability::Removed;
        }
        self.updated_at = Utc::now();
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::All => true,
            ProductFilter::Available => self.available.is_active(),
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

/// Id generator for the product table: 1, 2, 3, ...
pub fn sequential_ids() -> impl Fn() -> ProductId + Send + Sync + 'static {
    let counter = Arc::new(AtomicI64::new(1));
    move || counter.fetch_add(1, Ordering::SeqCst)
}
