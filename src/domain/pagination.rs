use serde::{Deserialize, Serialize};

use super::product::Product;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 5;

/// Page request. Both fields are 1-based and optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Pagination {
    #[allow(dead_code)]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// `(page - 1) * limit`, saturating at zero for a page of 0.
    pub fn offset(&self) -> usize {
        self.page().saturating_sub(1) as usize * self.limit() as usize
    }
}

/// `{ lastPage, totalProducts, products }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub last_page: u64,
    pub total_products: u64,
    pub products: Vec<Product>,
}

impl ProductPage {
    /// An empty catalog has `last_page == 0`.
    pub fn new(total_products: u64, limit: u32, products: Vec<Product>) -> Self {
        let last_page = match u64::from(limit) {
            0 => 0,
            limit => total_products.div_ceil(limit),
        };
        Self {
            last_page,
            total_products,
            products,
        }
    }
}
