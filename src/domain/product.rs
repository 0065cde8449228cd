use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned product identifier.
pub type ProductId = i64;

/// Lifecycle of a product row. `Removed` is the soft-deleted state; the only
/// transition is `Active -> Removed`.
///
/// On the wire this is the boolean `available` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Availability {
    #[default]
    Active,
    Removed,
}

impl Availability {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Active
        } else {
            Self::Removed
        }
    }
}

impl From<Availability> for bool {
    fn from(availability: Availability) -> Self {
        availability.is_active()
    }
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub available: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new product. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl ProductCreate {
    #[allow(dead_code)]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
        }
    }
}

/// Partial update of a product. Every field is optional and absent fields are
/// left untouched. It has no `id` field.
///
/// `available` cannot be supplied by callers; it is only set through
/// [`ProductPatch::removal`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(skip)]
    pub available: Option<Availability>,
}

impl ProductPatch {
    /// The soft-delete patch.
    pub fn removal() -> Self {
        Self {
            available: Some(Availability::Removed),
            ..Self::default()
        }
    }
}

/// `{ product }` reply of lookups and updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// `{ productDeleted }` reply of a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub product_deleted: bool,
}
