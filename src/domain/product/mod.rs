//! Catalog product records and the natural key they are upserted by.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod validation;

pub use validation::validate_products;

/// Store-assigned identifier. Stable for the lifetime of a natural key.
pub type ProductId = i64;

/// A catalog product.
///
/// `id` is ignored on input; the store assigns it on first insert and it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    pub id: Option<ProductId>,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub description: String,
    /// Image URLs, in display order.
    pub images: Vec<String>,
    pub inventory: i64,
    pub popularity: f64,
}

impl Product {
    pub fn key(&self) -> ProductKey {
        ProductKey::new(&self.name, &self.category)
    }
}

/// The (name, category) pair used to match existing records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub name: String,
    pub category: String,
}

impl ProductKey {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Outcome of one bulk-create call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResult {
    pub created: usize,
    pub updated: usize,
    /// Resulting identifiers, in input order.
    pub product_ids: Vec<ProductId>,
}

impl BulkResult {
    pub fn processed(&self) -> usize {
        self.created + self.updated
    }
}
