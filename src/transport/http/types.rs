use crate::app::catalog_service::CatalogService;
use crate::domain::product::{BulkResult, Product, ProductId};
use crate::domain::search::{normalize, PriceRange, SearchFilter, TermsInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct BulkCreateProductsRequest {
    pub products: Vec<Product>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductsResponse {
    pub success: bool,
    pub message: String,
    pub created: usize,
    pub updated: usize,
    #[schema(value_type = Vec<i64>)]
    pub product_ids: Vec<ProductId>,
}

impl From<BulkResult> for CreateProductsResponse {
    fn from(result: BulkResult) -> Self {
        Self {
            success: true,
            message: format!(
                "Successfully processed {} products ({} created, {} updated)",
                result.processed(),
                result.created,
                result.updated
            ),
            created: result.created,
            updated: result.updated,
            product_ids: result.product_ids,
        }
    }
}

/// Search body. `category` and `brand` accept a string or a list of strings.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub category: TermsInput,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub brand: TermsInput,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub search: String,
}

impl SearchProductsRequest {
    pub fn into_filter(self) -> SearchFilter {
        normalize(self.category, self.brand, self.price_range, self.search)
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SearchProductsResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub products: Vec<Product>,
}

impl From<Vec<Product>> for SearchProductsResponse {
    fn from(products: Vec<Product>) -> Self {
        Self {
            success: true,
            message: format!("Found {} products", products.len()),
            count: products.len(),
            products,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ProductResponse {
    pub success: bool,
    pub message: String,
    pub product: Product,
}

/// Error envelope: `{"info": {...}}`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub info: ErrorInfo,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    pub display_message: String,
    pub code: String,
    /// Always `"error"`.
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    /// `UP` or `DOWN`.
    pub status: String,
}

pub const STATUS_UP: &str = "UP";
pub const STATUS_DOWN: &str = "DOWN";
