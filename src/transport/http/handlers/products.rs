use crate::domain::product::ProductId;
use crate::error::CatalogError;
use crate::transport::http::handlers::common::rejection_to_error;
use crate::transport::http::types::{
    AppState, BulkCreateProductsRequest, CreateProductsResponse, ErrorResponse, ProductResponse,
    SearchProductsRequest, SearchProductsResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

#[utoipa::path(
    post,
    path = "/products/bulk",
    request_body = BulkCreateProductsRequest,
    responses(
        (status = 200, description = "Products created or updated", body = CreateProductsResponse),
        (status = 400, description = "Empty or invalid product list", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn bulk_create_products_handler(
    State(state): State<AppState>,
    request: Result<Json<BulkCreateProductsRequest>, JsonRejection>,
) -> Result<Json<CreateProductsResponse>, CatalogError> {
    let Json(request) = request.map_err(rejection_to_error)?;
    tracing::info!(count = request.products.len(), "bulk create products request");

    let result = state.catalog.bulk_upsert(&request.products).await?;
    let response = CreateProductsResponse::from(result);
    tracing::info!(message = %response.message, "bulk create products response");
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/products/search",
    request_body = SearchProductsRequest,
    responses(
        (status = 200, description = "Matching products, most popular first", body = SearchProductsResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "No products matched", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn search_products_handler(
    State(state): State<AppState>,
    request: Result<Json<SearchProductsRequest>, JsonRejection>,
) -> Result<Json<SearchProductsResponse>, CatalogError> {
    let Json(request) = request.map_err(rejection_to_error)?;
    let filter = request.into_filter();

    let products = state.catalog.search(&filter).await?;
    Ok(Json(SearchProductsResponse::from(products)))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}",
    params(
        ("product_id" = i64, Path, description = "Store-assigned product identifier")
    ),
    responses(
        (status = 200, description = "The product", body = ProductResponse),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Unknown product", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductResponse>, CatalogError> {
    let id: ProductId = product_id
        .trim()
        .parse()
        .map_err(|_| CatalogError::validation(format!("Invalid product ID: {}", product_id)))?;

    let product = state.catalog.get_product(id).await?;
    Ok(Json(ProductResponse {
        success: true,
        message: "Product fetched successfully".to_string(),
        product,
    }))
}
