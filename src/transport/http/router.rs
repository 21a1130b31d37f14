use crate::domain::product::Product;
use crate::domain::search::PriceRange;
use crate::transport::http::handlers::{health, products};
use crate::transport::http::types::{
    AppState, BulkCreateProductsRequest, CreateProductsResponse, ErrorInfo, ErrorResponse,
    HealthResponse, ProductResponse, SearchProductsRequest, SearchProductsResponse,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        health::sanity_handler,
        products::bulk_create_products_handler,
        products::search_products_handler,
        products::get_product_handler
    ),
    components(schemas(
        Product,
        PriceRange,
        BulkCreateProductsRequest,
        CreateProductsResponse,
        SearchProductsRequest,
        SearchProductsResponse,
        ProductResponse,
        ErrorResponse,
        ErrorInfo,
        HealthResponse
    ))
)]
pub struct ApiDoc;

/// Builds the HTTP routes. Request tracing covers the product routes only, so health
/// checks stay out of the logs.
pub fn create_router(app_state: AppState) -> Router {
    let product_routes = Router::new()
        .route("/products/bulk", post(products::bulk_create_products_handler))
        .route("/products/search", post(products::search_products_handler))
        .route("/products/:product_id", get(products::get_product_handler))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/sanity", get(health::sanity_handler))
        .merge(product_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use serde_json::Value;
    use utoipa::OpenApi;

    fn collect_refs(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    match (key.as_str(), v) {
                        ("$ref", Value::String(r)) => out.push(r.clone()),
                        _ => collect_refs(v, out),
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
            _ => {}
        }
    }

    #[test]
    fn every_schema_reference_is_registered() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = doc["components"]["schemas"].as_object().unwrap();

        let mut refs = Vec::new();
        collect_refs(&doc, &mut refs);
        assert!(!refs.is_empty());
        for r in refs {
            let name = r.trim_start_matches("#/components/schemas/");
            assert!(schemas.contains_key(name), "unregistered schema {}", r);
        }
        assert!(!schemas.contains_key("ProductId"));
    }
}
