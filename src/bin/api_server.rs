// src/bin/api_server.rs

use product_catalog::infra::telemetry;
use product_catalog::transport;
use product_catalog::{AppConfig, CatalogService, PostgresProductStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Configuration + logging ---
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(&config.log_filter)?;
    tracing::info!(environment = %config.environment, "starting product catalog");

    // --- Store Initialization ---
    let store = PostgresProductStore::connect(&config.database).await?;
    store.ensure_schema().await?;
    tracing::info!("products schema ready");

    let app_state = transport::http::AppState::new(CatalogService::new(Arc::new(store.clone())));

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let mut app = transport::http::create_router(app_state);
    if !config.is_production() {
        app = app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        );
    }
    let app = app.layer(cors);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "API server listening");

    // In-flight requests drain before `serve` returns; the pool closes only after that.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped, closing database pool");
    store.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
