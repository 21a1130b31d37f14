//! Shared harness: serves the router over an in-memory store on an ephemeral port.

#![allow(dead_code)]

use product_catalog::{transport, CatalogService, MemoryProductStore, ProductStore};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryProductStore>,
}

pub async fn spawn_app() -> Result<TestApp, Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryProductStore::new());
    let dyn_store: Arc<dyn ProductStore> = store.clone();
    let state = transport::http::AppState::new(CatalogService::new(dyn_store));
    let router = transport::http::create_router(state);

    // Bind to an ephemeral port so tests can run in parallel.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
    })
}

impl TestApp {
    pub async fn post(&self, path: &str, body: &Value) -> Result<(u16, Value), reqwest::Error> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json::<Value>().await?))
    }

    pub async fn get(&self, path: &str) -> Result<(u16, Value), reqwest::Error> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json::<Value>().await?))
    }
}

pub fn product(name: &str, category: &str, brand: &str, price: f64, popularity: f64) -> Value {
    json!({
        "name": name,
        "category": category,
        "brand": brand,
        "price": price,
        "description": format!("{} by {}", name, brand),
        "images": ["https://img.example.com/1.png"],
        "inventory": 10,
        "popularity": popularity
    })
}
