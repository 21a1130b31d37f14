//! In-process product store for tests and local runs.

use crate::domain::product::{Product, ProductId, ProductKey};
use crate::domain::search::SearchFilter;
use crate::storage::{BulkWriteSummary, ProductStore};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    next_id: ProductId,
    /// Insertion order doubles as the store-native order for popularity ties.
    rows: Vec<Product>,
    by_key: HashMap<ProductKey, usize>,
}

#[derive(Default)]
pub struct MemoryProductStore {
    state: RwLock<MemoryState>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent operation fail, as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn enter(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("memory store is unavailable"));
        }
        Ok(())
    }
}

fn matches_text(product: &Product, needle_lower: &str) -> bool {
    product.name.to_lowercase().contains(needle_lower)
        || product.description.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn bulk_upsert_by_key(&self, products: &[Product]) -> anyhow::Result<BulkWriteSummary> {
        self.enter()?;
        let mut state = self.state.write().await;
        let mut summary = BulkWriteSummary::default();

        for (idx, product) in products.iter().enumerate() {
            let key = product.key();
            match state.by_key.get(&key).copied() {
                Some(pos) => {
                    let existing = &mut state.rows[pos];
                    let id = existing.id;
                    *existing = Product {
                        id,
                        ..product.clone()
                    };
                    summary.matched += 1;
                }
                None => {
                    state.next_id += 1;
                    let id = state.next_id;
                    let pos = state.rows.len();
                    state.rows.push(Product {
                        id: Some(id),
                        ..product.clone()
                    });
                    state.by_key.insert(key, pos);
                    summary.upserted.insert(idx, id);
                }
            }
        }
        Ok(summary)
    }

    async fn find_by_keys(&self, keys: &[ProductKey]) -> anyhow::Result<Vec<Product>> {
        self.enter()?;
        let state = self.state.read().await;
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for key in keys {
            if let Some(&pos) = state.by_key.get(key) {
                if !seen.contains(&pos) {
                    seen.push(pos);
                    out.push(state.rows[pos].clone());
                }
            }
        }
        Ok(out)
    }

    async fn query_by_filter(&self, filter: &SearchFilter) -> anyhow::Result<Vec<Product>> {
        self.enter()?;
        let state = self.state.read().await;
        let needle = filter.search_text.to_lowercase();

        let mut hits: Vec<Product> = state
            .rows
            .iter()
            .filter(|p| filter.categories.is_empty() || filter.categories.contains(&p.category))
            .filter(|p| filter.brands.is_empty() || filter.brands.contains(&p.brand))
            .filter(|p| filter.price_in_range(p.price))
            .filter(|p| !filter.has_text() || matches_text(p, &needle))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal popularity.
        hits.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
        hits.truncate(filter.limit);
        Ok(hits)
    }

    async fn find_by_id(&self, id: ProductId) -> anyhow::Result<Option<Product>> {
        self.enter()?;
        let state = self.state.read().await;
        Ok(state.rows.iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.enter()
    }
}
