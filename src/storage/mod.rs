//! Product persistence.
//!
//! The catalog engines only talk to [`ProductStore`]; `postgres` is the production backend and
//! `memory` backs tests and local runs.

use crate::domain::product::{Product, ProductId, ProductKey};
use crate::domain::search::SearchFilter;
use async_trait::async_trait;
use std::collections::HashMap;

pub mod memory;
pub mod postgres;

pub use memory::MemoryProductStore;
pub use postgres::PostgresProductStore;

/// The store's own account of a bulk upsert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkWriteSummary {
    /// Input positions the store inserted, with the identifier it assigned.
    pub upserted: HashMap<usize, ProductId>,
    /// Number of input positions that matched an existing record.
    pub matched: usize,
}

impl BulkWriteSummary {
    pub fn was_inserted(&self, idx: usize) -> bool {
        self.upserted.contains_key(&idx)
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Upserts every product by its (name, category) key as one unordered batch.
    ///
    /// Not atomic: on error some items may already be written.
    async fn bulk_upsert_by_key(&self, products: &[Product]) -> anyhow::Result<BulkWriteSummary>;

    /// Returns the persisted records for `keys` (missing keys are simply absent).
    async fn find_by_keys(&self, keys: &[ProductKey]) -> anyhow::Result<Vec<Product>>;

    /// Returns products matching `filter`, most popular first, at most `filter.limit`.
    async fn query_by_filter(&self, filter: &SearchFilter) -> anyhow::Result<Vec<Product>>;

    async fn find_by_id(&self, id: ProductId) -> anyhow::Result<Option<Product>>;

    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
