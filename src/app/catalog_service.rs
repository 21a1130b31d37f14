//! The catalog service.
//!
//! Sits between the HTTP handlers and the [`ProductStore`]:
//! 1.  Validates bulk payloads and runs the batched upsert.
//! 2.  Reconciles created/updated counts and identifiers from the store's view.
//! 3.  Runs filtered searches and single-product lookups.

use crate::domain::product::{validate_products, BulkResult, Product, ProductId, ProductKey};
use crate::domain::search::SearchFilter;
use crate::error::{CatalogError, CatalogResult};
use crate::storage::{BulkWriteSummary, ProductStore};
use std::collections::HashMap;
use std::sync::Arc;

pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Upserts `products` by (name, category) and reports what the store did.
    ///
    /// Validation happens up front: a single bad item rejects the batch and the store is never
    /// touched. Once dispatched the batch is not atomic, and the counts come from a read after the
    /// write, so a concurrent writer can skew them.
    pub async fn bulk_upsert(&self, products: &[Product]) -> CatalogResult<BulkResult> {
        validate_products(products)?;

        let summary = self
            .store
            .bulk_upsert_by_key(products)
            .await
            .map_err(store_failure("bulk upsert"))?;

        let keys: Vec<ProductKey> = products.iter().map(Product::key).collect();
        let persisted = self
            .store
            .find_by_keys(&keys)
            .await
            .map_err(store_failure("upsert reconciliation"))?;

        let ids_by_key: HashMap<ProductKey, ProductId> = persisted
            .iter()
            .filter_map(|p| p.id.map(|id| (p.key(), id)))
            .collect();

        let result = reconcile(&keys, &summary, &ids_by_key);
        tracing::info!(
            submitted = products.len(),
            created = result.created,
            updated = result.updated,
            matched = summary.matched,
            "bulk upsert finished"
        );
        Ok(result)
    }

    /// Most popular products matching `filter`. An empty hit list is a [`CatalogError::NotFound`].
    pub async fn search(&self, filter: &SearchFilter) -> CatalogResult<Vec<Product>> {
        tracing::info!(?filter, "searching products");
        let products = self
            .store
            .query_by_filter(filter)
            .await
            .map_err(store_failure("product search"))?;

        if products.is_empty() {
            return Err(CatalogError::not_found(
                "No products found matching the search criteria",
            ));
        }
        Ok(products)
    }

    pub async fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        tracing::info!(product_id = id, "fetching product by id");
        self.store
            .find_by_id(id)
            .await
            .map_err(store_failure("product lookup"))?
            .ok_or_else(|| CatalogError::not_found("Product not found"))
    }
}

/// Folds the store's write summary and the follow-up read into a [`BulkResult`].
///
/// Positions the store inserted count as created; any other position whose key now resolves to
/// a record counts as updated. Identifiers follow input order; keys that no longer resolve are
/// skipped.
pub fn reconcile(
    keys: &[ProductKey],
    summary: &BulkWriteSummary,
    ids_by_key: &HashMap<ProductKey, ProductId>,
) -> BulkResult {
    let mut result = BulkResult::default();
    for (idx, key) in keys.iter().enumerate() {
        let persisted = ids_by_key.get(key).copied();
        let id = if let Some(&inserted_id) = summary.upserted.get(&idx) {
            result.created += 1;
            Some(persisted.unwrap_or(inserted_id))
        } else if persisted.is_some() {
            result.updated += 1;
            persisted
        } else {
            None
        };
        result.product_ids.extend(id);
    }
    result
}

fn store_failure(operation: &'static str) -> impl FnOnce(anyhow::Error) -> CatalogError {
    move |err| {
        tracing::error!(operation, error = %format!("{:#}", err), "store operation failed");
        CatalogError::Internal(err.context(format!("{} failed", operation)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> ProductKey {
        ProductKey::new(name, "watch")
    }

    #[test]
    fn reconcile_splits_created_and_updated() {
        let keys = vec![key("a"), key("b"), key("c")];
        let summary = BulkWriteSummary {
            upserted: HashMap::from([(1, 11)]),
            matched: 2,
        };
        let ids = HashMap::from([(key("a"), 10), (key("b"), 11), (key("c"), 12)]);

        let result = reconcile(&keys, &summary, &ids);
        assert_eq!(result.created, 1);
        assert_eq!(result.updated, 2);
        assert_eq!(result.product_ids, vec![10, 11, 12]);
    }

    #[test]
    fn duplicate_keys_share_one_id() {
        let keys = vec![key("a"), key("a")];
        let summary = BulkWriteSummary {
            upserted: HashMap::from([(0, 7)]),
            matched: 1,
        };
        let ids = HashMap::from([(key("a"), 7)]);

        let result = reconcile(&keys, &summary, &ids);
        assert_eq!((result.created, result.updated), (1, 1));
        assert_eq!(result.product_ids, vec![7, 7]);
    }

    #[test]
    fn vanished_keys_are_skipped() {
        let keys = vec![key("a"), key("gone")];
        let summary = BulkWriteSummary {
            upserted: HashMap::new(),
            matched: 2,
        };
        let ids = HashMap::from([(key("a"), 3)]);

        let result = reconcile(&keys, &summary, &ids);
        assert_eq!((result.created, result.updated), (0, 1));
        assert_eq!(result.product_ids, vec![3]);
    }
}
