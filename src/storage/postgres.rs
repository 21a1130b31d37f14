//! PostgreSQL-backed product store.
//!
//! Products live in a single `products` table; the natural key is enforced by a
//! `UNIQUE (name, category)` constraint so concurrent upserts of one key converge on one row.

use crate::domain::product::{Product, ProductId, ProductKey};
use crate::domain::search::SearchFilter;
use crate::infra::config::DatabaseConfig;
use crate::storage::{BulkWriteSummary, ProductStore};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

const PRODUCT_COLUMNS: &str =
    "id, name, category, brand, price, description, images, available_qty, popularity";

const CREATE_PRODUCTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS products (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    brand TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    images TEXT[] NOT NULL,
    available_qty BIGINT NOT NULL,
    popularity DOUBLE PRECISION NOT NULL,
    UNIQUE (name, category)
)";

const CREATE_POPULARITY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS products_popularity_idx ON products (popularity DESC)";

// `xmax = 0` only holds for a row version created by this statement's INSERT branch.
const UPSERT_PRODUCT: &str = "INSERT INTO products
        (name, category, brand, price, description, images, available_qty, popularity)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (name, category) DO UPDATE SET
        brand = EXCLUDED.brand,
        price = EXCLUDED.price,
        description = EXCLUDED.description,
        images = EXCLUDED.images,
        available_qty = EXCLUDED.available_qty,
        popularity = EXCLUDED.popularity
    RETURNING id, (xmax = 0) AS inserted";

#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
    /// One permit per pool connection; bulk items wait here rather than on the pool's
    /// acquire timeout.
    write_slots: Arc<Semaphore>,
    slot_count: u32,
}

impl PostgresProductStore {
    /// Opens the bounded connection pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_pool_size)
            .min_connections(config.min_pool_size)
            .idle_timeout(config.idle_timeout)
            .acquire_timeout(config.connection_timeout)
            .connect(&config.url)
            .await
            .context("failed to connect to the product database")?;
        tracing::info!(
            max = config.max_pool_size,
            min = config.min_pool_size,
            "product database pool ready"
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let slot_count = pool.options().get_max_connections().max(1);
        Self {
            pool,
            write_slots: Arc::new(Semaphore::new(slot_count as usize)),
            slot_count,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the products table and its indexes if they are missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_PRODUCTS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create products table")?;
        sqlx::query(CREATE_POPULARITY_INDEX)
            .execute(&self.pool)
            .await
            .context("failed to create popularity index")?;
        Ok(())
    }

    pub async fn count(&self) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Waits for every dispatched bulk item to finish, then closes the pool.
    ///
    /// The semaphore is fair, so this queues behind items that are already waiting for a slot.
    pub async fn close(&self) {
        match self.write_slots.acquire_many(self.slot_count).await {
            Ok(_drained) => self.write_slots.close(),
            Err(_) => tracing::debug!("product store already closed"),
        }
        self.pool.close().await;
    }
}

async fn upsert_one(pool: &PgPool, product: &Product) -> Result<(ProductId, bool), sqlx::Error> {
    let row = sqlx::query(UPSERT_PRODUCT)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.images)
        .bind(product.inventory)
        .bind(product.popularity)
        .fetch_one(pool)
        .await?;
    Ok((row.try_get("id")?, row.try_get("inserted")?))
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        brand: row.try_get("brand")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        images: row.try_get("images")?,
        inventory: row.try_get("available_qty")?,
        popularity: row.try_get("popularity")?,
    })
}

/// Escapes LIKE metacharacters so search text matches literally.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn bulk_upsert_by_key(&self, products: &[Product]) -> anyhow::Result<BulkWriteSummary> {
        // Spawned tasks keep running if the caller goes away, so a dispatched batch is never
        // cut short halfway. At most one item per pool connection is in flight.
        let handles: Vec<JoinHandle<anyhow::Result<(ProductId, bool)>>> = products
            .iter()
            .cloned()
            .map(|product| {
                let pool = self.pool.clone();
                let slots = Arc::clone(&self.write_slots);
                tokio::spawn(async move {
                    let _slot = slots
                        .acquire_owned()
                        .await
                        .context("product store is closed")?;
                    Ok(upsert_one(&pool, &product).await?)
                })
            })
            .collect();

        let mut summary = BulkWriteSummary::default();
        let mut first_error: Option<anyhow::Error> = None;
        for (idx, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(anyhow::Error::new(join_err)),
            };
            match result {
                Ok((id, true)) => {
                    summary.upserted.insert(idx, id);
                }
                Ok((_, false)) => summary.matched += 1,
                Err(e) => {
                    tracing::error!(index = idx, error = %e, "product upsert failed");
                    if first_error.is_none() {
                        first_error = Some(e.context(format!("upsert of item {} failed", idx)));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    async fn find_by_keys(&self, keys: &[ProductKey]) -> anyhow::Result<Vec<Product>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = keys.iter().map(|k| k.name.clone()).collect();
        let categories: Vec<String> = keys.iter().map(|k| k.category.clone()).collect();

        let sql = format!(
            "SELECT {} FROM products
             WHERE (name, category) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(&names)
            .bind(&categories)
            .fetch_all(&self.pool)
            .await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    async fn query_by_filter(&self, filter: &SearchFilter) -> anyhow::Result<Vec<Product>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM products WHERE TRUE", PRODUCT_COLUMNS));

        if !filter.categories.is_empty() {
            qb.push(" AND category = ANY(")
                .push_bind(filter.categories.clone())
                .push(")");
        }
        if !filter.brands.is_empty() {
            qb.push(" AND brand = ANY(")
                .push_bind(filter.brands.clone())
                .push(")");
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        if filter.has_text() {
            let pattern = like_pattern(&filter.search_text);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY popularity DESC LIMIT ")
            .push_bind(filter.limit as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    async fn find_by_id(&self, id: ProductId) -> anyhow::Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
