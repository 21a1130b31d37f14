//! Runs the catalog service against a real PostgreSQL database.
//!
//! Requires `DATABASE_URL`; the test returns early when it is not set. Each run uses a unique
//! category so repeated runs against the same database do not interfere.

use product_catalog::{
    normalize, AppConfig, CatalogError, CatalogService, PostgresProductStore, PriceRange, Product,
    ProductStore, TermsInput,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn product(name: &str, category: &str, price: f64, popularity: f64) -> Product {
    Product {
        id: None,
        name: name.to_string(),
        category: category.to_string(),
        brand: "titan".to_string(),
        price,
        description: format!("{} (100% steel_case)", name),
        images: vec!["https://img.example.com/1.png".to_string()],
        inventory: 5,
        popularity,
    }
}

fn unique_category(prefix: &str) -> Result<String, Box<dyn std::error::Error>> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(format!("{}-{}", prefix, nanos))
}

/// A small pool with a short acquire timeout, so unbounded fan-out would time out.
async fn narrow_store() -> Result<Option<PostgresProductStore>, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
            return Ok(None);
        }
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_millis(250))
        .connect(&url)
        .await?;
    let store = PostgresProductStore::from_pool(pool);
    store.ensure_schema().await?;
    Ok(Some(store))
}

async fn category_count(url: &str, category: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new().max_connections(1).connect(url).await?;
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category = $1")
        .bind(category)
        .fetch_one(&pool)
        .await?;
    pool.close().await;
    Ok(n)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_much_larger_than_pool() -> Result<(), Box<dyn std::error::Error>> {
    let Some(store) = narrow_store().await? else {
        return Ok(());
    };
    let category = unique_category("strap")?;
    let batch: Vec<Product> = (0..3000)
        .map(|i| product(&format!("Band {}", i), &category, 99.0, i as f64))
        .collect();

    let summary = store.bulk_upsert_by_key(&batch).await?;
    assert_eq!(summary.upserted.len(), 3000);
    assert_eq!(summary.matched, 0);

    let again = store.bulk_upsert_by_key(&batch).await?;
    assert!(again.upserted.is_empty());
    assert_eq!(again.matched, 3000);

    store.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_waits_for_dispatched_batch() -> Result<(), Box<dyn std::error::Error>> {
    let Some(store) = narrow_store().await? else {
        return Ok(());
    };
    let url = std::env::var("DATABASE_URL")?;
    let category = unique_category("dial")?;
    let batch: Vec<Product> = (0..500)
        .map(|i| product(&format!("Dial {}", i), &category, 499.0, 1.0))
        .collect();

    let writer = store.clone();
    let write = tokio::spawn(async move { writer.bulk_upsert_by_key(&batch).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.close().await;

    let summary = write.await??;
    assert_eq!(summary.upserted.len(), 500);
    assert_eq!(category_count(&url, &category).await?, 500);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_upsert_and_search() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let store = PostgresProductStore::connect(&config.database).await?;
    store.ensure_schema().await?;
    store.ping().await?;

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let category = format!("watch-{}", nanos);
    let svc = CatalogService::new(Arc::new(store.clone()));

    // --- First submission creates ---
    let batch = vec![
        product("Titan Edge 1", &category, 12999.0, 4.5),
        product("Titan Raga", &category, 9999.0, 4.8),
        product("Titan Edge 1", &category, 12999.0, 4.5),
    ];
    let first = svc.bulk_upsert(&batch).await?;
    assert_eq!(first.product_ids.len(), 3);
    assert_eq!(first.product_ids[0], first.product_ids[2]);
    assert_eq!(first.created + first.updated, 3);
    assert_eq!(first.created, 2);

    // --- Second submission updates, identifiers unchanged ---
    let second = svc.bulk_upsert(&batch[..2]).await?;
    assert_eq!((second.created, second.updated), (0, 2));
    assert_eq!(second.product_ids, first.product_ids[..2].to_vec());

    // --- Search: price range, text (wildcards are literal), ordering ---
    let filter = normalize(
        TermsInput::Single(category.clone()),
        TermsInput::Absent,
        Some(PriceRange {
            min: 10000.0,
            max: 20000.0,
        }),
        String::new(),
    );
    let hits = svc.search(&filter).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Titan Edge 1");

    let filter = normalize(
        TermsInput::List(vec![category.clone()]),
        TermsInput::Single("titan".to_string()),
        None,
        "100% STEEL_".to_string(),
    );
    let hits = svc.search(&filter).await?;
    let names: Vec<&str> = hits.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Titan Raga", "Titan Edge 1"]);

    let filter = normalize(
        TermsInput::Single(category.clone()),
        TermsInput::Absent,
        None,
        "10_% steel".to_string(),
    );
    assert!(matches!(
        svc.search(&filter).await,
        Err(CatalogError::NotFound(_))
    ));

    let fetched = svc.get_product(first.product_ids[1]).await?;
    assert_eq!(fetched.name, "Titan Raga");

    store.close().await;
    Ok(())
}
