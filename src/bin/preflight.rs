use product_catalog::infra::telemetry;
use product_catalog::{AppConfig, PostgresProductStore, ProductStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--ensure-schema]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           CATALOG_HOST, CATALOG_PORT, APP_ENV, RUST_LOG,\n\
           DB_MAX_POOL_SIZE, DB_MIN_POOL_SIZE, DB_IDLE_TIMEOUT_SECS, DB_CONNECTION_TIMEOUT_SECS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let ensure_schema = args.iter().any(|a| a == "--ensure-schema");

    let config = AppConfig::from_env()?;
    telemetry::init_tracing(&config.log_filter)?;

    println!("> Preflight:");
    println!("  APP_ENV={}", config.environment);
    println!("  listen={}", config.listen_address());
    println!(
        "  pool: max={} min={} idle_timeout={:?} connection_timeout={:?}",
        config.database.max_pool_size,
        config.database.min_pool_size,
        config.database.idle_timeout,
        config.database.connection_timeout
    );

    let store = PostgresProductStore::connect(&config.database).await?;
    store.ping().await?;
    println!("  database: reachable");

    if ensure_schema {
        store.ensure_schema().await?;
        println!("  schema: ensured");
    }

    match store.count().await {
        Ok(n) => println!("  products: {}", n),
        Err(e) => {
            println!("  products: table missing or unreadable ({})", e);
            println!("  hint: rerun with --ensure-schema or start api_server once");
        }
    }

    store.close().await;
    println!("> Preflight OK");
    Ok(())
}
