//! Centralized configuration (environment variables + defaults).
//!
//! Built once at startup and handed to the components that need it.

use anyhow::{anyhow, Context};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub environment: String,
    pub log_filter: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the product store.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub idle_timeout: Duration,
    /// How long a caller waits for a pooled connection before failing.
    pub connection_timeout: Duration,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let database = DatabaseConfig {
            url,
            max_pool_size: parse_or(&lookup, "DB_MAX_POOL_SIZE", 10)?,
            min_pool_size: parse_or(&lookup, "DB_MIN_POOL_SIZE", 1)?,
            idle_timeout: Duration::from_secs(parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", 300)?),
            connection_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                5,
            )?),
        };
        if database.max_pool_size == 0 {
            return Err(anyhow!("DB_MAX_POOL_SIZE must be at least 1"));
        }
        if database.min_pool_size > database.max_pool_size {
            return Err(anyhow!(
                "DB_MIN_POOL_SIZE ({}) cannot exceed DB_MAX_POOL_SIZE ({})",
                database.min_pool_size,
                database.max_pool_size
            ));
        }

        Ok(Self {
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            server: ServerConfig {
                host: lookup("CATALOG_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or(&lookup, "CATALOG_PORT", DEFAULT_PORT)?,
            },
            database,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
