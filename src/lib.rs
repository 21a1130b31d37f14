pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::CatalogService;
pub use domain::product::{BulkResult, Product, ProductId, ProductKey};
pub use domain::search::{normalize, PriceRange, SearchFilter, TermsInput};
pub use error::{CatalogError, CatalogResult};
pub use infra::config::AppConfig;
pub use storage::{MemoryProductStore, PostgresProductStore, ProductStore};
