//! Infrastructure layer: Postgres and in-memory repository adapters, database
//! configuration and connection wiring.

pub mod config;
pub mod db;
pub mod in_memory;
pub mod postgres;

pub use config::{ConfigError, DatabaseConfig};
pub use in_memory::{InMemoryCategoryRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use postgres::{PgCategoryRepository, PgOrderRepository, PgProductRepository};
