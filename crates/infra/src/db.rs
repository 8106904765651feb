//! Connection pool construction and schema migration.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use storefront_core::{StorageError, StorageResult};

use crate::config::DatabaseConfig;
use crate::postgres::map_sqlx_error;

const SCHEMA: &str = include_str!("../migrations/0001_storefront.sql");

/// Open a connection pool shared by all repositories.
#[instrument(skip(config), fields(max_connections = config.max_connections), err)]
pub async fn connect(config: &DatabaseConfig) -> StorageResult<PgPool> {
    let options = config
        .connect_options()
        .map_err(|e| StorageError::Backend(e.to_string()))?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Apply the embedded schema. Idempotent.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> StorageResult<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    tracing::info!("schema is up to date");
    Ok(())
}
