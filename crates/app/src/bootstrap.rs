//! Wiring of the Postgres adapters into the use-case services.

use storefront_core::StorageResult;
use storefront_infra::{
    DatabaseConfig, PgCategoryRepository, PgOrderRepository, PgProductRepository, db,
};

use crate::catalog::{CategoryService, ProductService};
use crate::orders::OrderService;

/// The three services over one shared connection pool.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub products: ProductService<PgProductRepository>,
    pub categories: CategoryService<PgCategoryRepository>,
    pub orders: OrderService<PgOrderRepository>,
}

impl Storefront {
    /// Open the pool, bring the schema up to date and wire the services.
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let pool = db::connect(config).await?;
        db::migrate(&pool).await?;

        Ok(Self {
            products: ProductService::new(PgProductRepository::new(pool.clone())),
            categories: CategoryService::new(PgCategoryRepository::new(pool.clone())),
            orders: OrderService::new(PgOrderRepository::new(pool)),
        })
    }
}
