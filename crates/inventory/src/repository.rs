//! Catalog repository ports.
//!
//! These traits make no storage assumptions: Postgres and in-memory adapters in
//! `storefront-infra` implement them with the same contract.
//!
//! ## Absence vs failure
//!
//! A missing (or soft-deleted) entity is reported through the return value:
//! `None` from `get_by_id`/`update`, `false` from `delete`. `StorageError` is
//! reserved for the store itself failing, so callers can always tell the two
//! apart.
//!
//! ## Soft deletion
//!
//! `delete` flips the row's `is_deleted` flag. Reads (`get_by_id`, `list`) and
//! writes (`update`, `delete`, `apply_stock_delta`) ignore flagged rows
//! unconditionally; no operation brings them back.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{CategoryId, ProductId, StorageResult};

use crate::category::Category;
use crate::product::Product;

/// Filter criteria for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Restrict to one category (optional).
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    pub fn by_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
        }
    }
}

/// Outcome of an atomic stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockChange {
    /// The delta was applied; carries the product as now stored.
    Applied(Product),
    /// Applying the delta would have driven stock negative. Nothing changed.
    /// `available` is the stock the check was evaluated against.
    Insufficient { available: i64 },
    /// The new stock would not fit the stock column. Nothing changed.
    OutOfRange { available: i64 },
    /// No live product with that id.
    Missing,
}

/// Persistence port for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product and return it with its generated id.
    async fn create(&self, product: &Product) -> StorageResult<Product>;

    async fn get_by_id(&self, id: ProductId) -> StorageResult<Option<Product>>;

    /// Live products, newest-created first (ties broken by id, descending).
    async fn list(
        &self,
        filter: ProductFilter,
        offset: i64,
        limit: i64,
    ) -> StorageResult<Vec<Product>>;

    /// Overwrite a persisted product. `None` if it is absent or soft-deleted
    /// (including products that were never persisted).
    async fn update(&self, product: &Product) -> StorageResult<Option<Product>>;

    /// Soft delete. `false` if the product is absent or already deleted.
    async fn delete(&self, id: ProductId) -> StorageResult<bool>;

    /// Add `delta` to the stored stock only if the result stays non-negative.
    ///
    /// Implementations must evaluate the check and the write as one atomic step
    /// with respect to concurrent adjustments of the same product, and report
    /// the outcome from that same step: callers rely on `Insufficient` meaning
    /// the stock at the moment of the write was too low.
    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> StorageResult<StockChange>;
}

/// Persistence port for categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category and return it with its generated id.
    async fn create(&self, category: &Category) -> StorageResult<Category>;

    async fn get_by_id(&self, id: CategoryId) -> StorageResult<Option<Category>>;

    /// Live categories, newest-created first (ties broken by id, descending).
    async fn list(&self, offset: i64, limit: i64) -> StorageResult<Vec<Category>>;

    /// `None` if the category is absent or soft-deleted.
    async fn update(&self, category: &Category) -> StorageResult<Option<Category>>;

    /// Soft delete. `false` if the category is absent or already deleted.
    async fn delete(&self, id: CategoryId) -> StorageResult<bool>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn create(&self, product: &Product) -> StorageResult<Product> {
        (**self).create(product).await
    }

    async fn get_by_id(&self, id: ProductId) -> StorageResult<Option<Product>> {
        (**self).get_by_id(id).await
    }

    async fn list(
        &self,
        filter: ProductFilter,
        offset: i64,
        limit: i64,
    ) -> StorageResult<Vec<Product>> {
        (**self).list(filter, offset, limit).await
    }

    async fn update(&self, product: &Product) -> StorageResult<Option<Product>> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> StorageResult<bool> {
        (**self).delete(id).await
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> StorageResult<StockChange> {
        (**self).apply_stock_delta(id, delta).await
    }
}

#[async_trait]
impl<R> CategoryRepository for Arc<R>
where
    R: CategoryRepository + ?Sized,
{
    async fn create(&self, category: &Category) -> StorageResult<Category> {
        (**self).create(category).await
    }

    async fn get_by_id(&self, id: CategoryId) -> StorageResult<Option<Category>> {
        (**self).get_by_id(id).await
    }

    async fn list(&self, offset: i64, limit: i64) -> StorageResult<Vec<Category>> {
        (**self).list(offset, limit).await
    }

    async fn update(&self, category: &Category) -> StorageResult<Option<Category>> {
        (**self).update(category).await
    }

    async fn delete(&self, id: CategoryId) -> StorageResult<bool> {
        (**self).delete(id).await
    }
}
