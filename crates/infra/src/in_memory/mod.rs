//! In-memory repository adapters.
//!
//! Intended for tests/dev. They honour the same contract as the Postgres
//! adapters (soft deletion, atomic stock changes, all-or-nothing order writes)
//! so use cases can be exercised without a database.

mod catalog;
mod orders;

pub use catalog::{InMemoryCategoryRepository, InMemoryProductRepository};
pub use orders::InMemoryOrderRepository;

use std::sync::PoisonError;

use storefront_core::StorageError;

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Unavailable("in-memory store lock poisoned".to_string())
}

/// Window of `items` selected by `offset`/`limit`. Negative values select nothing
/// beyond what a zero would.
fn window<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}
