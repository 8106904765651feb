use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_core::{CategoryId, Entity, ProductId, StorageError, StorageResult};
use storefront_inventory::{
    Category, CategoryRepository, Product, ProductFilter, ProductRepository, StockChange,
    StoredCategory, StoredProduct,
};

use super::{poisoned, window};

#[derive(Debug, Default)]
struct ProductTable {
    last_id: i64,
    rows: HashMap<ProductId, StoredProduct>,
}

impl ProductTable {
    fn live(&self, id: ProductId) -> Option<&StoredProduct> {
        self.rows.get(&id).filter(|row| !row.is_deleted)
    }

    fn live_mut(&mut self, id: ProductId) -> Option<&mut StoredProduct> {
        self.rows.get_mut(&id).filter(|row| !row.is_deleted)
    }
}

fn rehydrate(row: &StoredProduct) -> StorageResult<Product> {
    Product::rehydrate(row.clone()).map_err(|e| {
        StorageError::Corrupt(format!("product {} violates its invariant: {e}", row.id))
    })
}

/// In-memory product repository.
///
/// Every operation holds the table lock for its whole duration, which makes
/// `apply_stock_delta` a single read-modify-write step.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<ProductTable>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> StorageResult<Product> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.last_id += 1;
        let id = ProductId::new(table.last_id);

        let row = product.to_stored(id);
        let created = rehydrate(&row)?;
        table.rows.insert(id, row);
        Ok(created)
    }

    async fn get_by_id(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let table = self.table.read().map_err(poisoned)?;
        table.live(id).map(rehydrate).transpose()
    }

    async fn list(
        &self,
        filter: ProductFilter,
        offset: i64,
        limit: i64,
    ) -> StorageResult<Vec<Product>> {
        let table = self.table.read().map_err(poisoned)?;

        let mut rows: Vec<&StoredProduct> = table
            .rows
            .values()
            .filter(|row| !row.is_deleted)
            .filter(|row| filter.category_id.is_none_or(|c| row.category_id == c))
            .collect();
        rows.sort_by_key(|row| Reverse((row.created_at, row.id)));

        window(rows, offset, limit).into_iter().map(rehydrate).collect()
    }

    async fn update(&self, product: &Product) -> StorageResult<Option<Product>> {
        let Some(id) = product.id() else {
            return Ok(None);
        };

        let mut table = self.table.write().map_err(poisoned)?;
        let Some(row) = table.live_mut(id) else {
            return Ok(None);
        };

        let mut replacement = product.to_stored(id);
        replacement.created_at = row.created_at;
        replacement.is_deleted = false;

        let updated = rehydrate(&replacement)?;
        *row = replacement;
        Ok(Some(updated))
    }

    async fn delete(&self, id: ProductId) -> StorageResult<bool> {
        let mut table = self.table.write().map_err(poisoned)?;
        match table.live_mut(id) {
            Some(row) => {
                row.is_deleted = true;
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> StorageResult<StockChange> {
        let mut table = self.table.write().map_err(poisoned)?;
        let Some(row) = table.live_mut(id) else {
            return Ok(StockChange::Missing);
        };

        let Some(new_stock) = row.stock.checked_add(delta) else {
            return Ok(StockChange::OutOfRange {
                available: row.stock,
            });
        };
        if new_stock < 0 {
            return Ok(StockChange::Insufficient {
                available: row.stock,
            });
        }

        row.stock = new_stock;
        row.updated_at = Utc::now();
        Ok(StockChange::Applied(rehydrate(row)?))
    }
}

#[derive(Debug, Clone)]
struct CategoryRecord {
    row: StoredCategory,
    is_deleted: bool,
}

#[derive(Debug, Default)]
struct CategoryTable {
    last_id: i64,
    rows: HashMap<CategoryId, CategoryRecord>,
}

impl CategoryTable {
    fn live_mut(&mut self, id: CategoryId) -> Option<&mut CategoryRecord> {
        self.rows.get_mut(&id).filter(|record| !record.is_deleted)
    }
}

/// In-memory category repository.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    table: RwLock<CategoryTable>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: &Category) -> StorageResult<Category> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.last_id += 1;
        let id = CategoryId::new(table.last_id);

        let row = category.to_stored(id);
        table.rows.insert(
            id,
            CategoryRecord {
                row: row.clone(),
                is_deleted: false,
            },
        );
        Ok(Category::rehydrate(row))
    }

    async fn get_by_id(&self, id: CategoryId) -> StorageResult<Option<Category>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .rows
            .get(&id)
            .filter(|record| !record.is_deleted)
            .map(|record| Category::rehydrate(record.row.clone())))
    }

    async fn list(&self, offset: i64, limit: i64) -> StorageResult<Vec<Category>> {
        let table = self.table.read().map_err(poisoned)?;

        let mut rows: Vec<&StoredCategory> = table
            .rows
            .values()
            .filter(|record| !record.is_deleted)
            .map(|record| &record.row)
            .collect();
        rows.sort_by_key(|row| Reverse((row.created_at, row.id)));

        Ok(window(rows, offset, limit)
            .into_iter()
            .map(|row| Category::rehydrate(row.clone()))
            .collect())
    }

    async fn update(&self, category: &Category) -> StorageResult<Option<Category>> {
        let Some(id) = category.id() else {
            return Ok(None);
        };

        let mut table = self.table.write().map_err(poisoned)?;
        let Some(record) = table.live_mut(id) else {
            return Ok(None);
        };

        let mut replacement = category.to_stored(id);
        replacement.created_at = record.row.created_at;
        record.row = replacement.clone();
        Ok(Some(Category::rehydrate(replacement)))
    }

    async fn delete(&self, id: CategoryId) -> StorageResult<bool> {
        let mut table = self.table.write().map_err(poisoned)?;
        match table.live_mut(id) {
            Some(record) => {
                record.is_deleted = true;
                record.row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
