//! Postgres adapter for [`ProductRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use storefront_core::{CategoryId, Entity, ProductId, StorageError, StorageResult};
use storefront_inventory::{Product, ProductFilter, ProductRepository, StockChange, StoredProduct};

use super::map_sqlx_error;

/// Postgres-backed product repository.
///
/// ## Soft Deletion
///
/// Every statement carries `is_deleted = FALSE`, so flagged rows are invisible
/// to reads and immune to further writes.
///
/// ## Stock Adjustment
///
/// `apply_stock_delta` is one statement: it locks the row (`FOR UPDATE`),
/// applies the delta only if the result stays in range, and returns the stock
/// it checked against. Concurrent decrements can never oversell, and a
/// rejection always reports the stock seen under the lock.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: Arc<PgPool>,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, product), fields(name = %product.name()), err)]
    async fn create(&self, product: &Product) -> StorageResult<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (
                name,
                description,
                price,
                stock,
                category_id,
                created_at,
                updated_at,
                is_deleted
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, name, description, price, stock, category_id,
                created_at, updated_at, is_deleted
            "#,
        )
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock())
        .bind(product.category_id().get())
        .bind(product.created_at())
        .bind(product.updated_at())
        .bind(product.is_deleted())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;

        decode_product(&row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_by_id(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT
                id, name, description, price, stock, category_id,
                created_at, updated_at, is_deleted
            FROM products
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(decode_product).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(
        &self,
        filter: ProductFilter,
        offset: i64,
        limit: i64,
    ) -> StorageResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, description, price, stock, category_id,
                created_at, updated_at, is_deleted
            FROM products
            WHERE is_deleted = FALSE
                AND ($1::bigint IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.category_id.map(CategoryId::get))
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(decode_product).collect()
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id()), err)]
    async fn update(&self, product: &Product) -> StorageResult<Option<Product>> {
        let Some(id) = product.id() else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                stock = $5,
                category_id = $6,
                updated_at = $7
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING
                id, name, description, price, stock, category_id,
                created_at, updated_at, is_deleted
            "#,
        )
        .bind(id.get())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock())
        .bind(product.category_id().get())
        .bind(product.updated_at())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        row.as_ref().map(decode_product).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> StorageResult<StockChange> {
        let row = sqlx::query(
            r#"
            WITH target AS (
                SELECT id, stock
                FROM products
                WHERE id = $1 AND is_deleted = FALSE
                FOR UPDATE
            ),
            changed AS (
                UPDATE products p
                SET stock = p.stock + $2::bigint, updated_at = NOW()
                FROM target t
                WHERE p.id = t.id
                    AND t.stock::numeric + $2::bigint BETWEEN 0 AND 9223372036854775807
                RETURNING
                    p.id, p.name, p.description, p.price, p.stock, p.category_id,
                    p.created_at, p.updated_at, p.is_deleted
            )
            SELECT
                t.stock AS available,
                c.id, c.name, c.description, c.price, c.stock, c.category_id,
                c.created_at, c.updated_at, c.is_deleted
            FROM target t
            LEFT JOIN changed c ON c.id = t.id
            "#,
        )
        .bind(id.get())
        .bind(delta)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("apply_stock_delta", e))?;

        let Some(row) = row else {
            return Ok(StockChange::Missing);
        };

        let applied: Option<i64> = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("apply_stock_delta", e))?;
        if applied.is_some() {
            return Ok(StockChange::Applied(decode_product(&row)?));
        }

        // `available` was read under the same row lock the update would have used.
        let available: i64 = row
            .try_get("available")
            .map_err(|e| map_sqlx_error("apply_stock_delta", e))?;
        match available.checked_add(delta) {
            Some(new_stock) if new_stock < 0 => Ok(StockChange::Insufficient { available }),
            None => Ok(StockChange::OutOfRange { available }),
            Some(_) => Err(StorageError::Backend(format!(
                "stock change of {delta} on product {id} was neither applied nor rejected"
            ))),
        }
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_deleted: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            category_id: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }
}

impl From<ProductRow> for StoredProduct {
    fn from(row: ProductRow) -> Self {
        StoredProduct {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: CategoryId::new(row.category_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_deleted: row.is_deleted,
        }
    }
}

fn decode_product(row: &sqlx::postgres::PgRow) -> StorageResult<Product> {
    let stored: StoredProduct = ProductRow::from_row(row)
        .map_err(|e| map_sqlx_error("decode_product", e))?
        .into();
    let id = stored.id;
    Product::rehydrate(stored)
        .map_err(|e| StorageError::Corrupt(format!("product {id} violates its invariant: {e}")))
}
