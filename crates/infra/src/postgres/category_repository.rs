//! Postgres adapter for [`CategoryRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use storefront_core::{CategoryId, Entity, StorageResult};
use storefront_inventory::{Category, CategoryRepository, StoredCategory};

use super::map_sqlx_error;

/// Postgres-backed category repository. The `is_deleted` flag exists only in
/// the table; rows carrying it are never read back.
#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: Arc<PgPool>,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[instrument(skip(self, category), fields(name = %category.name()), err)]
    async fn create(&self, category: &Category) -> StorageResult<Category> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(category.name())
        .bind(category.description())
        .bind(category.created_at())
        .bind(category.updated_at())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_category", e))?;

        decode_category(&row)
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn get_by_id(&self, id: CategoryId) -> StorageResult<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_category", e))?;

        row.as_ref().map(decode_category).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, offset: i64, limit: i64) -> StorageResult<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE is_deleted = FALSE
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter().map(decode_category).collect()
    }

    #[instrument(skip(self, category), fields(category_id = ?category.id()), err)]
    async fn update(&self, category: &Category) -> StorageResult<Option<Category>> {
        let Some(id) = category.id() else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(category.name())
        .bind(category.description())
        .bind(category.updated_at())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?;

        row.as_ref().map(decode_category).transpose()
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&self, id: CategoryId) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_category", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CategoryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<CategoryRow> for StoredCategory {
    fn from(row: CategoryRow) -> Self {
        StoredCategory {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_category(row: &sqlx::postgres::PgRow) -> StorageResult<Category> {
    let row = CategoryRow::from_row(row).map_err(|e| map_sqlx_error("decode_category", e))?;
    Ok(Category::rehydrate(row.into()))
}
