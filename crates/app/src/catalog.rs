//! Catalog use cases: products and categories.

use tracing::{debug, info, instrument};

use storefront_core::{CategoryId, DomainError, Entity, ProductId};
use storefront_inventory::{
    Category, CategoryRepository, Product, ProductDetails, ProductFilter, ProductRepository,
    StockChange,
};

use crate::error::ServiceResult;
use crate::pagination::{Page, Pagination};

fn require_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

/// Product use cases over any [`ProductRepository`].
#[derive(Debug, Clone)]
pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, details), fields(name = %details.name), err)]
    pub async fn create_product(&self, details: ProductDetails) -> ServiceResult<Product> {
        require_name(&details.name)?;
        let product = Product::create(details)?;

        let created = self.repo.create(&product).await?;
        info!(product_id = ?created.id(), "product created");
        Ok(created)
    }

    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(id).into())
    }

    /// Live products, newest first, optionally restricted to one category.
    /// Category id `0` means "any category".
    pub async fn list_products(
        &self,
        category_id: Option<CategoryId>,
        page: i64,
        limit: i64,
    ) -> ServiceResult<Page<Product>> {
        let window = Pagination::from_page(page, limit);
        let filter = ProductFilter {
            category_id: category_id.filter(|c| c.get() != 0),
        };

        let items = self.repo.list(filter, window.offset, window.limit).await?;
        debug!(count = items.len(), offset = window.offset, "listed products");
        Ok(Page::new(items, window))
    }

    /// Full field replace; `details` is validated like a create.
    #[instrument(skip(self, details), fields(product_id = %id), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        details: ProductDetails,
    ) -> ServiceResult<Product> {
        require_name(&details.name)?;
        let mut product = self.get_product(id).await?;
        product.update(details)?;

        let updated = self
            .repo
            .update(&product)
            .await?
            .ok_or(DomainError::ProductNotFound(id))?;
        info!("product updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::ProductNotFound(id).into());
        }
        info!("product deleted");
        Ok(())
    }

    /// Apply a signed stock change.
    ///
    /// The store decides the outcome in one atomic step against its current
    /// stock; no earlier read is consulted, so a restock that lands first is
    /// always honoured and a rejection reports the stock actually checked.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn update_stock(&self, id: ProductId, delta: i64) -> ServiceResult<Product> {
        match self.repo.apply_stock_delta(id, delta).await? {
            StockChange::Applied(product) => {
                info!(delta, stock = product.stock(), "stock adjusted");
                Ok(product)
            }
            StockChange::Insufficient { available } => Err(DomainError::InsufficientStock {
                available,
                requested: delta,
            }
            .into()),
            StockChange::OutOfRange { .. } => Err(DomainError::InvalidStock.into()),
            StockChange::Missing => Err(DomainError::ProductNotFound(id).into()),
        }
    }
}

/// Category use cases over any [`CategoryRepository`].
#[derive(Debug, Clone)]
pub struct CategoryService<R> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, description), err)]
    pub async fn create_category(&self, name: &str, description: &str) -> ServiceResult<Category> {
        require_name(name)?;
        let created = self.repo.create(&Category::create(name, description)).await?;
        info!(category_id = ?created.id(), "category created");
        Ok(created)
    }

    pub async fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(id).into())
    }

    pub async fn list_categories(&self, page: i64, limit: i64) -> ServiceResult<Page<Category>> {
        let window = Pagination::from_page(page, limit);
        let items = self.repo.list(window.offset, window.limit).await?;
        Ok(Page::new(items, window))
    }

    #[instrument(skip(self, description), fields(category_id = %id), err)]
    pub async fn update_category(
        &self,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> ServiceResult<Category> {
        require_name(name)?;
        let mut category = self.get_category(id).await?;
        category.update(name, description);

        let updated = self
            .repo
            .update(&category)
            .await?
            .ok_or(DomainError::CategoryNotFound(id))?;
        info!("category updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    pub async fn delete_category(&self, id: CategoryId) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::CategoryNotFound(id).into());
        }
        info!("category deleted");
        Ok(())
    }
}
