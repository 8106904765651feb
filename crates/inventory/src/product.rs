use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity, ProductId};

/// Caller-supplied product attributes, shared by create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    /// Not checked for existence at this layer.
    pub category_id: CategoryId,
}

impl ProductDetails {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: i64,
        category_id: CategoryId,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            stock,
            category_id,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        validate_price_and_stock(self.price, self.stock)
    }
}

/// A product row as persisted by a repository adapter.
///
/// Only adapters build these; they become a [`Product`] through
/// [`Product::rehydrate`], which re-checks the invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

/// Catalog product.
///
/// Invariant: `price >= 0` and `stock >= 0` after every successful mutation.
/// A rejected mutation leaves the product untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: Option<ProductId>,
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
    category_id: CategoryId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_deleted: bool,
}

fn validate_price_and_stock(price: Decimal, stock: i64) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::InvalidPrice);
    }
    if stock < 0 {
        return Err(DomainError::InvalidStock);
    }
    Ok(())
}

impl Product {
    /// Validating factory. The product has no id until a repository persists it.
    pub fn create(details: ProductDetails) -> DomainResult<Self> {
        details.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: None,
            name: details.name,
            description: details.description,
            price: details.price,
            stock: details.stock,
            category_id: details.category_id,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        })
    }

    /// Rebuild a persisted product, re-checking the invariants.
    pub fn rehydrate(stored: StoredProduct) -> DomainResult<Self> {
        validate_price_and_stock(stored.price, stored.stock)?;

        Ok(Self {
            id: Some(stored.id),
            name: stored.name,
            description: stored.description,
            price: stored.price,
            stock: stored.stock,
            category_id: stored.category_id,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            is_deleted: stored.is_deleted,
        })
    }

    /// Snapshot of this product as a row under the given identity.
    pub fn to_stored(&self, id: ProductId) -> StoredProduct {
        StoredProduct {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            category_id: self.category_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_deleted: self.is_deleted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Full field replace, validated exactly like [`Product::create`].
    pub fn update(&mut self, details: ProductDetails) -> DomainResult<()> {
        details.validate()?;

        self.name = details.name;
        self.description = details.description;
        self.price = details.price;
        self.stock = details.stock;
        self.category_id = details.category_id;
        self.touch();
        Ok(())
    }

    /// Apply a signed stock delta.
    ///
    /// Fails with `InsufficientStock` when the result would be negative; the
    /// stock is left unchanged in that case.
    pub fn adjust_stock(&mut self, delta: i64) -> DomainResult<()> {
        let Some(new_stock) = self.stock.checked_add(delta) else {
            return Err(DomainError::InvalidStock);
        };
        if new_stock < 0 {
            return Err(DomainError::InsufficientStock {
                available: self.stock,
                requested: delta,
            });
        }

        self.stock = new_stock;
        self.touch();
        Ok(())
    }

    /// Mark the product deleted. There is no way back.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }
}
