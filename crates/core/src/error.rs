//! Domain error model.

use thiserror::Error;

use crate::id::{CategoryId, OrderId, ProductId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, missing entities). Storage failures are `StorageError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("price must be greater than or equal to 0")]
    InvalidPrice,

    #[error("stock must be greater than or equal to 0")]
    InvalidStock,

    /// A stock decrement would have driven stock below zero.
    #[error("insufficient stock: {available} available, change of {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A request value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound(_) | Self::CategoryNotFound(_) | Self::OrderNotFound(_)
        )
    }

    /// Validation failures: the request is rejected unchanged and must not be retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrice | Self::InvalidStock | Self::Validation(_) | Self::InvalidId(_)
        )
    }
}
