use thiserror::Error;

use storefront_core::{DomainError, StorageError};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a use case: either a business rule or the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    /// Store failures a caller may retry with backoff. Nothing here retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ProductId;

    #[test]
    fn classification() {
        let not_found = ServiceError::from(DomainError::ProductNotFound(ProductId::new(1)));
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());

        let busy = ServiceError::from(StorageError::Unavailable("pool".into()));
        assert!(busy.is_retryable());
        assert!(!busy.is_not_found());

        let constraint = ServiceError::from(StorageError::Constraint("check".into()));
        assert!(!constraint.is_retryable());
    }

    #[test]
    fn messages_pass_through() {
        let err = ServiceError::from(DomainError::InvalidPrice);
        assert_eq!(err.to_string(), DomainError::InvalidPrice.to_string());
    }
}
