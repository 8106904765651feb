//! `storefront-core`: shared domain building blocks.
//!
//! Identifiers, the domain and storage error models, and the small traits the
//! catalog and order crates build on. No infrastructure concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod storage;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, OrderId, ProductId, UserId};
pub use storage::{StorageError, StorageResult};
pub use value_object::ValueObject;
