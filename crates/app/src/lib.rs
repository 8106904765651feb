//! Use-case layer: catalog and order services, pagination policy and process
//! bootstrap.

pub mod bootstrap;
pub mod catalog;
pub mod error;
pub mod orders;
pub mod pagination;

pub use bootstrap::Storefront;
pub use catalog::{CategoryService, ProductService};
pub use error::{ServiceError, ServiceResult};
pub use orders::OrderService;
pub use pagination::{DEFAULT_LIMIT, MAX_LIMIT, Page, Pagination};
