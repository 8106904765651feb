//! Inventory domain module: the product/category catalog.
//!
//! Entities enforce their own invariants; persistence goes through the
//! repository ports in [`repository`], implemented by `storefront-infra`.

pub mod category;
pub mod product;
pub mod repository;

pub use category::{Category, StoredCategory};
pub use product::{Product, ProductDetails, StoredProduct};
pub use repository::{CategoryRepository, ProductFilter, ProductRepository, StockChange};
