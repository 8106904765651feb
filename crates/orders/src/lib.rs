//! Orders domain module.
//!
//! An [`Order`] owns its line items exclusively; the pair is persisted as one
//! consistency unit through [`OrderRepository`].

pub mod order;
pub mod repository;

pub use order::{Order, OrderedProduct};
pub use repository::OrderRepository;
