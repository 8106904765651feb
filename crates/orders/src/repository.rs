//! Order repository port.
//!
//! An order and its line items form one aggregate. Implementations must make
//! every write all-or-nothing:
//!
//! - `create_order`: the order row and all of its line items become visible
//!   together, or nothing does.
//! - `update_order`: the order row is overwritten and the previous line items
//!   are replaced wholesale (delete-all, insert-all), again as one unit.
//!
//! Readers must never observe a partially inserted order or a half-replaced
//! line-item set.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{OrderId, StorageResult, UserId};

use crate::order::Order;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with its line items and return it with its generated id.
    async fn create_order(&self, order: &Order) -> StorageResult<Order>;

    /// Load an order with all its line items. `None` if there is no such order.
    async fn get_order(&self, id: OrderId) -> StorageResult<Option<Order>>;

    /// Overwrite the order row and replace its line items. `None` if there is
    /// no such order, in which case nothing is written.
    async fn update_order(&self, id: OrderId, order: &Order) -> StorageResult<Option<Order>>;

    /// Every order of the user, each with its line items, fully materialised.
    async fn list_orders_by_user(&self, user_id: UserId) -> StorageResult<Vec<Order>>;
}

#[async_trait]
impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    async fn create_order(&self, order: &Order) -> StorageResult<Order> {
        (**self).create_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        (**self).get_order(id).await
    }

    async fn update_order(&self, id: OrderId, order: &Order) -> StorageResult<Option<Order>> {
        (**self).update_order(id, order).await
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> StorageResult<Vec<Order>> {
        (**self).list_orders_by_user(user_id).await
    }
}
