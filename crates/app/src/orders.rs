//! Order use cases.

use tracing::{info, instrument};

use storefront_core::{DomainError, Entity, OrderId, UserId};
use storefront_orders::{Order, OrderRepository};

use crate::error::ServiceResult;

/// Order use cases over any [`OrderRepository`]. `status` is passed through
/// unchanged; the total is never recomputed.
#[derive(Debug, Clone)]
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id), err)]
    pub async fn create_order(&self, order: &Order) -> ServiceResult<Order> {
        let created = self.repo.create_order(order).await?;
        info!(order_id = ?created.id(), lines = created.products.len(), "order created");
        Ok(created)
    }

    pub async fn get_order(&self, id: OrderId) -> ServiceResult<Order> {
        self.repo
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(id).into())
    }

    /// Overwrite the order and replace its line items wholesale.
    #[instrument(skip(self, order), fields(order_id = %id), err)]
    pub async fn update_order(&self, id: OrderId, order: &Order) -> ServiceResult<Order> {
        let updated = self
            .repo
            .update_order(id, order)
            .await?
            .ok_or(DomainError::OrderNotFound(id))?;
        info!(status = %updated.status, "order updated");
        Ok(updated)
    }

    pub async fn list_orders_by_user(&self, user_id: UserId) -> ServiceResult<Vec<Order>> {
        Ok(self.repo.list_orders_by_user(user_id).await?)
    }
}
