use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_core::{OrderId, StorageResult, UserId};
use storefront_orders::{Order, OrderRepository};

use super::poisoned;

#[derive(Debug, Default)]
struct OrderTable {
    last_id: i64,
    rows: BTreeMap<OrderId, Order>,
}

/// In-memory order repository.
///
/// An order is stored together with its line items as one value, and every
/// write swaps that value under a single lock guard, so readers only ever see
/// complete orders.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    table: RwLock<OrderTable>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &Order) -> StorageResult<Order> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.last_id += 1;
        let id = OrderId::new(table.last_id);

        let stored = order.clone().with_id(id);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn update_order(&self, id: OrderId, order: &Order) -> StorageResult<Option<Order>> {
        let mut table = self.table.write().map_err(poisoned)?;
        let Some(slot) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        *slot = order.clone().with_id(id);
        Ok(Some(slot.clone()))
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> StorageResult<Vec<Order>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .rows
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use storefront_core::{Entity, ProductId};
    use storefront_orders::OrderedProduct;

    fn line(product: i64, quantity: i32) -> OrderedProduct {
        OrderedProduct::new(ProductId::new(product), quantity)
    }

    fn order(user: i64, lines: Vec<OrderedProduct>) -> Order {
        Order::new(UserId::new(user), lines, Decimal::new(5997, 2), "pending", "x")
    }

    #[tokio::test]
    async fn create_then_get_returns_every_line() {
        let repo = InMemoryOrderRepository::new();
        let created = repo
            .create_order(&order(1, vec![line(10, 2), line(11, 1)]))
            .await
            .unwrap();
        let id = created.id().unwrap();

        let loaded = repo.get_order(id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.line_items(), &[line(10, 2), line(11, 1)]);
    }

    #[tokio::test]
    async fn update_replaces_lines_wholesale() {
        let repo = InMemoryOrderRepository::new();
        let id = repo
            .create_order(&order(1, vec![line(10, 2), line(11, 1)]))
            .await
            .unwrap()
            .id()
            .unwrap();

        let mut changed = order(1, vec![line(12, 5)]);
        changed.status = "shipped".to_string();
        let updated = repo.update_order(id, &changed).await.unwrap().unwrap();

        assert_eq!(updated.id(), Some(id));
        let loaded = repo.get_order(id).await.unwrap().unwrap();
        assert_eq!(loaded.line_items(), &[line(12, 5)]);
        assert_eq!(loaded.status, "shipped");
    }

    #[tokio::test]
    async fn update_of_unknown_order_writes_nothing() {
        let repo = InMemoryOrderRepository::new();
        let result = repo
            .update_order(OrderId::new(42), &order(1, vec![line(1, 1)]))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(repo.get_order(OrderId::new(42)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_by_user_only_returns_that_users_orders() {
        let repo = InMemoryOrderRepository::new();
        repo.create_order(&order(1, vec![line(1, 1)])).await.unwrap();
        repo.create_order(&order(2, vec![line(2, 1)])).await.unwrap();
        repo.create_order(&order(1, vec![])).await.unwrap();

        let mine = repo.list_orders_by_user(UserId::new(1)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == UserId::new(1)));
        assert!(mine[1].line_items().is_empty());

        assert!(
            repo.list_orders_by_user(UserId::new(3))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_half_replaced_lines() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let before = vec![line(1, 1), line(2, 2)];
        let after = vec![line(3, 3), line(4, 4), line(5, 5)];
        let id = repo
            .create_order(&order(1, before.clone()))
            .await
            .unwrap()
            .id()
            .unwrap();

        let writer = {
            let repo = Arc::clone(&repo);
            let (before, after) = (before.clone(), after.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let lines = if i % 2 == 0 { after.clone() } else { before.clone() };
                    repo.update_order(id, &order(1, lines)).await.unwrap();
                }
            })
        };

        for _ in 0..200 {
            let seen = repo.get_order(id).await.unwrap().unwrap();
            assert!(seen.has_same_line_items(&before) || seen.has_same_line_items(&after));
        }
        writer.await.unwrap();
    }
}
