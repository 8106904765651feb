use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, OrderId, ProductId, UserId, ValueObject};

/// Order line: product and quantity.
///
/// Neither field is checked here: the product belongs to another service and
/// no lower bound on quantity has been agreed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl OrderedProduct {
    pub fn new(product_id: ProductId, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

impl ValueObject for OrderedProduct {}

/// Aggregate root: Order.
///
/// A plain record. `total_amount` is supplied by the caller and is never
/// recomputed from the lines; `status` is passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by the store on first persist; read it through [`Entity::id`].
    id: Option<OrderId>,
    pub user_id: UserId,
    /// Kept in the order given; display order survives persistence.
    pub products: Vec<OrderedProduct>,
    pub total_amount: Decimal,
    pub status: String,
    pub delivery_address: String,
}

impl Order {
    pub fn new(
        user_id: UserId,
        products: Vec<OrderedProduct>,
        total_amount: Decimal,
        status: impl Into<String>,
        delivery_address: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            products,
            total_amount,
            status: status.into(),
            delivery_address: delivery_address.into(),
        }
    }

    /// Attach the id the store generated for this order.
    ///
    /// For repository adapters only. Application code never picks an order's
    /// identity; it gets one back from `OrderRepository::create_order`.
    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn line_items(&self) -> &[OrderedProduct] {
        &self.products
    }

    /// Replace-set semantics: the previous lines are discarded, never merged.
    pub fn replace_line_items(&mut self, products: Vec<OrderedProduct>) {
        self.products = products;
    }

    /// Compare line items as a multiset, ignoring their order.
    pub fn has_same_line_items(&self, other: &[OrderedProduct]) -> bool {
        if self.products.len() != other.len() {
            return false;
        }
        let mut mine = self.products.clone();
        let mut theirs = other.to_vec();
        mine.sort_by_key(|l| (l.product_id, l.quantity));
        theirs.sort_by_key(|l| (l.product_id, l.quantity));
        mine == theirs
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn line(product: i64, quantity: i32) -> OrderedProduct {
        OrderedProduct::new(ProductId::new(product), quantity)
    }

    fn sample_order() -> Order {
        Order::new(
            UserId::new(1),
            vec![line(10, 2), line(11, 1)],
            Decimal::from_str("59.97").unwrap(),
            "pending",
            "x",
        )
    }

    #[test]
    fn new_order_is_not_persisted() {
        let order = sample_order();
        assert_eq!(order.id(), None);
        assert!(!order.is_persisted());
        assert_eq!(order.with_id(OrderId::new(3)).id(), Some(OrderId::new(3)));
    }

    #[test]
    fn line_items_compare_as_multiset() {
        let order = sample_order();
        assert!(order.has_same_line_items(&[line(11, 1), line(10, 2)]));
        assert!(!order.has_same_line_items(&[line(10, 2)]));
        assert!(!order.has_same_line_items(&[line(10, 2), line(11, 2)]));
    }

    #[test]
    fn replace_line_items_discards_previous_lines() {
        let mut order = sample_order();
        order.replace_line_items(vec![line(10, 5)]);
        assert_eq!(order.line_items(), &[line(10, 5)]);
    }

    #[test]
    fn status_is_passed_through_unchanged() {
        let mut order = sample_order();
        order.status = "awaiting-courier".to_string();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "awaiting-courier");
        assert_eq!(json["total_amount"], "59.97");
    }

    #[test]
    fn identity_survives_field_edits() {
        let mut order = sample_order().with_id(OrderId::new(7));
        order.status = "paid".to_string();
        order.replace_line_items(vec![]);
        assert_eq!(order.id(), Some(OrderId::new(7)));
    }
}
