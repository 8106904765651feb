//! End-to-end use-case scenarios against the in-memory adapters.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use storefront_app::{OrderService, ProductService, ServiceError};
use storefront_core::{CategoryId, DomainError, Entity, ProductId, UserId};
use storefront_infra::{InMemoryOrderRepository, InMemoryProductRepository};
use storefront_inventory::ProductDetails;
use storefront_orders::{Order, OrderedProduct};

fn line(product: i64, quantity: i32) -> OrderedProduct {
    OrderedProduct::new(ProductId::new(product), quantity)
}

#[tokio::test]
async fn stock_is_never_oversold() {
    let products = ProductService::new(Arc::new(InMemoryProductRepository::new()));
    let widget = products
        .create_product(ProductDetails::new(
            "Widget",
            "desc",
            Decimal::from_str("9.99").unwrap(),
            5,
            CategoryId::new(1),
        ))
        .await
        .unwrap();
    assert_eq!(widget.stock(), 5);
    let id = widget.id().unwrap();

    assert_eq!(products.update_stock(id, -3).await.unwrap().stock(), 2);

    let err = products.update_stock(id, -3).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InsufficientStock { available: 2, .. })
    ));
    assert_eq!(products.get_product(id).await.unwrap().stock(), 2);
}

#[tokio::test]
async fn order_lines_survive_create_and_update() {
    let orders = OrderService::new(Arc::new(InMemoryOrderRepository::new()));
    let total = Decimal::from_str("59.97").unwrap();

    let created = orders
        .create_order(&Order::new(
            UserId::new(1),
            vec![line(10, 2), line(11, 1)],
            total,
            "pending",
            "x",
        ))
        .await
        .unwrap();
    let id = created.id().unwrap();

    let loaded = orders.get_order(id).await.unwrap();
    assert!(loaded.has_same_line_items(&[line(10, 2), line(11, 1)]));
    assert_eq!(loaded.total_amount, total);

    let mut changed = loaded.clone();
    changed.replace_line_items(vec![line(10, 5)]);
    orders.update_order(id, &changed).await.unwrap();

    assert_eq!(orders.get_order(id).await.unwrap().line_items(), &[line(10, 5)]);
}

#[tokio::test]
async fn listing_skips_deleted_and_puts_newest_first() {
    let products = ProductService::new(Arc::new(InMemoryProductRepository::new()));
    let mut ids = Vec::new();
    for (name, category) in [("a", 1), ("b", 2), ("c", 1)] {
        let product = products
            .create_product(ProductDetails::new(
                name,
                "",
                Decimal::ONE,
                1,
                CategoryId::new(category),
            ))
            .await
            .unwrap();
        ids.push(product.id().unwrap());
    }
    products.delete_product(ids[1]).await.unwrap();

    let page = products
        .list_products(Some(CategoryId::new(0)), 1, 10)
        .await
        .unwrap();

    let listed: Vec<_> = page.items.iter().map(|p| p.id().unwrap()).collect();
    assert_eq!(listed, vec![ids[2], ids[0]]);
    assert!(page.items.iter().all(|p| !p.is_deleted()));
    assert_eq!((page.page, page.limit), (1, 10));
}

#[tokio::test]
async fn page_serialises_with_effective_window() {
    let products = ProductService::new(Arc::new(InMemoryProductRepository::new()));
    let page = products.list_products(None, -2, 1000).await.unwrap();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 100);
    assert!(json["items"].as_array().unwrap().is_empty());
}
