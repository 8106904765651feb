//! Postgres adapter for [`OrderRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Row};
use tracing::{Span, instrument};

use storefront_core::{Entity, OrderId, ProductId, StorageError, StorageResult, UserId};
use storefront_orders::{Order, OrderRepository, OrderedProduct};

use super::{finish, map_sqlx_error};

/// Postgres-backed order repository.
///
/// ## Atomicity
///
/// Orders live in two tables (`orders` and `order_products`). Both writes run
/// in one transaction, so a reader either sees the order with every line item
/// or does not see it at all.
///
/// ## Reads
///
/// Each read is a single `LEFT JOIN` statement. One statement sees one
/// snapshot, so a concurrent `update_order` can never surface as a mix of old
/// and new line items.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: Arc<PgPool>,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    #[instrument(
        skip(self, order),
        fields(
            user_id = %order.user_id,
            lines = order.products.len(),
            order_id = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(&self, order: &Order) -> StorageResult<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = insert_order(&mut tx, order).await;
        let id = finish(tx, "create_order", result).await?;

        Span::current().record("order_id", id.get());
        Ok(order.clone().with_id(id))
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn get_order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id, o.total_amount, o.status, o.delivery_address,
                op.product_id, op.quantity
            FROM orders o
            LEFT JOIN order_products op ON op.order_id = o.id
            WHERE o.id = $1
            ORDER BY op.line_no
            "#,
        )
        .bind(id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

        Ok(fold_orders(&rows)?.into_iter().next())
    }

    #[instrument(
        skip(self, order),
        fields(order_id = %id, lines = order.products.len()),
        err
    )]
    async fn update_order(&self, id: OrderId, order: &Order) -> StorageResult<Option<Order>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = overwrite_order(&mut tx, id, order).await;
        let found = finish(tx, "update_order", result).await?;

        Ok(found.then(|| order.clone().with_id(id)))
    }

    #[instrument(skip(self), fields(user_id = %user_id, orders = tracing::field::Empty), err)]
    async fn list_orders_by_user(&self, user_id: UserId) -> StorageResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id, o.total_amount, o.status, o.delivery_address,
                op.product_id, op.quantity
            FROM orders o
            LEFT JOIN order_products op ON op.order_id = o.id
            WHERE o.user_id = $1
            ORDER BY o.id, op.line_no
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders_by_user", e))?;

        let orders = fold_orders(&rows)?;
        Span::current().record("orders", orders.len());
        Ok(orders)
    }
}

async fn insert_order(conn: &mut PgConnection, order: &Order) -> StorageResult<OrderId> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (user_id, total_amount, status, delivery_address)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(order.user_id.get())
    .bind(order.total_amount)
    .bind(&order.status)
    .bind(&order.delivery_address)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("insert_order", e))?;

    let id = OrderId::new(id);
    insert_line_items(conn, id, order.line_items()).await?;
    Ok(id)
}

/// Returns `false` when no order row matched; nothing is written in that case.
async fn overwrite_order(conn: &mut PgConnection, id: OrderId, order: &Order) -> StorageResult<bool> {
    let updated = sqlx::query(
        r#"
        UPDATE orders
        SET user_id = $2, total_amount = $3, status = $4, delivery_address = $5
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .bind(order.user_id.get())
    .bind(order.total_amount)
    .bind(&order.status)
    .bind(&order.delivery_address)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("update_order", e))?;

    if updated.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM order_products WHERE order_id = $1")
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("delete_line_items", e))?;

    insert_line_items(conn, id, order.line_items()).await?;
    Ok(true)
}

async fn insert_line_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    lines: &[OrderedProduct],
) -> StorageResult<()> {
    for (line_no, line) in lines.iter().enumerate() {
        let line_no = line_no_column(line_no)?;
        sqlx::query(
            r#"
            INSERT INTO order_products (order_id, line_no, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id.get())
        .bind(line_no)
        .bind(line.product_id.get())
        .bind(line.quantity)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("insert_line_item", e))?;
    }
    Ok(())
}

/// `line_no` is an `INTEGER` column; an order longer than that cannot be stored.
fn line_no_column(line_no: usize) -> StorageResult<i32> {
    i32::try_from(line_no).map_err(|_| {
        StorageError::Backend(format!("line item {line_no} exceeds the line_no column"))
    })
}

// SQLx row types

/// One row of the order/line-item join. The line columns are NULL for an
/// order without lines.
#[derive(Debug)]
struct OrderLineRow {
    id: i64,
    user_id: i64,
    total_amount: Decimal,
    status: String,
    delivery_address: String,
    product_id: Option<i64>,
    quantity: Option<i32>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineRow {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            total_amount: row.try_get("total_amount")?,
            status: row.try_get("status")?,
            delivery_address: row.try_get("delivery_address")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

/// Group joined rows into orders. Rows must arrive ordered by order id.
fn fold_orders(rows: &[PgRow]) -> StorageResult<Vec<Order>> {
    let mut orders: Vec<Order> = Vec::new();

    for row in rows {
        let row = OrderLineRow::from_row(row).map_err(|e| map_sqlx_error("decode_order", e))?;
        let id = OrderId::new(row.id);

        let starts_new_order = orders.last().and_then(|o| o.id()) != Some(id);
        if starts_new_order {
            orders.push(
                Order::new(
                    UserId::new(row.user_id),
                    Vec::new(),
                    row.total_amount,
                    row.status,
                    row.delivery_address,
                )
                .with_id(id),
            );
        }

        if let (Some(product_id), Some(quantity), Some(order)) =
            (row.product_id, row.quantity, orders.last_mut())
        {
            order
                .products
                .push(OrderedProduct::new(ProductId::new(product_id), quantity));
        }
    }

    Ok(orders)
}
