use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatus, PaymentStatus},
    spe_api::errors::PaymentGatewayError,
};

/// Inserts a new order using the given connection. This is not atomic on its own; pass `&mut *tx` as the
/// connection argument to embed the call inside a transaction.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                product_id,
                product_name,
                quantity,
                unit_price,
                total_amount,
                customer_name,
                customer_email,
                customer_phone,
                shipping_address,
                notes,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *;
        "#,
    )
    .bind(order.product_id)
    .bind(order.product_name)
    .bind(order.quantity)
    .bind(order.unit_price.value())
    .bind(order.total_amount.value())
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.customer_phone)
    .bind(order.shipping_address)
    .bind(order.notes)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// All orders, newest first.
pub async fn fetch_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(orders)
}

/// The most recently created order for the given email that is still awaiting payment.
pub async fn fetch_latest_pending_order_for_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE customer_email = $1 AND payment_status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        "#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Conditionally moves the order to the given state. The update only fires when the row's current payment
/// status is in `allowed_from`; a row that was transitioned concurrently no longer matches and `None` comes
/// back. The status lists are trusted enum values, so interpolating them is safe.
pub async fn update_order_state(
    id: i64,
    status: OrderStatus,
    payment_status: PaymentStatus,
    allowed_from: &[PaymentStatus],
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let guard = allowed_from.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
    let q = format!(
        r#"
            UPDATE orders
            SET status = $1, payment_status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND payment_status IN ({guard})
            RETURNING *;
        "#
    );
    let order = sqlx::query_as(&q)
        .bind(status.to_string())
        .bind(payment_status.to_string())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    if order.is_none() {
        debug!("📝️ Order #{id} did not match the payment status guard [{guard}]; state left untouched");
    }
    Ok(order)
}

/// Returns true if a row was deleted. Audit rows are the caller's concern (see
/// [`super::audit::delete_events_for_order`]).
pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(res.rows_affected() > 0)
}
