use sqlx::SqliteConnection;

use crate::db_types::{AuditEvent, NewAuditEvent};

pub async fn insert_event(event: NewAuditEvent, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_audit (order_id, kind, payload) VALUES ($1, $2, $3)")
        .bind(event.order_id)
        .bind(event.kind.to_string())
        .bind(event.payload)
        .execute(conn)
        .await?;
    Ok(())
}

/// The order's trail, oldest first.
pub async fn fetch_events_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM order_audit WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(events)
}

pub async fn delete_events_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM order_audit WHERE order_id = $1").bind(order_id).execute(conn).await?;
    Ok(())
}
