//! `SqliteDatabase` is a concrete implementation of a shop payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{audit, db_url, new_pool, orders, products};
use crate::{
    db_types::{AuditEvent, NewAuditEvent, NewOrder, NewProduct, Order, OrderStatus, PaymentStatus, Product, ProductUpdate},
    spe_api::errors::{PaymentGatewayError, ProductApiError},
    traits::{PaymentGatewayDatabase, ProductManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, taking the URL from `SPS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. The server calls this at startup, so a fresh database file is usable
    /// without a separate migration step.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("🗄️ Database migrations complete");
        Ok(())
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("📝️ Order #{} inserted for {}", order.id, order.customer_email);
        Ok(order)
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn fetch_latest_pending_order_for_email(&self, email: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_latest_pending_order_for_email(email, &mut conn).await?;
        Ok(order)
    }

    async fn update_order_state(
        &self,
        order_id: i64,
        status: OrderStatus,
        payment_status: PaymentStatus,
        allowed_from: &[PaymentStatus],
        audit: NewAuditEvent,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_state(order_id, status, payment_status, allowed_from, &mut tx).await?;
        // The audit entry only lands when the guarded update actually fired.
        if order.is_some() {
            audit::insert_event(audit, &mut tx).await?;
        }
        tx.commit().await?;
        Ok(order)
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        audit::delete_events_for_order(order_id, &mut tx).await?;
        let deleted = orders::delete_order(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn append_audit_event(&self, event: NewAuditEvent) -> Result<(), PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        audit::insert_event(event, &mut conn).await?;
        Ok(())
    }

    async fn fetch_audit_events(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let events = audit::fetch_events_for_order(order_id, &mut conn).await?;
        Ok(events)
    }
}

impl ProductManagement for SqliteDatabase {
    async fn fetch_products(&self, in_stock_only: bool) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(in_stock_only, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_product_by_id(&self, product_id: i64) -> Result<Option<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_id(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: i64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(product_id, update, &mut conn).await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = products::delete_product(product_id, &mut conn).await?;
        Ok(deleted)
    }
}
