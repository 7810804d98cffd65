use crate::{
    db_types::{AuditEvent, NewAuditEvent, NewOrder, Order, OrderStatus, PaymentStatus},
    spe_api::errors::PaymentGatewayError,
};

/// The storage contract for order intake and the payment flow.
///
/// State mutations are conditional: `update_order_state` only fires when the row's payment status is still in
/// `allowed_from`, which is how concurrent callback/webhook/admin transitions for the same order are kept from
/// trampling each other.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Persist a new order. Both statuses start as `pending`. Returns the stored record with its assigned id.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError>;

    /// All orders, newest first.
    async fn fetch_orders(&self) -> Result<Vec<Order>, PaymentGatewayError>;

    /// The most recently created order for `email` whose payment status is still `pending`.
    async fn fetch_latest_pending_order_for_email(&self, email: &str) -> Result<Option<Order>, PaymentGatewayError>;

    /// Atomically set the order's `(status, payment_status)` and append `audit`, but only if the row's current
    /// payment status is in `allowed_from`. Returns the updated order, or `None` when the guard did not match
    /// (a concurrent transition got there first).
    async fn update_order_state(
        &self,
        order_id: i64,
        status: OrderStatus,
        payment_status: PaymentStatus,
        allowed_from: &[PaymentStatus],
        audit: NewAuditEvent,
    ) -> Result<Option<Order>, PaymentGatewayError>;

    /// Remove an order and its audit rows. Returns false if no such order existed.
    async fn delete_order(&self, order_id: i64) -> Result<bool, PaymentGatewayError>;

    async fn append_audit_event(&self, event: NewAuditEvent) -> Result<(), PaymentGatewayError>;

    /// The order's audit trail, oldest first.
    async fn fetch_audit_events(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError>;
}
