use std::fmt::{Debug, Display};

use log::*;

use crate::{
    db_types::{AuditEvent, AuditKind, NewAuditEvent, NewOrder, Order, OrderStatus, PaymentStatus},
    spe_api::errors::{OrderValidationError, PaymentGatewayError},
    traits::PaymentGatewayDatabase,
};

//--------------------------------------    PaymentEvent     ---------------------------------------------------------
/// Everything that can move an order through the payment state machine.
///
/// There are three entry points that report payment outcomes (gateway redirect callback, gateway webhook, admin
/// approval) plus the gateway-accept step during checkout. They all funnel through [`transition`] so the rules
/// live in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// The gateway accepted the payment request. Audit-only; the order stays pending until an outcome arrives.
    GatewayAccepted { payment_request_id: String },
    /// The gateway reported the payment as captured ("Credit").
    PaymentConfirmed { payment_id: String, source: ConfirmationSource },
    /// The gateway reported any non-credit outcome, or verification could not be carried out.
    PaymentFailed { reason: String },
    /// An operator manually confirmed the order.
    AdminApproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationSource {
    /// The buyer's browser redirect. Advisory: it may never arrive.
    Callback,
    /// The gateway's server-to-server notification. Authoritative.
    Webhook,
}

impl Display for ConfirmationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationSource::Callback => write!(f, "callback"),
            ConfirmationSource::Webhook => write!(f, "webhook"),
        }
    }
}

impl PaymentEvent {
    /// The payment states this event may move an order out of. Conditional updates repeat this set in their
    /// WHERE clause, so a transition raced by another entry point is dropped rather than applied twice.
    ///
    /// `paid` appears in no set: once paid, an order never leaves that state. A confirmation may override an
    /// earlier *failure*, because the advisory callback can mark an order failed before the authoritative
    /// webhook lands.
    pub fn applies_from(&self) -> &'static [PaymentStatus] {
        match self {
            PaymentEvent::GatewayAccepted { .. } => &[PaymentStatus::Pending],
            PaymentEvent::PaymentConfirmed { .. } => &[PaymentStatus::Pending, PaymentStatus::Failed],
            PaymentEvent::PaymentFailed { .. } => &[PaymentStatus::Pending],
            PaymentEvent::AdminApproved => &[PaymentStatus::Pending, PaymentStatus::Failed],
        }
    }

    fn audit(&self, order_id: i64) -> NewAuditEvent {
        match self {
            PaymentEvent::GatewayAccepted { payment_request_id } => {
                NewAuditEvent::new(order_id, AuditKind::GatewayRequested, format!("request_id={payment_request_id}"))
            },
            PaymentEvent::PaymentConfirmed { payment_id, source } => {
                NewAuditEvent::new(order_id, AuditKind::PaymentPaid, format!("payment_id={payment_id} via={source}"))
            },
            PaymentEvent::PaymentFailed { reason } => {
                NewAuditEvent::new(order_id, AuditKind::PaymentFailed, format!("reason={reason}"))
            },
            PaymentEvent::AdminApproved => NewAuditEvent::new(order_id, AuditKind::AdminApproved, ""),
        }
    }
}

/// The single place where status transitions are decided.
///
/// Returns the `(status, payment_status)` pair to apply, or `None` when the event is a no-op for the order's
/// current state. The rules, as a matrix of payment states:
///
/// | From \ Event | GatewayAccepted | PaymentConfirmed  | PaymentFailed      | AdminApproved     |
/// |--------------|-----------------|-------------------|--------------------|-------------------|
/// | pending      | no-op (audit)   | confirmed/paid    | cancelled/failed   | confirmed/paid    |
/// | paid         | no-op           | no-op             | no-op              | no-op             |
/// | failed       | no-op           | confirmed/paid    | no-op              | confirmed/paid    |
///
/// The `paid` row is the "never leave paid" rule: a late failure callback cannot downgrade an order the
/// webhook already settled, and a replayed webhook simply reconfirms.
pub fn transition(order: &Order, event: &PaymentEvent) -> Option<(OrderStatus, PaymentStatus)> {
    if !event.applies_from().contains(&order.payment_status) {
        return None;
    }
    match event {
        PaymentEvent::GatewayAccepted { .. } => None,
        PaymentEvent::PaymentConfirmed { .. } => Some((OrderStatus::Confirmed, PaymentStatus::Paid)),
        PaymentEvent::PaymentFailed { .. } => Some((OrderStatus::Cancelled, PaymentStatus::Failed)),
        // An operator re-approving a confirmed order is a no-op, not an error.
        PaymentEvent::AdminApproved if order.status == OrderStatus::Confirmed => None,
        PaymentEvent::AdminApproved => Some((OrderStatus::Confirmed, PaymentStatus::Paid)),
    }
}

//--------------------------------------   ApprovalOutcome   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub enum ApprovalOutcome {
    /// The order was transitioned to confirmed/paid; the buyer should be notified.
    Approved(Order),
    /// The order was already confirmed. No state change, no duplicate notification.
    AlreadyConfirmed(Order),
}

//--------------------------------------    OrderFlowApi     ---------------------------------------------------------
/// `OrderFlowApi` is the primary API for order intake and the payment flow. All status mutations go through
/// [`transition`] and are applied with a conditional update, so concurrent callback/webhook reconciliation for
/// the same order converges on a single final state.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Validate and persist a new order. The persisted record comes back with its assigned id, both statuses
    /// `pending` and both timestamps set to submission time.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        validate_new_order(&order)?;
        let order = self.db.insert_order(order).await?;
        let audit = NewAuditEvent::new(order.id, AuditKind::OrderCreated, format!("total={}", order.total_amount));
        self.db.append_audit_event(audit).await?;
        debug!("📦️ Order #{} created for {} ({})", order.id, order.customer_email, order.total_amount);
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order_by_id(order_id).await
    }

    /// All orders, newest first. Admin view.
    pub async fn fetch_orders(&self) -> Result<Vec<Order>, PaymentGatewayError> {
        self.db.fetch_orders().await
    }

    /// Record that the gateway accepted the payment request for this order. The order stays pending; the
    /// request id lands in the audit trail for reconciliation.
    pub async fn record_gateway_request(
        &self,
        order_id: i64,
        payment_request_id: &str,
    ) -> Result<(), PaymentGatewayError> {
        let event = PaymentEvent::GatewayAccepted { payment_request_id: payment_request_id.to_string() };
        self.db.append_audit_event(event.audit(order_id)).await?;
        debug!("📦️ Order #{order_id} has gateway payment request {payment_request_id}");
        Ok(())
    }

    /// Compensating delete: remove an order whose gateway payment request could not be created. The order must
    /// never be visible as a dangling pending row with no corresponding gateway request.
    pub async fn abandon_order(&self, order_id: i64) -> Result<bool, PaymentGatewayError> {
        let deleted = self.db.delete_order(order_id).await?;
        if deleted {
            info!("📦️ Order #{order_id} deleted after the gateway refused its payment request");
        }
        Ok(deleted)
    }

    /// Apply a payment outcome to an order. Returns the updated order, or `None` when [`transition`] decided the
    /// event is a no-op (already paid, replayed webhook, late failure after a paid result).
    pub async fn apply_payment_event(
        &self,
        order_id: i64,
        event: PaymentEvent,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(PaymentGatewayError::OrderNotFound(order_id))?;
        let Some((status, payment_status)) = transition(&order, &event) else {
            debug!("📦️ {event:?} is a no-op for order #{order_id} ({}/{})", order.status, order.payment_status);
            return Ok(None);
        };
        // The conditional update re-checks applies_from, so a transition raced by the other entry point
        // between our read and write is dropped here instead of clobbering the row.
        let updated = self
            .db
            .update_order_state(order_id, status, payment_status, event.applies_from(), event.audit(order_id))
            .await?;
        match &updated {
            Some(o) => info!("📦️ Order #{order_id} transitioned to {}/{}", o.status, o.payment_status),
            None => debug!("📦️ Order #{order_id} was updated concurrently; {event:?} dropped"),
        }
        Ok(updated)
    }

    /// Webhook reconciliation path. There is no order id in the webhook payload, so the most recent pending
    /// order for the buyer's email is matched. Two simultaneously pending orders from the same buyer are
    /// indistinguishable here; the audit trail records which one the webhook landed on. Replays are no-ops
    /// because only pending rows match.
    pub async fn confirm_payment_for_email(
        &self,
        email: &str,
        payment_id: &str,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let Some(order) = self.db.fetch_latest_pending_order_for_email(email).await? else {
            debug!("📦️ No pending order found for {email}; webhook ignored");
            return Ok(None);
        };
        let event = PaymentEvent::PaymentConfirmed {
            payment_id: payment_id.to_string(),
            source: ConfirmationSource::Webhook,
        };
        self.apply_payment_event(order.id, event).await
    }

    /// Operator approval. Not-found is an error; approving an already-confirmed order is a reported no-op.
    pub async fn approve_order(&self, order_id: i64) -> Result<ApprovalOutcome, PaymentGatewayError> {
        let order = self.db.fetch_order_by_id(order_id).await?.ok_or(PaymentGatewayError::OrderNotFound(order_id))?;
        match self.apply_payment_event(order_id, PaymentEvent::AdminApproved).await? {
            Some(updated) => Ok(ApprovalOutcome::Approved(updated)),
            None => Ok(ApprovalOutcome::AlreadyConfirmed(order)),
        }
    }

    pub async fn audit_trail(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError> {
        self.db.fetch_audit_events(order_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn validate_new_order(order: &NewOrder) -> Result<(), OrderValidationError> {
    let required = [
        ("product_name", &order.product_name),
        ("customer_name", &order.customer_name),
        ("customer_email", &order.customer_email),
        ("customer_phone", &order.customer_phone),
        ("shipping_address", &order.shipping_address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrderValidationError(format!("{field} must not be empty")));
        }
    }
    if order.quantity <= 0 {
        return Err(OrderValidationError(format!("quantity must be positive, got {}", order.quantity)));
    }
    if order.unit_price.is_negative() || order.total_amount.is_negative() {
        return Err(OrderValidationError("monetary amounts must not be negative".to_string()));
    }
    // Quantity is attacker-controlled, so the expected total must be computed without wrapping.
    let expected_total = order.unit_price.checked_mul(order.quantity).ok_or_else(|| {
        OrderValidationError(format!(
            "unit_price {} x quantity {} overflows",
            order.unit_price, order.quantity
        ))
    })?;
    if expected_total != order.total_amount {
        return Err(OrderValidationError(format!(
            "total_amount {} does not equal unit_price {} x quantity {}",
            order.total_amount, order.unit_price, order.quantity
        )));
    }
    Ok(())
}
