use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sps_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------    OrderStatus      ---------------------------------------------------------
/// Order lifecycle. `shipped` and `delivered` are set manually by operators after fulfilment; the payment flow
/// only ever produces `pending`, `confirmed` and `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(StatusConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PaymentStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(StatusConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    /// Snapshot of the product name at purchase time, not a live join.
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_amount: Money,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    /// Buyer-supplied free text. Machine events go to the audit trail, not here.
    pub notes: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_amount: Money,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub notes: String,
    /// Submission time. Both `created_at` and `updated_at` are set to this on insert.
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(product_id: i64, product_name: String, quantity: i64, unit_price: Money, total_amount: Money) -> Self {
        Self {
            product_id,
            product_name,
            quantity,
            unit_price,
            total_amount,
            customer_name: String::default(),
            customer_email: String::default(),
            customer_phone: String::default(),
            shipping_address: String::default(),
            notes: String::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_customer(mut self, name: &str, email: &str, phone: &str, address: &str) -> Self {
        self.customer_name = name.to_string();
        self.customer_email = email.to_string();
        self.customer_phone = phone.to_string();
        self.shipping_address = address.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }
}

//--------------------------------------      Product        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: i64,
    pub image_url: String,
    /// Display ordering for the storefront. Lower sorts first.
    pub priority: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub quantity: i64,
}

fn default_priority() -> i64 {
    100
}

/// Partial product update. Only the supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub priority: Option<i64>,
    pub quantity: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.priority.is_none()
            && self.quantity.is_none()
    }
}

//--------------------------------------     AuditEvent      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    OrderCreated,
    GatewayRequested,
    PaymentPaid,
    PaymentFailed,
    AdminApproved,
}

impl Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditKind::OrderCreated => "order_created",
            AuditKind::GatewayRequested => "gateway_requested",
            AuditKind::PaymentPaid => "payment_paid",
            AuditKind::PaymentFailed => "payment_failed",
            AuditKind::AdminApproved => "admin_approved",
        };
        write!(f, "{s}")
    }
}

/// One entry in an order's append-only audit trail.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: i64,
    pub order_id: i64,
    pub kind: AuditKind,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub order_id: i64,
    pub kind: AuditKind,
    pub payload: String,
}

impl NewAuditEvent {
    pub fn new<S: Into<String>>(order_id: i64, kind: AuditKind, payload: S) -> Self {
        Self { order_id, kind, payload: payload.into() }
    }
}
