use std::fmt::Display;

use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::NewOrder;
use sps_common::Money;

/// The intake payload for a new order, as posted by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_amount: Money,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    #[serde(default)]
    pub notes: String,
}

impl From<OrderPayload> for NewOrder {
    fn from(p: OrderPayload) -> Self {
        NewOrder::new(p.product_id, p.product_name, p.quantity, p.unit_price, p.total_amount)
            .with_customer(&p.customer_name, &p.customer_email, &p.customer_phone, &p.shipping_address)
            .with_notes(&p.notes)
    }
}

/// The response to a successful checkout initiation. The frontend redirects the buyer to `payment_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitResponse {
    pub success: bool,
    pub payment_url: String,
    pub payment_request_id: String,
    pub order_id: i64,
}

/// Query parameters on the buyer's redirect back from the gateway's checkout page. All optional: the buyer's
/// browser is free to mangle or drop them, which is why the callback is advisory.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub order_id: Option<i64>,
    pub payment_id: Option<String>,
    pub payment_request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
