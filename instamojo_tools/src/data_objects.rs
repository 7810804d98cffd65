use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sps_common::Money;

/// The status string the gateway reports for a successfully captured payment.
pub const CREDIT_STATUS: &str = "Credit";

/// The form payload for creating a payment request on the gateway.
///
/// All values are strings because the gateway consumes `application/x-www-form-urlencoded`. The `purpose` must be
/// unique per request — the gateway deduplicates on purpose text — so build it with
/// [`crate::helpers::purpose_for_order`].
#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentRequest {
    pub purpose: String,
    pub amount: String,
    pub buyer_name: String,
    pub email: String,
    pub phone: String,
    pub redirect_url: String,
    pub webhook: String,
    pub send_email: String,
    pub send_sms: String,
    pub allow_repeated_payments: String,
}

impl NewPaymentRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        purpose: String,
        amount: Money,
        buyer_name: &str,
        email: &str,
        phone: &str,
        redirect_url: String,
        webhook: String,
    ) -> Self {
        Self {
            purpose,
            amount: amount.to_decimal_string(),
            buyer_name: buyer_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            redirect_url,
            webhook,
            send_email: "True".to_string(),
            send_sms: "True".to_string(),
            allow_repeated_payments: "False".to_string(),
        }
    }
}

/// The gateway-side object representing one checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: String,
    /// The hosted checkout page the buyer's browser must be redirected to.
    pub longurl: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Status of a single payment, as reported by the gateway's status-check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetail {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl PaymentDetail {
    pub fn is_credit(&self) -> bool {
        self.status == CREDIT_STATUS
    }
}

/// The fields of interest in a (MAC-verified) webhook notification.
#[derive(Debug, Clone, Default)]
pub struct WebhookFields {
    pub status: Option<String>,
    pub payment_id: Option<String>,
    pub buyer: Option<String>,
    pub amount: Option<String>,
}

impl WebhookFields {
    pub fn from_map(fields: &HashMap<String, String>) -> Self {
        Self {
            status: fields.get("status").cloned(),
            payment_id: fields.get("payment_id").cloned(),
            buyer: fields.get("buyer").cloned(),
            amount: fields.get("amount").cloned(),
        }
    }

    pub fn is_credit(&self) -> bool {
        self.status.as_deref() == Some(CREDIT_STATUS)
    }
}
