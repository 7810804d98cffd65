//----------------------------------------------   Checkout  ----------------------------------------------------
//! The Instamojo checkout flow: payment request creation, the buyer's redirect callback and the gateway's
//! server-to-server webhook. Status decisions live in the engine's transition function; these handlers only
//! translate gateway traffic into payment events.

use std::collections::HashMap;

use actix_web::{http::header, web, HttpResponse};
use instamojo_tools::{
    helpers::{normalize_phone, purpose_for_order, verify_webhook_mac, MAC_FIELD},
    InstamojoConfig,
    NewPaymentRequest,
    PaymentGateway,
    WebhookFields,
};
use log::*;
use serde_json::json;
use shop_payment_engine::{traits::PaymentGatewayDatabase, ConfirmationSource, OrderFlowApi, PaymentEvent};

use crate::{
    config::PublicUrls,
    data_objects::{CallbackParams, OrderPayload, PaymentInitResponse},
    errors::ServerError,
    route,
};

route!(create_payment => Post "/payment/create" impl PaymentGatewayDatabase, PaymentGateway);
/// Start a checkout: persist the order, then create the payment request on the gateway.
///
/// If the gateway refuses (explicit rejection, network failure, or the 20 s timeout), the just-created order
/// is deleted again so no dangling pending order survives a failed checkout. On success the buyer is sent to
/// the gateway's hosted checkout page via `payment_url`.
pub async fn create_payment<B: PaymentGatewayDatabase, G: PaymentGateway>(
    body: web::Json<OrderPayload>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<G>,
    urls: web::Data<PublicUrls>,
) -> Result<HttpResponse, ServerError> {
    let order = api.process_new_order(body.into_inner().into()).await?;
    let request = NewPaymentRequest::new(
        purpose_for_order(order.id, &order.product_name),
        order.total_amount,
        &order.customer_name,
        &order.customer_email,
        &normalize_phone(&order.customer_phone),
        urls.payment_redirect_url(order.id),
        urls.payment_webhook_url(),
    );
    match gateway.create_payment_request(&request).await {
        Ok(payment_request) => {
            api.record_gateway_request(order.id, &payment_request.id).await?;
            info!("💰️ Checkout started for order #{}: request {}", order.id, payment_request.id);
            Ok(HttpResponse::Ok().json(PaymentInitResponse {
                success: true,
                payment_url: payment_request.longurl,
                payment_request_id: payment_request.id,
                order_id: order.id,
            }))
        },
        Err(e) => {
            warn!("💰️ Gateway refused payment request for order #{}. {e}", order.id);
            if let Err(del) = api.abandon_order(order.id).await {
                // The gateway error is still the one the client needs to see.
                error!("💰️ Could not delete order #{} after gateway failure. {del}", order.id);
            }
            Err(e.into())
        },
    }
}

route!(payment_callback => Get "/payment/callback" impl PaymentGatewayDatabase, PaymentGateway);
/// The buyer's browser redirect from the gateway's checkout page. Advisory only: query parameters are
/// attacker-controlled, so the payment status is verified against the gateway before any state change, and the
/// engine's transition guard keeps a failure here from downgrading an order the webhook already settled.
/// This handler always answers with a redirect to the frontend.
pub async fn payment_callback<B: PaymentGatewayDatabase, G: PaymentGateway>(
    query: web::Query<CallbackParams>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<G>,
    urls: web::Data<PublicUrls>,
) -> HttpResponse {
    let params = query.into_inner();
    trace!("💰️ Payment callback: {params:?}");
    let order = match params.order_id {
        Some(id) => match api.fetch_order(id).await {
            Ok(order) => order,
            Err(e) => {
                // A backend outage must be tellable apart from a genuinely unknown order in the logs,
                // even though the buyer gets the same failure redirect either way.
                error!("💰️ Could not look up order #{id} for the payment callback. {e}");
                None
            },
        },
        None => None,
    };
    let Some(order) = order else {
        debug!("💰️ Callback for unknown order {:?}", params.order_id);
        return redirect_to(urls.frontend_failure_url(Some("order_not_found")));
    };
    if order.is_paid() {
        // Usually means the webhook beat the buyer's browser here.
        debug!("💰️ Order #{} is already paid. Callback is a no-op.", order.id);
        return redirect_to(urls.frontend_success_url());
    }
    let (event, destination) = match (&params.payment_request_id, &params.payment_id) {
        (Some(request_id), Some(payment_id)) => match gateway.payment_status(request_id, payment_id).await {
            Ok(detail) if detail.is_credit() => {
                let event = PaymentEvent::PaymentConfirmed {
                    payment_id: payment_id.clone(),
                    source: ConfirmationSource::Callback,
                };
                (event, urls.frontend_success_url())
            },
            Ok(detail) => {
                debug!("💰️ Payment {payment_id} for order #{} is not credited: {}", order.id, detail.status);
                let event = PaymentEvent::PaymentFailed { reason: format!("payment_status={}", detail.status) };
                (event, urls.frontend_failure_url(None))
            },
            Err(e) => {
                warn!("💰️ Could not verify payment {payment_id} for order #{}. {e}", order.id);
                let event = PaymentEvent::PaymentFailed { reason: "verification_error".to_string() };
                (event, urls.frontend_failure_url(Some("verification_error")))
            },
        },
        _ => {
            debug!("💰️ Callback for order #{} without payment references", order.id);
            let event = PaymentEvent::PaymentFailed { reason: "missing_payment_reference".to_string() };
            (event, urls.frontend_failure_url(None))
        },
    };
    if let Err(e) = api.apply_payment_event(order.id, event).await {
        error!("💰️ Could not apply callback result to order #{}. {e}", order.id);
    }
    redirect_to(destination)
}

route!(payment_webhook => Post "/payment/webhook" impl PaymentGatewayDatabase);
/// The gateway's server-to-server notification. This is the authoritative settlement path.
///
/// The payload is form-encoded and signed: the values of all fields except `mac`, sorted by key and joined
/// with `|`, are HMAC-SHA1'd under the gateway auth token. A missing or wrong signature is a 403 and no state
/// is touched. A verified `Credit` settles the buyer's most recent pending order; replays find no pending
/// order and fall through as no-ops.
pub async fn payment_webhook<B: PaymentGatewayDatabase>(
    form: web::Form<HashMap<String, String>>,
    api: web::Data<OrderFlowApi<B>>,
    gateway_config: web::Data<InstamojoConfig>,
) -> Result<HttpResponse, ServerError> {
    let fields = form.into_inner();
    let provided_mac = fields.get(MAC_FIELD).ok_or(ServerError::InvalidWebhookSignature)?;
    if !verify_webhook_mac(gateway_config.auth_token.reveal(), &fields, provided_mac) {
        warn!("💰️ Webhook with invalid MAC rejected");
        return Err(ServerError::InvalidWebhookSignature);
    }
    let notification = WebhookFields::from_map(&fields);
    match (notification.is_credit(), &notification.buyer, &notification.payment_id) {
        (true, Some(buyer), Some(payment_id)) => {
            match api.confirm_payment_for_email(buyer, payment_id).await? {
                Some(order) => info!("💰️ Webhook settled order #{} for {buyer}", order.id),
                None => debug!("💰️ Webhook credit for {buyer} matched no pending order"),
            }
        },
        (true, _, _) => warn!("💰️ Credit webhook without buyer or payment id. Ignored."),
        (false, _, _) => {
            debug!("💰️ Webhook with status {:?} ignored", notification.status);
        },
    }
    Ok(HttpResponse::Ok().json(json!({"status": "ok"})))
}

fn redirect_to(url: String) -> HttpResponse {
    HttpResponse::Found().insert_header((header::LOCATION, url)).finish()
}
