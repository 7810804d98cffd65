use std::collections::HashMap;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use instamojo_tools::{
    helpers::calculate_webhook_mac,
    InstamojoApiError,
    InstamojoConfig,
    PaymentRequest,
};
use serde_json::json;
use shop_payment_engine::{OrderFlowApi, PaymentGatewayError};
use sps_common::Secret;

use super::{
    helpers::{call, post_form_request, post_request},
    mocks::{sample_order, MockGateway, MockPaymentsDb},
};
use crate::{
    config::PublicUrls,
    payment_routes::{CreatePaymentRoute, PaymentCallbackRoute, PaymentWebhookRoute},
};

const AUTH_TOKEN: &str = "test-auth-token";

fn webhook_fields() -> Vec<(String, String)> {
    vec![
        ("payment_id".to_string(), "MOJO12345".to_string()),
        ("payment_request_id".to_string(), "PRQ-1".to_string()),
        ("status".to_string(), "Credit".to_string()),
        ("buyer".to_string(), "asha@example.com".to_string()),
        ("buyer_name".to_string(), "Asha Rao".to_string()),
        ("amount".to_string(), "500.00".to_string()),
    ]
}

fn signed_webhook_form() -> Vec<(String, String)> {
    let mut fields = webhook_fields();
    let map = fields.iter().cloned().collect::<HashMap<String, String>>();
    let mac = calculate_webhook_mac(AUTH_TOKEN, &map).expect("MAC calculation failed");
    fields.push(("mac".to_string(), mac));
    fields
}

#[actix_web::test]
async fn webhook_without_mac_is_refused() {
    let _ = env_logger::try_init().ok();
    let form = webhook_fields();
    let pairs = form.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    let (status, body) =
        post_form_request("/payment/webhook", &pairs, configure_webhook_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Webhook signature invalid"), "was: {body}");
}

#[actix_web::test]
async fn webhook_with_tampered_field_is_refused() {
    let _ = env_logger::try_init().ok();
    let mut form = signed_webhook_form();
    form[5].1 = "50000.00".to_string();
    let pairs = form.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    let (status, body) =
        post_form_request("/payment/webhook", &pairs, configure_webhook_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Webhook signature invalid"), "was: {body}");
}

#[actix_web::test]
async fn webhook_with_valid_mac_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let form = signed_webhook_form();
    let pairs = form.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    let (status, body) =
        post_form_request("/payment/webhook", &pairs, configure_webhook_credit).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[actix_web::test]
async fn webhook_for_a_failed_payment_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let mut fields = webhook_fields();
    fields[2].1 = "Failed".to_string();
    let map = fields.iter().cloned().collect::<HashMap<String, String>>();
    let mac = calculate_webhook_mac(AUTH_TOKEN, &map).expect("MAC calculation failed");
    fields.push(("mac".to_string(), mac));
    let pairs = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    // A correctly signed non-credit notification is acknowledged but the backend is never touched.
    let (status, body) =
        post_form_request("/payment/webhook", &pairs, configure_webhook_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

fn checkout_payload() -> serde_json::Value {
    json!({
        "product_id": 1,
        "product_name": "Masala Chai",
        "quantity": 2,
        "unit_price": 250.0,
        "total_amount": 500.0,
        "customer_name": "Asha Rao",
        "customer_email": "asha@example.com",
        "customer_phone": "+91 98765 43210",
        "shipping_address": "14 Temple Street, Mysuru"
    })
}

#[actix_web::test]
async fn checkout_returns_the_hosted_payment_url() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/create", checkout_payload(), configure_checkout_accepted).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"payment_url\":\"https://pay.example.com/PRQ-1\""), "was: {body}");
    assert!(body.contains("\"payment_request_id\":\"PRQ-1\""), "was: {body}");
    assert!(body.contains("\"order_id\":1"), "was: {body}");
}

#[actix_web::test]
async fn gateway_rejection_deletes_the_order() {
    let _ = env_logger::try_init().ok();
    // The mock asserts delete_order fires exactly once: a refused checkout must not leave a pending order.
    let (status, body) =
        post_request("/payment/create", checkout_payload(), configure_checkout_rejected).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("rejected the request"), "was: {body}");
    assert!(body.contains("amount is too low"), "was: {body}");
}

#[actix_web::test]
async fn gateway_outage_deletes_the_order_and_is_a_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/create", checkout_payload(), configure_checkout_outage).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("unreachable"), "was: {body}");
}

#[actix_web::test]
async fn callback_for_an_unknown_order_redirects_to_failure() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/payment/callback?order_id=42&payment_id=MOJO1&payment_request_id=PRQ-1");
    let res = call(req, configure_callback_missing_order).await.expect("Request failed");
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get("location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://shop.example.com/?payment=failed&reason=order_not_found");
}

#[actix_web::test]
async fn callback_without_an_order_id_redirects_to_failure() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/payment/callback?payment_id=MOJO1&payment_request_id=PRQ-1");
    let res = call(req, configure_callback_missing_order).await.expect("Request failed");
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get("location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://shop.example.com/?payment=failed&reason=order_not_found");
}

#[actix_web::test]
async fn callback_with_a_failing_backend_still_redirects() {
    let _ = env_logger::try_init().ok();
    // The order lookup errors out; the buyer still lands on the failure page instead of a 500.
    let req = TestRequest::get().uri("/payment/callback?order_id=1&payment_id=MOJO1&payment_request_id=PRQ-1");
    let res = call(req, configure_callback_backend_failure).await.expect("Request failed");
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get("location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://shop.example.com/?payment=failed&reason=order_not_found");
}

fn urls() -> PublicUrls {
    PublicUrls {
        backend_url: "https://api.example.com".to_string(),
        frontend_url: "https://shop.example.com".to_string(),
    }
}

fn gateway_config() -> InstamojoConfig {
    InstamojoConfig { auth_token: Secret::new(AUTH_TOKEN.to_string()), ..Default::default() }
}

fn webhook_services(db: MockPaymentsDb, cfg: &mut ServiceConfig) {
    cfg.service(PaymentWebhookRoute::<MockPaymentsDb>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(gateway_config()));
}

/// A webhook that must be acknowledged (or refused) without any backend interaction.
fn configure_webhook_untouched(cfg: &mut ServiceConfig) {
    webhook_services(MockPaymentsDb::new(), cfg);
}

fn configure_webhook_credit(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_latest_pending_order_for_email().returning(|_| Ok(Some(sample_order(1))));
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id))));
    db.expect_update_order_state().returning(|id, status, payment_status, _, _| {
        let mut order = sample_order(id);
        order.status = status;
        order.payment_status = payment_status;
        Ok(Some(order))
    });
    webhook_services(db, cfg);
}

fn checkout_services(db: MockPaymentsDb, gateway: MockGateway, cfg: &mut ServiceConfig) {
    cfg.service(CreatePaymentRoute::<MockPaymentsDb, MockGateway>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(gateway))
        .app_data(web::Data::new(urls()));
}

fn configure_checkout_accepted(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(1)));
    // Two audit entries: order created, then the gateway request id.
    db.expect_append_audit_event().times(2).returning(|_| Ok(()));
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment_request().returning(|_| {
        Ok(PaymentRequest {
            id: "PRQ-1".to_string(),
            longurl: "https://pay.example.com/PRQ-1".to_string(),
            status: None,
        })
    });
    checkout_services(db, gateway, cfg);
}

fn configure_checkout_rejected(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(1)));
    db.expect_append_audit_event().returning(|_| Ok(()));
    db.expect_delete_order().times(1).returning(|_| Ok(true));
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment_request().returning(|_| {
        Err(InstamojoApiError::Rejected { detail: json!({"message": {"amount": ["amount is too low"]}}) })
    });
    checkout_services(db, gateway, cfg);
}

fn configure_checkout_outage(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(1)));
    db.expect_append_audit_event().returning(|_| Ok(()));
    db.expect_delete_order().times(1).returning(|_| Ok(true));
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment_request()
        .returning(|_| Err(InstamojoApiError::Transport("connection timed out".to_string())));
    checkout_services(db, gateway, cfg);
}

fn callback_services(db: MockPaymentsDb, cfg: &mut ServiceConfig) {
    // The gateway mock carries no expectations: these callbacks never reach the verification step.
    cfg.service(PaymentCallbackRoute::<MockPaymentsDb, MockGateway>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(MockGateway::new()))
        .app_data(web::Data::new(urls()));
}

fn configure_callback_missing_order(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    callback_services(db, cfg);
}

fn configure_callback_backend_failure(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id()
        .returning(|_| Err(PaymentGatewayError::DatabaseError(sqlx::Error::PoolClosed)));
    callback_services(db, cfg);
}
