use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_payment_engine::{
    db_types::{OrderStatus, PaymentStatus},
    OrderFlowApi,
};
use sps_common::Secret;

use super::{
    helpers::{get_request, post_request, post_request_with_token},
    mocks::{sample_order, MockPaymentsDb},
};
use crate::{
    config::SmtpConfig,
    mailer::OrderMailer,
    middleware::AdminAuthMiddlewareFactory,
    routes::{AdminOrdersRoute, ApproveOrderRoute, CreateOrderRoute, OrderByIdRoute},
};

const ADMIN_KEY: &str = "s3cret-admin-key";

fn order_payload() -> serde_json::Value {
    json!({
        "product_id": 1,
        "product_name": "Masala Chai",
        "quantity": 2,
        "unit_price": 250.0,
        "total_amount": 500.0,
        "customer_name": "Asha Rao",
        "customer_email": "asha@example.com",
        "customer_phone": "9876543210",
        "shipping_address": "14 Temple Street, Mysuru"
    })
}

#[actix_web::test]
async fn take_a_new_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders", order_payload(), configure_intake).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"id\":1"), "was: {body}");
    assert!(body.contains("\"payment_status\":\"pending\""), "was: {body}");
}

#[actix_web::test]
async fn reject_an_order_with_a_wrong_total() {
    let _ = env_logger::try_init().ok();
    let mut payload = order_payload();
    payload["total_amount"] = json!(450.0);
    // Validation fails before the backend is touched; the mock has no expectations.
    let (status, body) = post_request("/orders", payload, configure_no_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not equal unit_price"), "was: {body}");
}

#[actix_web::test]
async fn reject_an_order_with_zero_quantity() {
    let _ = env_logger::try_init().ok();
    let mut payload = order_payload();
    payload["quantity"] = json!(0);
    let (status, body) = post_request("/orders", payload, configure_no_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("quantity must be positive"), "was: {body}");
}

#[actix_web::test]
async fn fetch_an_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/42", configure_missing_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Order 42 not found"), "was: {body}");
}

#[actix_web::test]
async fn admin_orders_without_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("/admin/orders", configure_admin).await.expect_err("Expected error");
    assert_eq!(err, "Missing bearer token");
}

#[actix_web::test]
async fn approve_with_wrong_token() {
    let _ = env_logger::try_init().ok();
    let err = post_request_with_token("wrong-key", "/admin/orders/1/approve", json!({}), configure_admin)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Invalid admin credentials");
}

#[actix_web::test]
async fn approve_a_pending_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request_with_token(ADMIN_KEY, "/admin/orders/1/approve", json!({}), configure_admin)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order 1 confirmed"), "was: {body}");
}

#[actix_web::test]
async fn approve_an_already_confirmed_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request_with_token(ADMIN_KEY, "/admin/orders/1/approve", json!({}), configure_admin_confirmed)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order already confirmed"), "was: {body}");
}

#[actix_web::test]
async fn approve_an_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request_with_token(ADMIN_KEY, "/admin/orders/42/approve", json!({}), configure_missing_order_admin)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Order 42 not found"), "was: {body}");
}

fn configure_intake(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(1)));
    db.expect_append_audit_event().returning(|_| Ok(()));
    cfg.service(CreateOrderRoute::<MockPaymentsDb>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_no_backend(cfg: &mut ServiceConfig) {
    let db = MockPaymentsDb::new();
    cfg.service(CreateOrderRoute::<MockPaymentsDb>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_missing_order(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    cfg.service(OrderByIdRoute::<MockPaymentsDb>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn admin_scope(db: MockPaymentsDb, cfg: &mut ServiceConfig) {
    let scope = web::scope("/admin")
        .wrap(AdminAuthMiddlewareFactory::new(Secret::new(ADMIN_KEY.to_string())))
        .service(AdminOrdersRoute::<MockPaymentsDb>::new())
        .service(ApproveOrderRoute::<MockPaymentsDb>::new());
    cfg.service(scope)
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(OrderMailer::from_config(&SmtpConfig::default())));
}

fn configure_admin(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id))));
    db.expect_update_order_state().returning(|id, status, payment_status, _, _| {
        let mut order = sample_order(id);
        order.status = status;
        order.payment_status = payment_status;
        Ok(Some(order))
    });
    admin_scope(db, cfg);
}

fn configure_admin_confirmed(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id().returning(|id| {
        let mut order = sample_order(id);
        order.status = OrderStatus::Confirmed;
        order.payment_status = PaymentStatus::Paid;
        Ok(Some(order))
    });
    // No update expectation: approving a confirmed order must not touch the database.
    admin_scope(db, cfg);
}

fn configure_missing_order_admin(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentsDb::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    admin_scope(db, cfg);
}
