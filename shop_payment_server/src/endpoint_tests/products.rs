use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_payment_engine::ProductApi;
use sps_common::Secret;

use super::{
    helpers::{get_request, get_request_with_token, post_request, post_request_with_token},
    mocks::{sample_product, MockProductsDb},
};
use crate::{
    middleware::AdminAuthMiddlewareFactory,
    routes::{AdminProductsRoute, CreateProductRoute, ProductByIdRoute, ProductsRoute},
};

const ADMIN_KEY: &str = "s3cret-admin-key";

#[actix_web::test]
async fn storefront_catalog_lists_in_stock_products() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/products", configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Masala Chai"), "was: {body}");
    assert!(body.contains("\"price\":250.0"), "was: {body}");
}

#[actix_web::test]
async fn fetch_an_unknown_product() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/products/42", configure_missing_product).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Product 42 not found"), "was: {body}");
}

#[actix_web::test]
async fn admin_catalog_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("/admin/products", configure_admin).await.expect_err("Expected error");
    assert_eq!(err, "Missing bearer token");
}

#[actix_web::test]
async fn admin_catalog_lists_everything() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request_with_token(ADMIN_KEY, "/admin/products", configure_admin).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Masala Chai"), "was: {body}");
}

#[actix_web::test]
async fn create_a_product() {
    let _ = env_logger::try_init().ok();
    let payload = json!({"name": "Masala Chai", "price": 250.0, "quantity": 10, "priority": 10});
    let (status, body) = post_request_with_token(ADMIN_KEY, "/admin/products", payload, configure_admin)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"id\":7"), "was: {body}");
}

#[actix_web::test]
async fn reject_a_product_with_a_blank_name() {
    let _ = env_logger::try_init().ok();
    let payload = json!({"name": "   ", "price": 250.0});
    let (status, body) = post_request_with_token(ADMIN_KEY, "/admin/products", payload, configure_admin)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("name must not be empty"), "was: {body}");
}

#[actix_web::test]
async fn posting_to_the_public_catalog_is_not_routed() {
    let _ = env_logger::try_init().ok();
    let (status, _body) = post_request("/products", json!({}), configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_catalog(cfg: &mut ServiceConfig) {
    let mut db = MockProductsDb::new();
    db.expect_fetch_products().returning(|_| Ok(vec![sample_product(1), sample_product(2)]));
    cfg.service(ProductsRoute::<MockProductsDb>::new()).app_data(web::Data::new(ProductApi::new(db)));
}

fn configure_missing_product(cfg: &mut ServiceConfig) {
    let mut db = MockProductsDb::new();
    db.expect_fetch_product_by_id().returning(|_| Ok(None));
    cfg.service(ProductByIdRoute::<MockProductsDb>::new()).app_data(web::Data::new(ProductApi::new(db)));
}

fn configure_admin(cfg: &mut ServiceConfig) {
    let mut db = MockProductsDb::new();
    db.expect_fetch_products().returning(|_| Ok(vec![sample_product(1)]));
    db.expect_insert_product().returning(|_| Ok(sample_product(7)));
    let scope = web::scope("/admin")
        .wrap(AdminAuthMiddlewareFactory::new(Secret::new(ADMIN_KEY.to_string())))
        .service(AdminProductsRoute::<MockProductsDb>::new())
        .service(CreateProductRoute::<MockProductsDb>::new());
    cfg.service(scope).app_data(web::Data::new(ProductApi::new(db)));
}
