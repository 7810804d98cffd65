use std::time::Duration;

use actix_cors::Cors;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use instamojo_tools::InstamojoApi;
use log::*;
use shop_payment_engine::{OrderFlowApi, ProductApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    mailer::OrderMailer,
    middleware::AdminAuthMiddlewareFactory,
    payment_routes::{CreatePaymentRoute, PaymentCallbackRoute, PaymentWebhookRoute},
    routes::{
        health,
        AdminOrdersRoute,
        AdminProductsRoute,
        ApproveOrderRoute,
        CreateOrderRoute,
        CreateProductRoute,
        DeleteProductRoute,
        OrderByIdRoute,
        ProductByIdRoute,
        ProductsRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = if config.database_url.is_empty() {
        SqliteDatabase::new(25).await
    } else {
        SqliteDatabase::new_with_url(&config.database_url, 25).await
    }
    .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    if !config.instamojo.is_configured() {
        warn!("🖲️ Instamojo credentials are not set. Checkout requests will be refused by the gateway.");
    }
    let gateway =
        InstamojoApi::new(config.instamojo.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let products_api = ProductApi::new(db.clone());
        let gateway = gateway.clone();
        let mailer = OrderMailer::from_config(&config.smtp);
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600);
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .wrap(cors)
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(products_api))
            .app_data(web::Data::new(gateway))
            .app_data(web::Data::new(config.instamojo.clone()))
            .app_data(web::Data::new(config.urls.clone()))
            .app_data(web::Data::new(mailer));
        // Routes that require the admin bearer token
        let admin_scope = web::scope("/admin")
            .wrap(AdminAuthMiddlewareFactory::new(config.admin_api_key.clone()))
            .service(AdminOrdersRoute::<SqliteDatabase>::new())
            .service(ApproveOrderRoute::<SqliteDatabase>::new())
            .service(AdminProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase, InstamojoApi>::new())
            .service(PaymentCallbackRoute::<SqliteDatabase, InstamojoApi>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
