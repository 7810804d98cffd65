//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! All database-touching handlers are generic over the backend traits so the endpoint tests can run them
//! against mocked backends. Since actix-web cannot register generic handlers directly, registration goes
//! through the `route!` macro below.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_payment_engine::{
    db_types::{NewProduct, ProductUpdate},
    traits::{PaymentGatewayDatabase, ProductManagement},
    ApprovalOutcome,
    OrderFlowApi,
    ProductApi,
};

use crate::{
    data_objects::{JsonResponse, OrderPayload},
    errors::ServerError,
    mailer::OrderMailer,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl PaymentGatewayDatabase);
/// Order intake. The payload is validated (non-empty contact fields, positive quantity, paise-exact total) and
/// persisted with both statuses `pending`. This does NOT start a checkout; `POST /payment/create` does both.
pub async fn create_order<B: PaymentGatewayDatabase>(
    body: web::Json<OrderPayload>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = api.process_new_order(body.into_inner().into()).await?;
    debug!("💻️ Order #{} taken for {}", order.id, order.customer_email);
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_id => Get "/orders/{id}" impl PaymentGatewayDatabase);
pub async fn order_by_id<B: PaymentGatewayDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let order = api
        .fetch_order(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} not found")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(admin_orders => Get "/orders" impl PaymentGatewayDatabase);
pub async fn admin_orders<B: PaymentGatewayDatabase>(
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.fetch_orders().await?;
    debug!("💻️ GET admin orders. {} orders returned", orders.len());
    Ok(HttpResponse::Ok().json(orders))
}

route!(approve_order => Post "/orders/{id}/approve" impl PaymentGatewayDatabase);
/// Manual order confirmation by an operator.
///
/// 404 for unknown ids; a second approval of the same order is a no-op success. On a real transition the
/// confirmation mail is dispatched as a fire-and-forget task: the approval response never waits on SMTP, and
/// delivery failure is logged without touching order state.
pub async fn approve_order<B: PaymentGatewayDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
    mailer: web::Data<OrderMailer>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    match api.approve_order(order_id).await? {
        ApprovalOutcome::AlreadyConfirmed(_) => {
            info!("💻️ Order #{order_id} was already confirmed. No action taken.");
            Ok(HttpResponse::Ok().json(JsonResponse::success("Order already confirmed")))
        },
        ApprovalOutcome::Approved(order) => {
            info!("💻️ Order #{order_id} confirmed by admin");
            let mailer = mailer.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_order_confirmation(&order).await {
                    warn!("📧️ Could not send confirmation mail for order #{}. {e}", order.id);
                }
            });
            Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {order_id} confirmed"))))
        },
    }
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl ProductManagement);
/// The public storefront catalog: in-stock products only, sorted by display priority.
pub async fn products<B: ProductManagement>(api: web::Data<ProductApi<B>>) -> Result<HttpResponse, ServerError> {
    let products = api.available_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl ProductManagement);
pub async fn product_by_id<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let product = api
        .fetch_product(product_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Product {product_id} not found")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(admin_products => Get "/products" impl ProductManagement);
pub async fn admin_products<B: ProductManagement>(api: web::Data<ProductApi<B>>) -> Result<HttpResponse, ServerError> {
    let products = api.all_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/products" impl ProductManagement);
pub async fn create_product<B: ProductManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(update_product => Put "/products/{id}" impl ProductManagement);
pub async fn update_product<B: ProductManagement>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.update_product(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl ProductManagement);
pub async fn delete_product<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    api.delete_product(product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Product {product_id} deleted"))))
}
