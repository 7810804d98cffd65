//! Bearer-token check for the admin surface. This middleware wraps the `/admin` scope.
//!
//! Every request must carry `Authorization: Bearer <admin api key>`. A missing or malformed header is a 401,
//! a wrong token is a 403. If no key is configured at all, every request is refused: an unset
//! `SPS_ADMIN_API_KEY` must never mean an open admin surface.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorServiceUnavailable, ErrorUnauthorized},
    http::header,
    Error,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use sps_common::Secret;

pub struct AdminAuthMiddlewareFactory {
    api_key: Secret<String>,
}

impl AdminAuthMiddlewareFactory {
    pub fn new(api_key: Secret<String>) -> Self {
        AdminAuthMiddlewareFactory { api_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminAuthMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthMiddlewareService { api_key: self.api_key.clone(), service: Rc::new(service) })
    }
}

pub struct AdminAuthMiddlewareService<S> {
    api_key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api_key = self.api_key.clone();
        Box::pin(async move {
            if api_key.is_empty() {
                log::warn!("Admin request refused: no admin API key is configured");
                return Err(ErrorServiceUnavailable("Admin API key is not configured"));
            }
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| ErrorUnauthorized("Missing bearer token"))?;
            if token == api_key.reveal() {
                service.call(req).await
            } else {
                Err(ErrorForbidden("Invalid admin credentials"))
            }
        })
    }
}
