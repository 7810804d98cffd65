use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use log::debug;

/// Run a single test request against an app built by `configure`. Returns the raw service response so tests
/// can inspect headers (the payment callback answers with redirects).
pub async fn call(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<ServiceResponse, String> {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())
}

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    into_parts(call(TestRequest::get().uri(path), configure).await?)
}

pub async fn post_request(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    into_parts(call(TestRequest::post().uri(path).set_json(body), configure).await?)
}

/// POST with an `Authorization: Bearer` header, for the admin surface. An empty token omits the header.
pub async fn post_request_with_token(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    into_parts(call(req, configure).await?)
}

pub async fn get_request_with_token(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    into_parts(call(req, configure).await?)
}

/// POST a form-encoded body, as the gateway webhook does.
pub async fn post_form_request(
    path: &str,
    form: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let pairs = form.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<Vec<_>>();
    into_parts(call(TestRequest::post().uri(path).set_form(pairs), configure).await?)
}

fn into_parts(response: ServiceResponse) -> Result<(StatusCode, String), String> {
    let (_, res) = response.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().map_err(|_| "unreadable body")?)
        .into_owned();
    Ok((status, body))
}
