use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::InstamojoConfig,
    data_objects::{NewPaymentRequest, PaymentDetail, PaymentRequest},
    InstamojoApiError,
};

/// The gateway operations the checkout flow needs.
///
/// The server's payment handlers are generic over this trait, mirroring the database backend traits, so the
/// endpoint tests can run them against a mocked gateway.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Create a payment request on the gateway.
    ///
    /// On success, returns the gateway's payment request (its id and the hosted checkout url). An explicit denial
    /// (`success: false`) is returned as [`InstamojoApiError::Rejected`] carrying the gateway's response payload;
    /// network failures and timeouts are [`InstamojoApiError::Transport`].
    async fn create_payment_request(&self, request: &NewPaymentRequest)
    -> Result<PaymentRequest, InstamojoApiError>;

    /// Check the status of a payment against the gateway. This is the verification step behind the redirect
    /// callback: do not trust query parameters from the buyer's browser, ask the gateway.
    async fn payment_status(
        &self,
        payment_request_id: &str,
        payment_id: &str,
    ) -> Result<PaymentDetail, InstamojoApiError>;
}

/// Client for the Instamojo REST API.
///
/// Authentication is via the `X-Api-Key` and `X-Auth-Token` headers, set once on the underlying client. All calls
/// carry the configured timeout; a timeout surfaces as [`InstamojoApiError::Transport`].
#[derive(Clone)]
pub struct InstamojoApi {
    config: InstamojoConfig,
    client: Arc<Client>,
}

impl InstamojoApi {
    pub fn new(config: InstamojoConfig) -> Result<Self, InstamojoApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let key = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| InstamojoApiError::Initialization(e.to_string()))?;
        let token = HeaderValue::from_str(config.auth_token.reveal().as_str())
            .map_err(|e| InstamojoApiError::Initialization(e.to_string()))?;
        headers.insert("X-Api-Key", key);
        headers.insert("X-Auth-Token", token);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| InstamojoApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

impl PaymentGateway for InstamojoApi {
    async fn create_payment_request(
        &self,
        request: &NewPaymentRequest,
    ) -> Result<PaymentRequest, InstamojoApiError> {
        #[derive(Deserialize)]
        struct CreateResponse {
            success: bool,
            #[serde(default)]
            payment_request: Option<PaymentRequest>,
        }
        let url = self.url("payment-requests/");
        trace!("Creating payment request: {} for {}", request.purpose, request.amount);
        let response = self
            .client
            .post(url)
            .form(request)
            .send()
            .await
            .map_err(|e| InstamojoApiError::Transport(e.to_string()))?;
        let body = response.json::<Value>().await.map_err(|e| InstamojoApiError::JsonError(e.to_string()))?;
        let parsed = serde_json::from_value::<CreateResponse>(body.clone())
            .map_err(|e| InstamojoApiError::JsonError(e.to_string()))?;
        if !parsed.success {
            debug!("Gateway denied payment request: {body}");
            return Err(InstamojoApiError::Rejected { detail: body });
        }
        let payment_request = parsed
            .payment_request
            .ok_or_else(|| InstamojoApiError::UnexpectedResponse("success response without payment_request".into()))?;
        info!("Payment request {} created on the gateway", payment_request.id);
        Ok(payment_request)
    }

    async fn payment_status(
        &self,
        payment_request_id: &str,
        payment_id: &str,
    ) -> Result<PaymentDetail, InstamojoApiError> {
        #[derive(Deserialize)]
        struct StatusPaymentRequest {
            #[serde(default)]
            payment: Option<PaymentDetail>,
        }
        #[derive(Deserialize)]
        struct StatusResponse {
            #[serde(default)]
            payment_request: Option<StatusPaymentRequest>,
        }
        let url = self.url(&format!("payment-requests/{payment_request_id}/{payment_id}/"));
        trace!("Checking payment status for request {payment_request_id}, payment {payment_id}");
        let response =
            self.client.get(url).send().await.map_err(|e| InstamojoApiError::Transport(e.to_string()))?;
        let parsed =
            response.json::<StatusResponse>().await.map_err(|e| InstamojoApiError::JsonError(e.to_string()))?;
        let detail = parsed
            .payment_request
            .and_then(|pr| pr.payment)
            .ok_or_else(|| InstamojoApiError::UnexpectedResponse("status response without payment".into()))?;
        debug!("Payment {payment_id} status: {}", detail.status);
        Ok(detail)
    }
}
