use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use instamojo_tools::InstamojoApiError;
use shop_payment_engine::{PaymentGatewayError, ProductApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Webhook signature invalid or not provided")]
    InvalidWebhookSignature,
    /// The gateway explicitly refused the payment request. The gateway's response payload is carried through
    /// to the client, which is what a buyer-facing frontend needs to show a useful message.
    #[error("Payment gateway rejected the request")]
    GatewayRejected(serde_json::Value),
    #[error("Payment gateway unreachable. {0}")]
    PaymentGatewayFailure(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::GatewayRejected(_) => StatusCode::BAD_REQUEST,
            Self::InvalidWebhookSignature => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentGatewayFailure(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::GatewayRejected(detail) => {
                serde_json::json!({ "error": self.to_string(), "detail": detail })
            },
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::InvalidOrder(e) => ServerError::InvalidRequestBody(e.to_string()),
            PaymentGatewayError::OrderNotFound(id) => ServerError::NoRecordFound(format!("Order {id} not found")),
            PaymentGatewayError::DatabaseError(e) => ServerError::BackendError(e.to_string()),
        }
    }
}

impl From<ProductApiError> for ServerError {
    fn from(e: ProductApiError) -> Self {
        match e {
            ProductApiError::ProductNotFound(id) => ServerError::NoRecordFound(format!("Product {id} not found")),
            ProductApiError::InvalidProduct(s) => ServerError::InvalidRequestBody(s),
            ProductApiError::NoFieldsToUpdate => ServerError::InvalidRequestBody("No fields to update".to_string()),
            ProductApiError::DatabaseError(e) => ServerError::BackendError(e.to_string()),
        }
    }
}

impl From<InstamojoApiError> for ServerError {
    fn from(e: InstamojoApiError) -> Self {
        match e {
            InstamojoApiError::Rejected { detail } => ServerError::GatewayRejected(detail),
            e => ServerError::PaymentGatewayFailure(e.to_string()),
        }
    }
}
