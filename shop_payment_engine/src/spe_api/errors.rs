use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error(transparent)]
    InvalidOrder(#[from] OrderValidationError),
    #[error("Order {0} not found")]
    OrderNotFound(i64),
}

/// The intake payload failed validation. Always a client error, never a state change.
#[derive(Debug, Clone, Error)]
#[error("Invalid order: {0}")]
pub struct OrderValidationError(pub String);

#[derive(Debug, Error)]
pub enum ProductApiError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Product {0} not found")]
    ProductNotFound(i64),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("No fields to update")]
    NoFieldsToUpdate,
}
