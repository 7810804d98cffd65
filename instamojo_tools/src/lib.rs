//! A small client for the Instamojo payment gateway.
//!
//! Covers the two API calls the storefront needs (creating a payment request, and verifying the status of a
//! payment), plus the helpers that go with them: phone normalization, uniqueness-bearing purpose strings, and
//! webhook MAC verification.

mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::{InstamojoApi, PaymentGateway};
pub use config::InstamojoConfig;
pub use data_objects::{NewPaymentRequest, PaymentDetail, PaymentRequest, WebhookFields, CREDIT_STATUS};
pub use error::InstamojoApiError;
