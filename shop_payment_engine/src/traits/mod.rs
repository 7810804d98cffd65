//! # Database backend contracts.
//!
//! This module defines the interface contracts that storage backends implement in order to drive the shop
//! payment engine. The APIs in [`crate::spe_api`] are generic over these traits, which is also what lets the
//! server's endpoint tests run against mocked backends.
//!
//! * [`PaymentGatewayDatabase`] covers order intake, the payment state machine, and the audit trail.
//! * [`ProductManagement`] covers the catalog.
mod payment_gateway_database;
mod product_management;

pub use payment_gateway_database::PaymentGatewayDatabase;
pub use product_management::ProductManagement;
