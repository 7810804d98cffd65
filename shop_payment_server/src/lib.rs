//! # Storefront payment server
//! This crate hosts the HTTP surface of the storefront. It is responsible for:
//! * Serving the public catalog and taking new orders.
//! * Driving the Instamojo checkout flow: creating payment requests, handling the buyer's redirect callback and
//!   the gateway's server-to-server webhook.
//! * The admin surface (catalog management, order listing, manual approval) behind a bearer-token check.
//! * Sending the order-confirmation email when an operator approves an order.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod mailer;
pub mod middleware;
pub mod payment_routes;
pub mod routes;
pub mod server;
