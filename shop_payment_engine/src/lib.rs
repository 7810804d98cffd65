//! Storefront payment engine.
//!
//! This library holds the persistence layer and the order/payment state machine for the storefront. It is split
//! along the same seam as the server that consumes it:
//! 1. Database control ([`mod@sqlite`]): the SQLite backend. Nothing outside the engine touches SQL directly; the
//!    data types live in [`db_types`] and are public.
//! 2. The engine API ([`spe_api`]): [`OrderFlowApi`] drives every order status change — intake, gateway accept,
//!    callback/webhook reconciliation and admin approval all funnel through one transition function — while
//!    [`ProductApi`] covers catalog management. Backends implement the [`traits`] to plug in.

pub mod db_types;
mod spe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use spe_api::{
    errors::{OrderValidationError, PaymentGatewayError, ProductApiError},
    order_flow_api::{transition, ApprovalOutcome, ConfirmationSource, OrderFlowApi, PaymentEvent},
    product_api::ProductApi,
};
