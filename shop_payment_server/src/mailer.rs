//! Order-confirmation mail, sent when an operator approves an order.
//!
//! Delivery is best-effort and at-most-once: the approval endpoint spawns the send as a background task and
//! a failure is logged without touching order state. An unconfigured relay fails fast at send time with
//! [`MailerError::NotConfigured`] rather than at startup, so development setups can run without SMTP.
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use shop_payment_engine::db_types::Order;
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP relay is not configured")]
    NotConfigured,
    #[error("Invalid email address. {0}")]
    InvalidAddress(String),
    #[error("Could not build message. {0}")]
    BuildFailed(#[from] lettre::error::Error),
    #[error("Could not send message. {0}")]
    SendFailed(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone)]
pub struct OrderMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl OrderMailer {
    /// Build the mailer from config. A missing or broken relay configuration produces a mailer whose sends
    /// fail with [`MailerError::NotConfigured`]; the server still starts.
    pub fn from_config(config: &SmtpConfig) -> Self {
        let from_address = config.from_address.clone();
        if !config.is_configured() {
            return Self { transport: None, from_address };
        }
        let credentials = Credentials::new(config.username.clone(), config.password.reveal().clone());
        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host) {
            Ok(builder) => Some(builder.port(config.port).credentials(credentials).build()),
            Err(e) => {
                error!("📧️ Could not configure SMTP relay {}. {e}", config.host);
                None
            },
        };
        Self { transport, from_address }
    }

    /// Send the buyer their order confirmation.
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), MailerError> {
        let transport = self.transport.as_ref().ok_or(MailerError::NotConfigured)?;
        let from = self.from_address.parse::<Mailbox>().map_err(|e| MailerError::InvalidAddress(e.to_string()))?;
        let to = format!("{} <{}>", order.customer_name, order.customer_email)
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(e.to_string()))?;
        let body = format!(
            "Hi {},\n\nYour order #{} has been confirmed.\n\n  {} x {}\n  Total: {}\n\nWe will let you know once \
             it ships to:\n{}\n\nThank you for shopping with us!\n",
            order.customer_name,
            order.id,
            order.quantity,
            order.product_name,
            order.total_amount,
            order.shipping_address
        );
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Order #{} confirmed", order.id))
            .body(body)?;
        transport.send(message).await?;
        info!("📧️ Confirmation mail for order #{} sent to {}", order.id, order.customer_email);
        Ok(())
    }
}
