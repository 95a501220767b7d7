//! Mailer trait and SMTP implementation.

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use super::OutgoingEmail;
use crate::config::{Config, SmtpTls};
use crate::error::DeliveryError;

/// Delivers a composed message.
///
/// One call is one attempt: implementations must not retry or queue.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError>;
}

/// SMTP relay client using lettre.
///
/// Opens a fresh authenticated connection for every message.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the relay client from the loaded configuration.
    ///
    /// Nothing is sent over the network here; a bad relay only shows up on
    /// the first delivery. The envelope addresses are checked up front since
    /// every message would fail on them.
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        parse_address("sender", &config.smtp_username)?;
        parse_address("recipient", &config.recipient_email)?;

        let host = config.smtp_host.as_str();

        let builder = match config.smtp_tls {
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
        };

        let transport = builder
            .port(config.smtp_port)
            .timeout(Some(config.smtp_timeout))
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.expose_secret().clone(),
            ))
            .build();

        info!(
            smtp_host = %host,
            smtp_port = config.smtp_port,
            smtp_tls = ?config.smtp_tls,
            timeout_secs = config.smtp_timeout.as_secs(),
            "smtp_mailer_configured"
        );

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        let envelope = envelope_for(email)?;
        let message = email.formatted();

        let response = self
            .transport
            .send_raw(&envelope, message.as_bytes())
            .await?;

        debug!(
            smtp_code = %response.code(),
            message_length = message.len(),
            "smtp_message_accepted"
        );

        Ok(())
    }
}

/// Build the SMTP envelope from the message's sender and recipient.
fn envelope_for(email: &OutgoingEmail) -> Result<Envelope, DeliveryError> {
    let sender = parse_address("sender", &email.sender)?;
    let recipient = parse_address("recipient", &email.recipient)?;
    Ok(Envelope::new(Some(sender), vec![recipient])?)
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, DeliveryError> {
    value
        .parse()
        .map_err(|source| DeliveryError::InvalidAddress {
            field,
            value: value.to_string(),
            source,
        })
}
