//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup. Required settings that are absent
//! or empty abort startup with a [`ConfigError`]; optional settings fall back
//! to their defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use secrecy::Secret;

use crate::error::ConfigError;

/// Default relay port (submission port with STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default port for the web server.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (required).
    StartTls,
    /// Implicit TLS from the first byte (usually port 465).
    Tls,
    /// No encryption at all. Only useful against a local test relay.
    None,
}

impl FromStr for SmtpTls {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(SmtpTls::StartTls),
            "tls" => Ok(SmtpTls::Tls),
            "none" => Ok(SmtpTls::None),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// Immutable once loaded; the web layer shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay hostname (`SMTP_HOST`)
    pub smtp_host: String,

    /// Relay port (`SMTP_PORT`)
    pub smtp_port: u16,

    /// Relay login, also used as the sender address (`SMTP_USERNAME`)
    pub smtp_username: String,

    /// Relay password (`SMTP_PASSWORD`)
    pub smtp_password: Secret<String>,

    /// Mailbox that receives every submission (`RECIPIENT_EMAIL`)
    pub recipient_email: String,

    /// Port for the web server to listen on (`SERVER_PORT`)
    pub server_port: u16,

    /// Shared secret expected in the `X-API-Key` header (`API_KEY`)
    pub api_key: Secret<String>,

    /// Transport security towards the relay (`SMTP_TLS`)
    pub smtp_tls: SmtpTls,

    /// Relay connection and command timeout (`SMTP_TIMEOUT_SECS`)
    pub smtp_timeout: Duration,

    /// Upper bound on handling a single request (`REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,

    /// Largest accepted request body (`MAX_BODY_BYTES`)
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Required variables are checked in a fixed order so the error always
    /// names the first one missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let smtp_host = required(&lookup, "SMTP_HOST")?;
        let smtp_port = parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let smtp_username = required(&lookup, "SMTP_USERNAME")?;
        let smtp_password = required(&lookup, "SMTP_PASSWORD")?;
        let recipient_email = required(&lookup, "RECIPIENT_EMAIL")?;
        let server_port = parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?;
        let api_key = required(&lookup, "API_KEY")?;

        let smtp_tls = parse_or(&lookup, "SMTP_TLS", SmtpTls::StartTls)?;
        let smtp_timeout = parse_or(&lookup, "SMTP_TIMEOUT_SECS", DEFAULT_SMTP_TIMEOUT_SECS)?;
        let request_timeout =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let max_body_bytes = parse_or(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;

        Ok(Config {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password: Secret::new(smtp_password),
            recipient_email,
            server_port,
            api_key: Secret::new(api_key),
            smtp_tls,
            smtp_timeout: Duration::from_secs(smtp_timeout),
            request_timeout: Duration::from_secs(request_timeout),
            max_body_bytes,
        })
    }
}

/// Read a variable that must be present and non-empty.
fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse an optional variable, falling back to `default` when unset or empty.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
    }
}
