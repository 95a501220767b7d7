//! Form Relay - authenticated web form to email relay.
//!
//! A single HTTP endpoint accepts a JSON form submission, checks a shared
//! API key, and forwards the submission to a fixed mailbox through an
//! authenticated SMTP relay.
//!
//! ## Architecture
//!
//! ```text
//! HTTP POST /send-email → web::send_email → mail::compose → Mailer → SMTP relay
//! ```
//!
//! [`Config`] is loaded once at startup and shared read-only by every request.

pub mod config;
pub mod error;
pub mod mail;
pub mod submission;
pub mod web;

// Re-export commonly used types
pub use config::{Config, SmtpTls};
pub use error::{ApiError, ConfigError, DeliveryError, RequestError};
pub use mail::{compose, Mailer, OutgoingEmail, SmtpMailer};
pub use submission::Submission;
pub use web::{router, AppState};
