//! Outbound mail.
//!
//! A submission is first rendered into an [`OutgoingEmail`] by [`compose`],
//! then handed to a [`Mailer`] for a single synchronous delivery attempt.
//!
//! ## Flow
//!
//! ```text
//! Submission + Config → compose() → OutgoingEmail → Mailer::send() → relay
//! ```

pub mod composer;
pub mod mailer;

pub use composer::{compose, OutgoingEmail, DEFAULT_SUBJECT};
pub use mailer::{Mailer, SmtpMailer};
