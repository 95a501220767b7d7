//! Error taxonomy.
//!
//! - [`ConfigError`]: fatal at startup, never seen by a request.
//! - [`RequestError`]: caused by the caller, always a 4xx.
//! - [`DeliveryError`]: caused by the relay or the network, always a 500 with
//!   the detail kept in the server log.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Startup configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} environment variable has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Client-caused request failure.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request body too large")]
    PayloadTooLarge(#[source] axum::Error),

    #[error("Invalid JSON payload")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("Email and message are required fields")]
    MissingFields,
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::Unauthorized => StatusCode::UNAUTHORIZED,
            RequestError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::InvalidPayload(_) | RequestError::MissingFields => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.to_string()).into_response();
        if matches!(self, RequestError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"));
        }
        response
    }
}

/// Failure to hand a message to the relay.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid {field} address {value:?}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build envelope")]
    Envelope(#[from] lettre::error::Error),

    #[error("SMTP transport error")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Everything a submission request can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Failed to send email")]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Request(e) => e.into_response(),
            // Relay detail stays in the log.
            ApiError::Delivery(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email").into_response()
            }
        }
    }
}
