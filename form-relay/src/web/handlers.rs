//! HTTP endpoint handlers.
//!
//! `/send-email` runs every request through the same sequence:
//! 1. Reject methods other than POST and OPTIONS
//! 2. Attach CORS headers to everything that follows
//! 3. Answer OPTIONS preflights immediately
//! 4. Check the API key, read the body under the size cap, decode, validate
//! 5. Compose and relay the message, then report the outcome
//!
//! Nothing is kept between requests.

use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ApiError, RequestError};
use crate::mail::{compose, Mailer};
use crate::web::auth::verify_api_key;
use crate::{Config, Submission};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: Arc::new(config),
            mailer,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Form Submission
// =============================================================================

/// Body returned once the relay accepted the message.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl SendEmailResponse {
    pub const SUCCESS: SendEmailResponse = SendEmailResponse {
        status: "success",
        message: "Email sent successfully",
    };
}

/// Form submission endpoint.
///
/// Mounted for every method so that the method check, CORS headers and
/// error bodies all come from one place.
pub async fn send_email(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if method != Method::POST && method != Method::OPTIONS {
        info!(method = %method, "send_email_method_not_allowed");
        return RequestError::MethodNotAllowed.into_response();
    }

    let mut response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        match relay_submission(&state, &headers, body).await {
            Ok(()) => (StatusCode::OK, Json(SendEmailResponse::SUCCESS)).into_response(),
            Err(e) => e.into_response(),
        }
    };

    apply_cors_headers(response.headers_mut());
    response
}

async fn relay_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<(), ApiError> {
    if !verify_api_key(headers, &state.config.api_key) {
        return Err(RequestError::Unauthorized.into());
    }

    // The body is only read once the caller is authenticated. A read error is
    // reported as the size cap; a client that dropped mid-body never sees it.
    let body = match to_bytes(body, state.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                error = %error_chain(&e),
                max_body_bytes = state.config.max_body_bytes,
                "send_email_body_rejected"
            );
            return Err(RequestError::PayloadTooLarge(e).into());
        }
    };

    let submission = match Submission::from_json(&body) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %error_chain(&e), body_length = body.len(), "send_email_invalid_payload");
            return Err(e.into());
        }
    };

    if let Err(e) = submission.validate() {
        warn!(
            has_email = !submission.email.is_empty(),
            has_message = !submission.message.is_empty(),
            "send_email_missing_fields"
        );
        return Err(e.into());
    }

    info!(
        reply_to = %submission.email,
        has_subject = !submission.subject.is_empty(),
        message_length = submission.message.len(),
        "send_email_received"
    );

    let email = compose(&submission, &state.config);

    if let Err(e) = state.mailer.send(&email).await {
        error!(
            error = %error_chain(&e),
            smtp_host = %state.config.smtp_host,
            reply_to = %submission.email,
            "email_delivery_failed"
        );
        return Err(e.into());
    }

    info!(reply_to = %submission.email, "email_sent");

    Ok(())
}

pub(crate) fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, X-API-Key"),
    );
}

/// Render an error with all of its sources, outermost first.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
