//! Web server module.
//!
//! Two routes:
//! - `GET /health`: liveness probe, always `OK`
//! - `/send-email`: authenticated form submission relayed by email
//!
//! The submission body is capped inside the handler, after the method and
//! API key checks. Submissions are bounded by the request timeout; both
//! limits come from [`Config`](crate::Config).

pub mod auth;
pub mod handlers;

use axum::{
    http::StatusCode,
    middleware,
    response::Response,
    routing::{any, get},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use auth::{verify_api_key, API_KEY_HEADER};
pub use handlers::{health, send_email, AppState, SendEmailResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let send_email_route = any(send_email)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::map_response(cors_on_timeout));

    Router::new()
        .route("/health", get(health))
        .route("/send-email", send_email_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Timeout responses are produced outside the handler, so they need the
/// CORS headers added here for a browser to read them.
async fn cors_on_timeout(mut response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        handlers::apply_cors_headers(response.headers_mut());
    }
    response
}
