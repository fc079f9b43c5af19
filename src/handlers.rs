// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP surface for the contact intake service.
//!
//! One pipeline per submission: identify the client, gate on the rate
//! limiter, read the body under limits, validate, screen for spam, log a
//! redacted summary, respond. Expected failures travel as typed values;
//! the only catch-all is the panic boundary installed on the router.

use crate::config::Config;
use crate::limiter::SlidingWindowRateLimiter;
use crate::logging::{self, SubmissionStatus};
use crate::reader::read_json_body;
use crate::validation::{validate_contact_form, ContactFormData, FieldErrors};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Proxy headers that may carry the client address, in trust order.
/// Only consulted when the listener gives us no transport peer.
const CLIENT_HEADERS: [&str; 3] = ["x-vercel-forwarded-for", "cf-connecting-ip", "x-real-ip"];

const MSG_RECEIVED: &str = "Thanks! We received your details.";
const MSG_REVIEW: &str = "Thanks! We will review your details shortly.";
const MSG_RATE_LIMITED: &str = "Too many submissions. Please wait a minute and try again.";
const MSG_INVALID_SUBMISSION: &str = "Invalid submission.";
const MSG_CORRECT_ERRORS: &str = "Please correct the errors below.";
const MSG_INTERNAL: &str = "Something went wrong. Please try again later.";

/// Shared application state.
pub struct AppState {
    pub limiter: SlidingWindowRateLimiter,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Accepted submission response.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub message: &'static str,
}

/// Bare acknowledgment body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/contact", post(contact))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Contact form intake endpoint.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let client = client_identifier(peer.map(|ConnectInfo(addr)| addr), &parts.headers);

    let verdict = state.limiter.register_attempt(&client);
    if verdict.limited {
        let retry_seconds = retry_after_seconds(verdict.retry_after);
        logging::log_rate_limited(&client, retry_seconds);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_seconds.to_string())],
            Json(ErrorResponse {
                message: MSG_RATE_LIMITED.to_string(),
                errors: None,
            }),
        )
            .into_response();
    }

    let decoded = match read_json_body(
        &parts.headers,
        body,
        state.config.intake.body_limit_bytes,
    )
    .await
    {
        Ok(decoded) => decoded,
        Err(rejection) => return rejection.into_response(),
    };

    let Some(payload) = decoded.as_object() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: MSG_INVALID_SUBMISSION.to_string(),
                errors: None,
            }),
        )
            .into_response();
    };

    let form = match validate_contact_form(payload) {
        Ok(form) => form,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    message: MSG_CORRECT_ERRORS.to_string(),
                    errors: Some(errors),
                }),
            )
                .into_response();
        }
    };

    if is_spam(&form) {
        logging::log_submission(
            &client,
            SubmissionStatus::Spam,
            "suppressed",
            &json!({ "secondsElapsed": form.seconds_elapsed }),
            form.meta.as_ref(),
        );
        // Indistinguishable-from-success acknowledgment; nothing is stored.
        return (
            StatusCode::ACCEPTED,
            Json(MessageResponse { message: MSG_REVIEW }),
        )
            .into_response();
    }

    let id = mint_lead_id();
    logging::log_submission(
        &client,
        SubmissionStatus::Accepted,
        &id,
        &json!({
            "services": form.services.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            "currentlyListed": form.currently_listed.as_str(),
            "secondsElapsed": form.seconds_elapsed,
            "messageLength": form.message.chars().count(),
        }),
        form.meta.as_ref(),
    );

    (
        StatusCode::OK,
        Json(SubmissionResponse {
            id,
            message: MSG_RECEIVED,
        }),
    )
        .into_response()
}

/// Map a handler panic to the generic failure response. Installed once on
/// the router; the client never sees internal detail.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(text) = err.downcast_ref::<String>() {
        text.as_str()
    } else if let Some(text) = err.downcast_ref::<&str>() {
        text
    } else {
        "unknown panic"
    };
    error!(detail, "contact pipeline panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            message: MSG_INTERNAL.to_string(),
            errors: None,
        }),
    )
        .into_response()
}

/// Rate-limit key for a request: the transport peer address when the
/// listener provides one, else the first proxy header with a non-empty
/// leading token, else the shared bucket `unknown`.
pub fn client_identifier(peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }
    for name in CLIENT_HEADERS {
        let Some(value) = headers.get(name).and_then(|value| value.to_str().ok()) else {
            continue;
        };
        if let Some(first) = value.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Honeypot text or a client-side spam flag marks a submission as spam;
/// the timing signal stays advisory and is only logged.
fn is_spam(form: &ContactFormData) -> bool {
    form.company.is_some() || form.looks_spam == Some(true)
}

/// Round a retry interval up to whole seconds for the Retry-After header.
fn retry_after_seconds(retry_after: Duration) -> u64 {
    retry_after.as_millis().div_ceil(1_000) as u64
}

/// Opaque lead identifier: millisecond timestamp plus a random 32-bit
/// suffix.
fn mint_lead_id() -> String {
    format!(
        "lead_{}_{:08x}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
