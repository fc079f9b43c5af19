// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bounded JSON body extraction.
//!
//! Reads the request body in chunks under a byte ceiling so oversized or
//! lying clients are cut off mid-stream instead of buffered whole, then
//! decodes and parses the result. Expected failures are typed rejections
//! that carry their own HTTP response.

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde_json::{json, Value};
use thiserror::Error;

/// Why a request body was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BodyRejection {
    #[error("Payload too large.")]
    PayloadTooLarge,

    #[error("Unsupported content type.")]
    UnsupportedContentType,

    #[error("Unable to read request body.")]
    Unreadable,

    #[error("Invalid JSON payload.")]
    InvalidJson,
}

impl BodyRejection {
    /// HTTP status this rejection maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unreadable | Self::InvalidJson => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Read and parse a JSON request body of at most `limit_bytes` bytes.
///
/// A declared `Content-Length` over the limit is refused before any read,
/// but the streamed byte count is authoritative and catches absent or
/// understated declarations. An empty body parses to `Value::Null`, the
/// same value the contact form's clients historically received for it.
pub async fn read_json_body(
    headers: &HeaderMap,
    body: Body,
    limit_bytes: usize,
) -> Result<Value, BodyRejection> {
    if let Some(declared) = declared_length(headers) {
        if declared > limit_bytes as u64 {
            return Err(BodyRejection::PayloadTooLarge);
        }
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    if !content_type.contains("application/json") {
        return Err(BodyRejection::UnsupportedContentType);
    }

    let mut stream = body.into_data_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|_| BodyRejection::Unreadable)?;
        total = total.saturating_add(chunk.len());
        if total > limit_bytes {
            // Returning drops the stream, which cancels the rest of the
            // transfer instead of reading it out.
            return Err(BodyRejection::PayloadTooLarge);
        }
        buffer.extend_from_slice(&chunk);
    }

    // The original decoder substituted U+FFFD for invalid sequences, so a
    // bad encoding surfaces as a JSON parse failure rather than a read
    // error.
    let text = String::from_utf8_lossy(&buffer);
    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|_| BodyRejection::InvalidJson)
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::HeaderValue;
    use futures::stream;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    #[tokio::test]
    async fn test_oversized_declared_length_refused() {
        let mut headers = json_headers();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("999999"));

        let result = read_json_body(&headers, Body::from("{}"), 16_384).await;
        assert_eq!(result, Err(BodyRejection::PayloadTooLarge));
    }

    #[tokio::test]
    async fn test_unparseable_declared_length_ignored() {
        let mut headers = json_headers();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("banana"));

        let result = read_json_body(&headers, Body::from("{\"a\":1}"), 16_384).await;
        assert_eq!(result, Ok(json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn test_non_json_content_type_refused() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let result = read_json_body(&headers, Body::from("{}"), 16_384).await;
        assert_eq!(result, Err(BodyRejection::UnsupportedContentType));
    }

    #[tokio::test]
    async fn test_missing_content_type_refused() {
        let headers = HeaderMap::new();
        let result = read_json_body(&headers, Body::from("{}"), 16_384).await;
        assert_eq!(result, Err(BodyRejection::UnsupportedContentType));
    }

    #[tokio::test]
    async fn test_json_content_type_with_charset() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );

        let result = read_json_body(&headers, Body::from("{\"ok\":true}"), 16_384).await;
        assert_eq!(result, Ok(json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_undeclared_stream_cut_off_past_limit() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from(vec![b'a'; 40])),
            Ok(Bytes::from(vec![b'b'; 40])),
            Ok(Bytes::from(vec![b'c'; 40])),
        ];
        let body = Body::from_stream(stream::iter(chunks));

        let result = read_json_body(&json_headers(), body, 64).await;
        assert_eq!(result, Err(BodyRejection::PayloadTooLarge));
    }

    #[tokio::test]
    async fn test_transport_failure_unreadable() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"a\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = Body::from_stream(stream::iter(chunks));

        let result = read_json_body(&json_headers(), body, 16_384).await;
        assert_eq!(result, Err(BodyRejection::Unreadable));
    }

    #[tokio::test]
    async fn test_empty_body_parses_to_null() {
        let result = read_json_body(&json_headers(), Body::empty(), 16_384).await;
        assert_eq!(result, Ok(Value::Null));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let result = read_json_body(&json_headers(), Body::from("{not json"), 16_384).await;
        assert_eq!(result, Err(BodyRejection::InvalidJson));
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails_as_json() {
        let body = Body::from(Bytes::from_static(&[0xff, 0xfe, 0xfd]));
        let result = read_json_body(&json_headers(), body, 16_384).await;
        assert_eq!(result, Err(BodyRejection::InvalidJson));
    }

    #[tokio::test]
    async fn test_body_exactly_at_limit_accepted() {
        let payload = format!("{{\"pad\":\"{}\"}}", "x".repeat(54));
        assert_eq!(payload.len(), 64);

        let result = read_json_body(&json_headers(), Body::from(payload), 64).await;
        assert!(result.is_ok());
    }
}
