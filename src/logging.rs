// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Privacy-conscious structured logging for the contact pipeline.
//!
//! Client identifiers are hashed before they reach a log line, message
//! text never appears (only its length does), and caller-supplied `meta`
//! passes through a key whitelist that drops anything compound or
//! unexpected.

use serde_json::{Map, Value};
use tracing::{info, warn};

/// Meta keys allowed into log output.
const META_WHITELIST: [&str; 5] = ["path", "hash", "search", "referrer", "referer"];

/// Outcome classification for a processed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Accepted,
    Spam,
}

impl SubmissionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Spam => "spam",
        }
    }
}

/// Hash a client identifier for logging.
///
/// A 32-bit rolling hash (multiplier 31) rendered as eight hex digits.
/// Best-effort redaction only: it keeps raw addresses out of log storage
/// but is trivially brute-forceable over small identifier spaces. Empty
/// identifiers hash as the literal `unknown`.
pub fn hash_identifier(identifier: &str) -> String {
    let source = if identifier.is_empty() {
        "unknown"
    } else {
        identifier
    };
    let mut hash: u32 = 0;
    for ch in source.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as u32);
    }
    format!("{hash:08x}")
}

/// Filter caller-supplied meta down to whitelisted keys holding primitive
/// values. Returns `None` when nothing survives, so empty meta is omitted
/// from log lines rather than rendered as `{}`.
pub fn sanitize_meta(meta: Option<&Map<String, Value>>) -> Option<Map<String, Value>> {
    let meta = meta?;
    let mut safe = Map::new();
    for key in META_WHITELIST {
        if let Some(value) = meta.get(key) {
            match value {
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                    safe.insert(key.to_string(), value.clone());
                }
                Value::Array(_) | Value::Object(_) => {}
            }
        }
    }
    (!safe.is_empty()).then_some(safe)
}

/// Log one processed submission. `signals` must already be reduced to
/// non-identifying facts (counts, enum labels, elapsed seconds).
pub fn log_submission(
    client_identifier: &str,
    status: SubmissionStatus,
    id: &str,
    signals: &Value,
    meta: Option<&Map<String, Value>>,
) {
    let client = hash_identifier(client_identifier);
    match sanitize_meta(meta) {
        Some(safe_meta) => {
            // Built outside the macro: tracing's valueset expansion brings
            // its own `Value` trait into scope, shadowing serde_json's.
            let safe_meta = Value::Object(safe_meta);
            info!(
                status = status.as_str(),
                id,
                client = %client,
                signals = %signals,
                meta = %safe_meta,
                "contact submission"
            );
        }
        None => info!(
            status = status.as_str(),
            id,
            client = %client,
            signals = %signals,
            "contact submission"
        ),
    }
}

/// Log a refused attempt from a client that is over its allowance.
pub fn log_rate_limited(client_identifier: &str, retry_after_seconds: u64) {
    warn!(
        client = %hash_identifier(client_identifier),
        retry_after_seconds,
        "contact rate limited"
    );
}
