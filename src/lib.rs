// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! Server-side pipeline behind a marketing site's contact form:
//!
//! - Sliding-window rate limiting per client (5 per minute by default)
//! - Size- and content-type-guarded JSON body reading (16 KiB by default)
//! - Collect-all-errors validation and sanitization
//! - Honeypot and client-flag spam screening with a decoy acknowledgment
//! - Structured logging with hashed client identifiers and whitelisted meta

pub mod config;
pub mod handlers;
pub mod limiter;
pub mod logging;
pub mod reader;
pub mod validation;

pub use config::Config;
pub use limiter::{RateLimitResult, SlidingWindowRateLimiter};
pub use reader::{read_json_body, BodyRejection};
pub use validation::{validate_contact_form, ContactFormData, FieldErrors};
