// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Generators for client identifiers and form payloads.

use serde_json::{json, Value};

/// Distinct client addresses drawn from a private range.
pub fn client_pool(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| format!("10.{}.{}.{}", (index >> 16) & 0xff, (index >> 8) & 0xff, index & 0xff))
        .collect()
}

/// A valid submission with fields varied by `index` so payloads stay
/// distinguishable in failure output.
pub fn submission(index: usize) -> Value {
    json!({
        "name": format!("Owner {index}"),
        "email": format!("owner{index}@example.com"),
        "preferredMethod": "Email",
        "propertyAddresses": format!("{index} Lakeview Dr"),
        "services": ["Full-service Hosting"],
        "message": "Looking for full management of a lakeside cabin.",
        "agree": true,
        "secondsElapsed": 30.0 + index as f64
    })
}

/// A submission with the honeypot field tripped.
pub fn honeypot_submission(index: usize) -> Value {
    let mut payload = submission(index);
    payload["company"] = json!("Cheap SEO Experts");
    payload
}
