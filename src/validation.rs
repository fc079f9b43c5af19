// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form validation and sanitization.
//!
//! Turns an untrusted JSON object into a typed [`ContactFormData`] or a
//! map of per-field error messages. Every field is checked independently;
//! the validator never stops at the first failure, so one response can
//! surface the complete set of corrections.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Longest accepted message, in characters.
const MESSAGE_MAX_CHARS: usize = 1_000;

/// Per-field error messages, keyed by the form's field names.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// How the submitter prefers to be contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredMethod {
    Email,
    Phone,
    Text,
}

impl PreferredMethod {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "Email" => Some(Self::Email),
            "Phone" => Some(Self::Phone),
            "Text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Text => "Text",
        }
    }
}

/// Preferred time of day for a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredTime {
    Morning,
    Afternoon,
    Evening,
}

impl PreferredTime {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "Morning" => Some(Self::Morning),
            "Afternoon" => Some(Self::Afternoon),
            "Evening" => Some(Self::Evening),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

/// Where the property is currently listed, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOption {
    No,
    Airbnb,
    Vrbo,
    DirectSite,
    Other,
}

impl ListingOption {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "No" => Some(Self::No),
            "Yes – Airbnb" => Some(Self::Airbnb),
            "Yes – VRBO" => Some(Self::Vrbo),
            "Yes – Direct Site" => Some(Self::DirectSite),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Airbnb => "Yes – Airbnb",
            Self::Vrbo => "Yes – VRBO",
            Self::DirectSite => "Yes – Direct Site",
            Self::Other => "Other",
        }
    }
}

/// Services the form can express interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOption {
    FullServiceHosting,
    SetupOnly,
    StagingAndDesign,
    DigitalGuidebook,
    DirectBookingWebsite,
    PricingOptimization,
}

impl ServiceOption {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "Full-service Hosting" => Some(Self::FullServiceHosting),
            "Setup Only" => Some(Self::SetupOnly),
            "Staging & Design" => Some(Self::StagingAndDesign),
            "Digital Guidebook" => Some(Self::DigitalGuidebook),
            "Direct Booking Website" => Some(Self::DirectBookingWebsite),
            "Pricing Optimization" => Some(Self::PricingOptimization),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullServiceHosting => "Full-service Hosting",
            Self::SetupOnly => "Setup Only",
            Self::StagingAndDesign => "Staging & Design",
            Self::DigitalGuidebook => "Digital Guidebook",
            Self::DirectBookingWebsite => "Direct Booking Website",
            Self::PricingOptimization => "Pricing Optimization",
        }
    }
}

/// A validated, sanitized contact form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactFormData {
    pub name: String,
    /// Lowercased, trimmed email address.
    pub email: String,
    pub phone: Option<String>,
    pub preferred_method: PreferredMethod,
    pub preferred_time: Option<PreferredTime>,
    /// At least one non-empty address line.
    pub property_addresses: Vec<String>,
    pub currently_listed: ListingOption,
    /// Normalized listing URLs; omitted entirely when none were given.
    pub listed_links: Option<Vec<String>>,
    /// Deduplicated, in submission order.
    pub services: Vec<ServiceOption>,
    pub desired_start_date: Option<String>,
    pub message: String,
    pub agree: bool,
    /// Honeypot field; humans leave it empty.
    pub company: Option<String>,
    pub started_at: Option<f64>,
    pub seconds_elapsed: Option<f64>,
    pub looks_spam: Option<bool>,
    /// Client-supplied page context, sanitized later at the logging edge.
    pub meta: Option<Map<String, Value>>,
}

/// Validate a decoded JSON object against the contact form's rules.
///
/// All fields are checked; failures accumulate per field and the whole
/// set is returned at once. Success yields the sanitized record.
pub fn validate_contact_form(payload: &Map<String, Value>) -> Result<ContactFormData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = sanitize_string(payload.get("name"));
    if name.is_empty() {
        add_error(&mut errors, "name", "Name is required.");
    }

    let email = sanitize_string(payload.get("email")).to_lowercase();
    if email.is_empty() || !is_valid_email(&email) {
        add_error(&mut errors, "email", "Enter a valid email.");
    }

    let phone = sanitize_optional_string(payload.get("phone"));

    let preferred_method =
        PreferredMethod::from_raw(&sanitize_string(payload.get("preferredMethod")));
    if preferred_method.is_none() {
        add_error(
            &mut errors,
            "preferredMethod",
            "Preferred contact method is required.",
        );
    }

    let preferred_time = PreferredTime::from_raw(&sanitize_string(payload.get("preferredTime")));

    let property_addresses = parsed_or_raw_lines(payload, "propertyAddressesParsed", "propertyAddresses");
    if property_addresses.is_empty() {
        add_error(
            &mut errors,
            "propertyAddresses",
            "Provide at least one property address.",
        );
    }

    let currently_listed = ListingOption::from_raw(&sanitize_string(payload.get("currentlyListed")))
        .unwrap_or(ListingOption::No);

    let listed_links = normalize_urls(parsed_or_raw_lines(payload, "listedLinksParsed", "listedLinks"));
    if currently_listed != ListingOption::No && listed_links.is_empty() {
        add_error(&mut errors, "listedLinks", "Include at least one listing link.");
    }

    let services = collect_services(payload.get("services"));
    if services.is_empty() {
        add_error(
            &mut errors,
            "services",
            "Select at least one service of interest.",
        );
    }

    let desired_start_date = sanitize_optional_string(payload.get("desiredStartDate"));
    if let Some(date) = &desired_start_date {
        if !is_date_shaped(date) {
            add_error(
                &mut errors,
                "desiredStartDate",
                "Start date must be YYYY-MM-DD.",
            );
        }
    }

    let message = sanitize_string(payload.get("message"));
    if message.is_empty() {
        add_error(
            &mut errors,
            "message",
            "Tell us a bit about your property or goals.",
        );
    } else if message.chars().count() > MESSAGE_MAX_CHARS {
        add_error(
            &mut errors,
            "message",
            "Message must be 1000 characters or fewer.",
        );
    }

    let agree = truthy(payload.get("agree"));
    if !agree {
        add_error(&mut errors, "agree", "Consent is required.");
    }

    let company = sanitize_optional_string(payload.get("company"));
    let started_at = payload.get("startedAt").and_then(Value::as_f64);
    let seconds_elapsed = payload.get("secondsElapsed").and_then(Value::as_f64);
    let looks_spam = payload.get("looksSpam").and_then(Value::as_bool);
    let meta = payload.get("meta").and_then(Value::as_object).cloned();

    match preferred_method {
        Some(preferred_method) if errors.is_empty() => Ok(ContactFormData {
            name,
            email,
            phone,
            preferred_method,
            preferred_time,
            property_addresses,
            currently_listed,
            listed_links: (!listed_links.is_empty()).then_some(listed_links),
            services,
            desired_start_date,
            message,
            agree,
            company,
            started_at,
            seconds_elapsed,
            looks_spam,
            meta,
        }),
        _ => Err(errors),
    }
}

fn add_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Trimmed string content, or empty for anything that is not a string.
fn sanitize_string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Trimmed string content, with blanks and non-strings collapsed to `None`.
fn sanitize_optional_string(value: Option<&Value>) -> Option<String> {
    let trimmed = value.and_then(Value::as_str)?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The pre-parsed array when the client sent one, otherwise the raw field
/// split on newlines. Both paths trim entries and drop blanks.
fn parsed_or_raw_lines(payload: &Map<String, Value>, parsed_key: &str, raw_key: &str) -> Vec<String> {
    match payload.get(parsed_key) {
        Some(parsed @ Value::Array(_)) => to_string_list(Some(parsed)),
        _ => to_string_list(payload.get(raw_key)),
    }
}

/// Accepts either an array of strings or one newline-separated string.
fn to_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => text
            .split('\n')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Prefix bare links with `https://`; anything already carrying an
/// http(s) scheme passes through untouched.
fn normalize_urls(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .map(|link| {
            if has_http_scheme(&link) {
                link
            } else {
                format!("https://{link}")
            }
        })
        .collect()
}

fn has_http_scheme(link: &str) -> bool {
    let lowered = link.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Recognized service labels, deduplicated in submission order; unknown
/// entries are dropped silently.
fn collect_services(value: Option<&Value>) -> Vec<ServiceOption> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let mut services = Vec::new();
    for item in items {
        let Some(raw) = item.as_str() else {
            continue;
        };
        if let Some(service) = ServiceOption::from_raw(raw.trim()) {
            if !services.contains(&service) {
                services.push(service);
            }
        }
    }
    services
}

/// Shape check for `local@domain.tld`: no whitespace, exactly one `@`,
/// and a dot strictly inside the domain part. Deliverability is not
/// checked here.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Positional `YYYY-MM-DD` shape check; calendar validity is not
/// enforced, matching the form's historical behavior.
fn is_date_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// JSON-value truthiness as the form's clients coerced it: `null`,
/// `false`, zero, and the empty string are false; everything else is
/// true, including `"false"` and `"0"`.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
