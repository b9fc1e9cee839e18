//! Field-scoped test case validation
//!
//! Runs before any network activity. Errors block saving a case; warnings
//! are shown but do not block. A run only requires a URL.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{AuthType, BodyType, Method, TestCase};

/// A validation check result for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    /// Field name as stored, e.g. `url`, `auth.token`
    pub field: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl Validation {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            status: ValidationStatus::Error,
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            status: ValidationStatus::Warning,
            message: message.into(),
        }
    }
}

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "CHANGEME",
    "changeme",
    "replace-me",
    "REPLACE_ME",
];

/// Validate a test case. Only problems are reported; an empty list means valid.
#[must_use]
pub fn validate_test_case(case: &TestCase) -> Vec<Validation> {
    let mut checks = Vec::new();

    if case.case_name.trim().is_empty() {
        checks.push(Validation::error("caseName", "name is required"));
    }

    let url = case.url.trim();
    if url.is_empty() {
        checks.push(Validation::error("url", "URL is required"));
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        checks.push(Validation::error(
            "url",
            format!("{url} (must start with http:// or https://)"),
        ));
    }

    if let Some(status) = case.expected_status {
        if !(100..=599).contains(&status) {
            checks.push(Validation::error(
                "expectedStatus",
                format!("{status} is not an HTTP status code"),
            ));
        }
    }

    if let Some(secs) = case.max_response_time {
        if !(secs.is_finite() && secs > 0.0) {
            checks.push(Validation::error(
                "maxResponseTime",
                format!("{secs} (must be a positive number of seconds)"),
            ));
        }
    }

    let auth = &case.auth;
    match case.auth_type {
        AuthType::None => {}
        AuthType::Bearer if auth.token.is_empty() => {
            checks.push(Validation::warning(
                "auth.token",
                "bearer token is empty; no Authorization header will be sent",
            ));
        }
        AuthType::Basic if auth.username.is_empty() || auth.password.is_empty() => {
            checks.push(Validation::warning(
                "auth.username",
                "basic auth needs both username and password; no Authorization header will be sent",
            ));
        }
        AuthType::ApiKey if auth.api_key.is_empty() => {
            checks.push(Validation::warning(
                "auth.apiKey",
                "API key is empty; it will not be sent",
            ));
        }
        _ => {}
    }

    if case.method != Method::Get
        && case.body_type == BodyType::Raw
        && !case.raw_body.trim().is_empty()
        && serde_json::from_str::<serde_json::Value>(&case.raw_body).is_err()
    {
        checks.push(Validation::warning(
            "rawBody",
            "body is not valid JSON; it will be sent as text",
        ));
    }

    for header in &case.headers {
        if looks_like_placeholder(&header.value) {
            checks.push(Validation::warning(
                "headers",
                format!("{}: value looks like a placeholder", header.key),
            ));
        }
    }
    for (field, value) in [("auth.token", &auth.token), ("auth.apiKey", &auth.api_key)] {
        if looks_like_placeholder(value) {
            checks.push(Validation::warning(field, "value looks like a placeholder"));
        }
    }

    checks
}

fn looks_like_placeholder(value: &str) -> bool {
    (value.contains('<') && value.contains('>'))
        || PLACEHOLDER_PATTERNS.iter().any(|p| value.contains(p))
}

/// Returns true if any validation has Error status.
#[must_use]
pub fn has_errors(checks: &[Validation]) -> bool {
    checks.iter().any(|v| v.status == ValidationStatus::Error)
}

/// Format as human-readable terminal lines.
#[must_use]
pub fn to_terminal(checks: &[Validation]) -> String {
    checks
        .iter()
        .map(|v| format!("  [{}] {}: {}", v.status, v.field, v.message))
        .collect::<Vec<_>>()
        .join("\n")
}
