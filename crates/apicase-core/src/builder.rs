//! Request builder - test case → concrete request
//!
//! Two pure entry points share one result shape:
//!
//! - [`build_request`] produces what goes on the wire.
//! - [`build_snapshot`] produces a printable form for storage, listings and
//!   `.http` exports, optionally with secrets masked.
//!
//! The variant of [`RequestBody`] tells the two apart.

use base64::Engine;
use serde_json::{Map, Value};

use crate::model::{ApiKeyLocation, AuthType, BodyType, KeyValue, Method, TestCase};

/// Warning raised when a raw body is sent as literal text.
pub const INVALID_JSON_WARNING: &str = "Raw body is not valid JSON; sending as text.";

/// Query parameter name used when an api key has no explicit name.
pub const DEFAULT_API_KEY_PARAM: &str = "apiKey";

/// Header name used when an api key has no explicit name.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Replacement for secret values in snapshots.
pub const MASK: &str = "***";

/// Headers whose values are secrets.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "x-auth-token",
    "cookie",
    "set-cookie",
    "proxy-authorization",
];

/// Body of a built request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body at all
    Empty,
    /// Parsed JSON, sent as `application/json`
    Json(Value),
    /// Literal text (raw body that failed to parse)
    Text(String),
    /// Multipart form fields, in order
    Multipart(Vec<KeyValue>),
    /// Form fields as a plain object, sent with default (JSON) encoding
    Fields(Map<String, Value>),
    /// Printable rendering, produced only by [`build_snapshot`]
    Rendered(String),
}

impl RequestBody {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A concrete request derived from a test case.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub method: Method,
    pub url: String,
    /// Header name/value pairs, unique by case-insensitive name
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Body is multipart; the transport sets `Content-Type` with the boundary
    pub form_encoded: bool,
    pub warning: Option<String>,
}

impl BuiltRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Build the wire request for a test case.
///
/// `multipart_supported` is the transport's capability; without it form data
/// falls back to a plain key → value object.
#[must_use]
pub fn build_request(case: &TestCase, multipart_supported: bool) -> BuiltRequest {
    let (body, form_encoded, warning) = wire_body(case, multipart_supported);
    assemble(case, body, form_encoded, warning, false)
}

/// Build the printable snapshot of a test case.
///
/// JSON bodies are pretty-printed, form fields become `key=value` lines.
/// With `mask_secrets`, sensitive header values and query api keys become `***`.
#[must_use]
pub fn build_snapshot(case: &TestCase, mask_secrets: bool) -> BuiltRequest {
    let (body, form_encoded, warning) = wire_body(case, true);
    let rendered = match body {
        RequestBody::Empty => RequestBody::Empty,
        RequestBody::Json(v) => RequestBody::Rendered(
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()),
        ),
        RequestBody::Text(t) | RequestBody::Rendered(t) => RequestBody::Rendered(t),
        RequestBody::Multipart(fields) => RequestBody::Rendered(
            fields
                .iter()
                .map(|f| format!("{}={}", f.key, f.value))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        RequestBody::Fields(map) => RequestBody::Rendered(Value::Object(map).to_string()),
    };
    assemble(case, rendered, form_encoded, warning, mask_secrets)
}

/// Returns true if the header name is a known secret-bearing header.
#[must_use]
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|&h| name.eq_ignore_ascii_case(h))
}

fn assemble(
    case: &TestCase,
    body: RequestBody,
    form_encoded: bool,
    warning: Option<String>,
    mask_secrets: bool,
) -> BuiltRequest {
    let mut headers: Vec<(String, String)> = Vec::new();
    for kv in &case.headers {
        let key = kv.key.trim();
        if key.is_empty() {
            continue;
        }
        set_header(&mut headers, key, &kv.value);
    }

    let auth = &case.auth;
    let mut url = case.url.clone();
    let mut key_header = None;
    match case.auth_type {
        AuthType::None => {}
        AuthType::Bearer => {
            if !auth.token.is_empty() {
                set_header(
                    &mut headers,
                    "Authorization",
                    &format!("Bearer {}", auth.token),
                );
            }
        }
        AuthType::Basic => {
            if !auth.username.is_empty() && !auth.password.is_empty() {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", auth.username, auth.password));
                set_header(&mut headers, "Authorization", &format!("Basic {encoded}"));
            }
        }
        AuthType::ApiKey => {
            if !auth.api_key.is_empty() {
                let name = auth.api_key_name.trim();
                match auth.api_key_location {
                    ApiKeyLocation::Header => {
                        let name = if name.is_empty() {
                            DEFAULT_API_KEY_HEADER
                        } else {
                            name
                        };
                        set_header(&mut headers, name, &auth.api_key);
                        key_header = Some(name.to_string());
                    }
                    ApiKeyLocation::Query => {
                        let name = if name.is_empty() {
                            DEFAULT_API_KEY_PARAM
                        } else {
                            name
                        };
                        url = if mask_secrets {
                            let sep = if url.contains('?') { '&' } else { '?' };
                            format!("{url}{sep}{}={MASK}", urlencoding::encode(name))
                        } else {
                            append_query(&url, name, &auth.api_key)
                        };
                    }
                }
            }
        }
    }

    if form_encoded {
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
    }

    if mask_secrets {
        for (k, v) in &mut headers {
            let is_key_header = key_header
                .as_deref()
                .is_some_and(|h| k.eq_ignore_ascii_case(h));
            if is_sensitive_header(k) || is_key_header {
                *v = MASK.to_string();
            }
        }
    }

    BuiltRequest {
        method: case.method,
        url,
        headers,
        body,
        form_encoded,
        warning,
    }
}

/// Insert or overwrite a header, matching names case-insensitively.
///
/// An overwritten header keeps its original position and takes the new name.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(slot) = headers
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
    {
        *slot = (name.to_string(), value.to_string());
    } else {
        headers.push((name.to_string(), value.to_string()));
    }
}

/// Append `name=value` (both percent-encoded) to a URL.
fn append_query(url: &str, name: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!(
        "{url}{sep}{}={}",
        urlencoding::encode(name),
        urlencoding::encode(value)
    )
}

/// `(body, form_encoded, warning)` for the wire.
fn wire_body(case: &TestCase, multipart_supported: bool) -> (RequestBody, bool, Option<String>) {
    if case.method == Method::Get {
        return (RequestBody::Empty, false, None);
    }

    match case.body_type {
        BodyType::Raw => {
            if case.raw_body.trim().is_empty() {
                return (RequestBody::Empty, false, None);
            }
            match serde_json::from_str::<Value>(&case.raw_body) {
                Ok(v) => (RequestBody::Json(v), false, None),
                Err(_) => (
                    RequestBody::Text(case.raw_body.clone()),
                    false,
                    Some(INVALID_JSON_WARNING.to_string()),
                ),
            }
        }
        BodyType::FormData => {
            let fields: Vec<KeyValue> = case
                .form_data
                .iter()
                .filter(|f| !f.key.trim().is_empty())
                .cloned()
                .collect();
            if fields.is_empty() {
                (RequestBody::Empty, false, None)
            } else if multipart_supported {
                (RequestBody::Multipart(fields), true, None)
            } else {
                let map = fields
                    .into_iter()
                    .map(|f| (f.key, Value::String(f.value)))
                    .collect();
                (RequestBody::Fields(map), false, None)
            }
        }
    }
}
