//! Test case and outcome records
//!
//! Plain data, serialized in the camelCase layout the store uses on disk.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HTTP method of a test case.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported method '{other}'")),
        }
    }
}

/// Authorization scheme applied by the request builder.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum AuthType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "bearer")]
    Bearer,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "apiKey", alias = "apikey")]
    ApiKey,
}

/// Where an API key is placed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// Request body flavour (ignored for GET).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum BodyType {
    #[default]
    #[serde(rename = "raw")]
    Raw,
    #[serde(rename = "form-data")]
    FormData,
}

/// An ordered key/value entry, used for headers and form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Credentials for every auth type; only the fields of the active type are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Auth {
    pub token: String,
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub api_key_location: ApiKeyLocation,
    pub api_key_name: String,
}

/// A saved, named HTTP request configuration with pass/fail criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub case_name: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub raw_body: String,
    #[serde(default)]
    pub form_data: Vec<KeyValue>,
    /// `None` means any 2xx passes
    #[serde(default)]
    pub expected_status: Option<u16>,
    /// Seconds; `None` means no timeout
    #[serde(default)]
    pub max_response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<LastRun>,
}

impl TestCase {
    /// A fresh GET case with a random id.
    #[must_use]
    pub fn new(case_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            case_name: case_name.into(),
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            auth_type: AuthType::None,
            auth: Auth::default(),
            body_type: BodyType::Raw,
            raw_body: String::new(),
            form_data: Vec::new(),
            expected_status: None,
            max_response_time: None,
            last_run: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }

    #[must_use]
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body_type = BodyType::Raw;
        self.raw_body = body.into();
        self
    }

    #[must_use]
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_type = BodyType::FormData;
        self.form_data.push(KeyValue::new(key, value));
        self
    }

    #[must_use]
    pub fn with_expected_status(mut self, status: Option<u16>) -> Self {
        self.expected_status = status;
        self
    }

    #[must_use]
    pub fn with_max_response_time(mut self, seconds: Option<f64>) -> Self {
        self.max_response_time = seconds;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth_type: AuthType, auth: Auth) -> Self {
        self.auth_type = auth_type;
        self.auth = auth;
        self
    }

    /// `"METHOD URL"`, the fallback display label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Copy with a new id, a "(copy)" suffix and no last run.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            case_name: format!("{} (copy)", self.case_name),
            last_run: None,
            ..self.clone()
        }
    }
}

/// Result of executing one test case once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub case_id: String,
    pub case_name: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub time_ms: u64,
    #[serde(default)]
    pub expected_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub executed_at: DateTime<Utc>,
}

/// The outcome summary kept on a test case after execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastRun {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub executed_at: DateTime<Utc>,
}

impl From<&Outcome> for LastRun {
    fn from(outcome: &Outcome) -> Self {
        Self {
            ok: outcome.ok,
            status: outcome.status,
            status_text: outcome.status_text.clone(),
            time_ms: outcome.time_ms,
            warning: outcome.warning.clone(),
            error: outcome.error.clone(),
            executed_at: outcome.executed_at,
        }
    }
}

/// Attach each outcome to its test case as `last_run`.
///
/// Outcomes whose `case_id` matches no case are ignored.
pub fn attach_last_runs(cases: &mut [TestCase], outcomes: &[Outcome]) {
    for outcome in outcomes {
        if let Some(case) = cases.iter_mut().find(|c| c.id == outcome.case_id) {
            case.last_run = Some(LastRun::from(outcome));
        }
    }
}
