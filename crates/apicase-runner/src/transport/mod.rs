//! HTTP client boundary
//!
//! A [`Transport`] sends one request and reports every HTTP status as a
//! response; only network-level problems (DNS, connect, timeout, broken
//! body) are errors. Pass/fail is decided by the runner.

mod blocking;

use std::time::Duration;

use apicase_core::{Method, RequestBody};

pub use blocking::BlockingTransport;

/// Everything needed to issue one call.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

/// A complete response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Status line of a response that failed part-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResponse {
    pub status: u16,
    pub status_text: String,
}

/// Network-level failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// Present when a status line arrived before the failure
    pub partial: Option<PartialResponse>,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            partial: None,
        }
    }

    #[must_use]
    pub fn with_partial(mut self, status: u16, status_text: impl Into<String>) -> Self {
        self.partial = Some(PartialResponse {
            status,
            status_text: status_text.into(),
        });
        self
    }
}

/// Capability to issue HTTP requests.
pub trait Transport {
    /// Send a request. Non-2xx statuses are `Ok`.
    ///
    /// # Errors
    ///
    /// Returns error on network failure, timeout, or an unreadable body.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Whether multipart bodies can be sent.
    fn supports_multipart(&self) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }

    fn supports_multipart(&self) -> bool {
        (**self).supports_multipart()
    }
}

/// Timeout message for a call limited to `timeout`.
#[must_use]
pub fn timeout_message(timeout: Option<Duration>) -> String {
    match timeout {
        Some(t) => format!("timeout of {}ms exceeded", t.as_millis()),
        None => "request timed out".to_string(),
    }
}
