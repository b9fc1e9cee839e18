//! `reqwest::blocking` transport

use reqwest::blocking::{Client, RequestBuilder, multipart};

use apicase_core::RequestBody;

use super::{HttpRequest, HttpResponse, Transport, TransportError, timeout_message};

/// Transport backed by a shared `reqwest::blocking::Client`.
///
/// The client has no global timeout; each request carries its own.
/// `status_text` is the canonical reason for the status code; a custom reason
/// phrase sent by the server is not preserved.
pub struct BlockingTransport {
    client: Client,
}

impl BlockingTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend init).
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("apicase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for BlockingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|_| TransportError::new(format!("invalid HTTP method '{}'", request.method)))?;

        let mut req = self.client.request(method, &request.url);
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }
        req = attach_body(req, &request.body);

        let resp = req.send().map_err(|e| map_error(&e, request))?;

        let status = resp.status();
        let status_code = status.as_u16();
        // reqwest exposes no reason phrase of its own
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();

        // The body can still time out or break after the status line arrived
        let body = resp
            .text()
            .map_err(|e| map_error(&e, request).with_partial(status_code, status_text.clone()))?;

        Ok(HttpResponse {
            status: status_code,
            status_text,
            headers,
            body,
        })
    }
}

fn attach_body(req: RequestBuilder, body: &RequestBody) -> RequestBuilder {
    match body {
        RequestBody::Empty => req,
        RequestBody::Json(value) => req.json(value),
        RequestBody::Fields(map) => req.json(map),
        RequestBody::Text(text) | RequestBody::Rendered(text) => req.body(text.clone()),
        RequestBody::Multipart(fields) => {
            let form = fields.iter().fold(multipart::Form::new(), |form, f| {
                form.text(f.key.clone(), f.value.clone())
            });
            req.multipart(form)
        }
    }
}

fn map_error(err: &reqwest::Error, request: &HttpRequest) -> TransportError {
    let message = if err.is_timeout() {
        timeout_message(request.timeout)
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    let mut mapped = TransportError::new(message);
    if let Some(status) = err.status() {
        mapped = mapped.with_partial(status.as_u16(), status.canonical_reason().unwrap_or(""));
    }
    mapped
}
