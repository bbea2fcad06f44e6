/// HTTP transport seam.
///
/// Resource clients build [`ApiRequest`] values and hand them to a
/// [`Transport`]. Production uses [`UreqTransport`] (synchronous `ureq`);
/// tests substitute [`super::mock::MockTransport`].
///
/// A transport only reports *transport* failures. Any response that
/// arrives, whatever its status, comes back as an [`ApiResponse`] and the
/// resource layer decides whether it is a rejection.
use std::io::Read;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::ConsoleError;

// ---------------------------------------------------------------------------
// Request / response values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the backend origin.
///
/// `path` is already percent-encoded and starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a body together with its `Content-Type`.
    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut request = self.with_header("Content-Type", content_type);
        request.body = Some(body.into());
        request
    }

    /// Look up a header value (case-insensitive name match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8 (lossy), for assertions and logging.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Status text as sent by the server (`"OK"`, `"Not Found"`, ...).
    pub reason: String,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, exactly as sent. Bytes that are not UTF-8 are an error.
    pub fn text(&self) -> Result<String, ConsoleError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| ConsoleError::MalformedResponse(format!("response is not UTF-8: {e}")))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ConsoleError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ConsoleError::MalformedResponse(format!("invalid JSON response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Sends one request and waits for the complete response.
pub trait Transport {
    /// Returns `Err(ConsoleError::Transport)` only when no response was
    /// received. Non-2xx statuses are returned as `Ok`.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConsoleError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConsoleError> {
        (**self).send(request)
    }
}

// ---------------------------------------------------------------------------
// ureq implementation
// ---------------------------------------------------------------------------

/// Blocking transport over a shared `ureq` agent.
///
/// Every request carries the configured timeout so a hung backend cannot
/// leave the loading indicator up forever.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConsoleError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut call = self.agent.request(request.method.as_str(), &url);
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let result = match &request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(ConsoleError::Transport(format!(
                    "{} {} failed: {err}",
                    request.method, request.path
                )));
            }
        };

        let status = response.status();
        let reason = response.status_text().to_string();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| ConsoleError::Transport(format!("failed to read response body: {e}")))?;

        Ok(ApiResponse {
            status,
            reason,
            body,
        })
    }
}
