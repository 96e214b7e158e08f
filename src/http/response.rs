use http::StatusCode;
use serde_json::Value;

use super::cookie::Cookie;
use super::headers::HeaderMap;
use super::request::Request;

/// Canonical reason phrase for `status`, empty when unknown.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// The outbound response.
///
/// Status, header and cookie mutators work in place and return `&mut Self`
/// for chaining; body writes always append to the same buffer. Exactly one
/// response is emitted per request.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: Option<String>,
    protocol_version: String,
    headers: HeaderMap,
    cookies: Vec<Cookie>,
    body: Vec<u8>,
    negotiated_type: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            reason: None,
            protocol_version: "1.1".to_string(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
            negotiated_type: None,
        }
    }

    /// A fresh response aligned with `req`: same protocol version and the
    /// representation type negotiated from its `Accept` header.
    #[must_use]
    pub fn prepare(req: &Request, default_type: &str) -> Self {
        let mut res = Self::new();
        res.protocol_version = req.protocol_version.clone();
        res.negotiated_type = Some(req.negotiated_type(default_type));
        res
    }

    /// Create a JSON response
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut res = Self::new();
        res.set_status(status)
            .set_header("Content-Type", "application/json;charset=utf-8");
        res.write(body.to_string());
        res
    }

    /// Create a plain-text response
    #[must_use]
    pub fn text(status: u16, body: impl AsRef<[u8]>) -> Self {
        let mut res = Self::new();
        res.set_status(status)
            .set_header("Content-Type", "text/plain;charset=utf-8");
        res.write(body);
        res
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status and reset the reason phrase to its canonical form.
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self.reason = None;
        self
    }

    pub fn set_status_with_reason(&mut self, status: u16, reason: impl Into<String>) -> &mut Self {
        self.status = status;
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        self.reason
            .as_deref()
            .unwrap_or_else(|| status_reason(self.status))
    }

    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn set_protocol_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.protocol_version = version.into();
        self
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get a header by name, all values joined with `,`
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get_line(name)
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn append_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn add_cookie(&mut self, cookie: Cookie) -> &mut Self {
        self.cookies.push(cookie);
        self
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, lossy.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Append to the body in place.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Representation type negotiated for this exchange, if prepared.
    #[must_use]
    pub fn negotiated_type(&self) -> Option<&str> {
        self.negotiated_type.as_deref()
    }

    pub fn set_negotiated_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.negotiated_type = Some(ty.into());
        self
    }

    /// Statuses that must not carry a body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.status, 100..=199 | 204 | 205 | 304)
    }
}
