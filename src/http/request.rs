use http::Method;

use super::headers::HeaderMap;
use crate::ids::RequestId;
use crate::router::ParamVec;

/// An inbound request as seen by middleware and actions.
///
/// The kernel treats requests as read-only once processing starts.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Routing path, without query string
    pub path: String,
    pub query_params: ParamVec,
    pub headers: HeaderMap,
    pub cookies: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// `1.0`, `1.1`, `2`
    pub protocol_version: String,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            query_params: ParamVec::new(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
            protocol_version: "1.1".to_string(),
        }
    }

    /// Minimal `GET /` request used when a fault leaves no request context.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(Method::GET, "/")
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20` this
    /// returns `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Short representation type the client asked for (`json`, `html`, ...),
    /// or `default` when the `Accept` header is absent or only wildcards.
    #[must_use]
    pub fn negotiated_type(&self, default: &str) -> String {
        self.get_header("accept")
            .and_then(negotiate)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Pick the preferred representation from an `Accept` header.
///
/// Media ranges are ordered by their `q` weight (stable for ties). Wildcard
/// ranges yield `None` so the caller can apply its default.
#[must_use]
pub fn negotiate(accept: &str) -> Option<String> {
    let mut ranges: Vec<(&str, f32)> = accept
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let media = pieces.next()?.trim();
            if media.is_empty() {
                return None;
            }
            let q = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((media, q))
        })
        .filter(|(_, q)| *q > 0.0)
        .collect();
    ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (media, _) = ranges.first()?;
    let media = media.to_ascii_lowercase();
    let short = match media.as_str() {
        "application/json" | "text/json" => "json",
        "application/xml" | "text/xml" => "xml",
        "text/html" | "application/xhtml+xml" => "html",
        "text/plain" => "text",
        "application/javascript" | "text/javascript" => "javascript",
        m if m.ends_with("+json") => "json",
        m if m.ends_with("+xml") => "xml",
        m if m.ends_with("/*") => return None,
        m => return Some(m.rsplit('/').next().unwrap_or(m).to_string()),
    };
    Some(short.to_string())
}
