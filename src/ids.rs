//! Request identity.
//!
//! Every [`Request`](crate::http::Request) carries a [`RequestId`] that
//! tags its log span. Front ends adopt an incoming `X-Request-Id` when it
//! holds a valid ULID and mint a fresh one otherwise.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::http::HeaderMap;

/// Header a caller may use to propagate its own request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ULID-backed request identifier; sorts by creation time.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Adopt `header_value` when it parses as a ULID.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.trim().parse::<RequestId>().ok())
            .unwrap_or_default()
    }

    /// Id for a request carrying `headers`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header_or_new(headers.get(REQUEST_ID_HEADER))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_reused_when_valid() {
        let id = RequestId::new();
        let parsed = RequestId::from_header_or_new(Some(&format!(" {id} ")));
        assert_eq!(parsed, id);
    }

    #[test]
    fn garbage_header_yields_fresh_id() {
        let a = RequestId::from_header_or_new(Some("not-a-ulid"));
        let b = RequestId::from_header_or_new(None);
        assert_ne!(a, b);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let id = RequestId::new();
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", id.to_string());
        assert_eq!(RequestId::from_headers(&headers), id);
    }
}
