use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Cookie expiry as supplied by application code.
///
/// Emission normalizes every form to a unix timestamp; `0` means a session
/// cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expires {
    #[default]
    Session,
    At(i64),
    /// A date string in RFC 2822, RFC 3339, `YYYY-MM-DD HH:MM:SS` or
    /// `YYYY-MM-DD` form, interpreted as UTC when no offset is given.
    Text(String),
}

impl Expires {
    /// Normalize to a unix timestamp. Unparseable text yields `None`.
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Expires::Session => Some(0),
            Expires::At(ts) => Some(*ts),
            Expires::Text(text) => parse_date(text),
        }
    }
}

fn parse_date(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(ts) = text.parse::<i64>() {
        return Some(ts);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Format a unix timestamp as an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`).
#[must_use]
pub fn http_date(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// An outgoing cookie record. The kernel does not interpret cookies; it only
/// hands them to the transport at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: Expires,
    pub path: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: Expires::Session,
            path: "/".to_string(),
            domain: String::new(),
            secure: false,
            http_only: false,
        }
    }

    #[must_use]
    pub fn expires(mut self, expires: Expires) -> Self {
        self.expires = expires;
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}
