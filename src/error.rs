//! Error taxonomy shared across the kernel.
//!
//! Request-time code returns `anyhow::Result`; the typed errors below ride
//! inside `anyhow::Error` and are recovered by downcasting in the exception
//! gateway. [`ValidationError`] is boot-time only and is never expected to
//! reach the gateway.

use http::Method;
use thiserror::Error;

use crate::config::ConfigError;

/// Malformed route or kernel registration. Fatal at boot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// No route could serve the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("no route matches {method} {path}")]
    NotFound { method: Method, path: String },
    /// The path is registered, but not for this method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },
}

impl RoutingError {
    /// HTTP status this failure maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RoutingError::NotFound { .. } => 404,
            RoutingError::MethodNotAllowed { .. } => 405,
        }
    }

    /// Headers the response must carry (`Allow` for 405).
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            RoutingError::NotFound { .. } => Vec::new(),
            RoutingError::MethodNotAllowed { allowed, .. } => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![("Allow".to_string(), allow)]
            }
        }
    }
}

/// A failure that carries its own intended HTTP status and headers.
///
/// These are developer-authored responses, so their message is shown to the
/// client even outside debug mode.
///
/// ```
/// use ant_kernel::error::HttpError;
///
/// let err = HttpError::new(406, "only JSON is served here")
///     .with_header("Vary", "Accept");
/// assert_eq!(err.status(), 406);
/// assert_eq!(err.headers().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} {message}")]
pub struct HttpError {
    status: u16,
    message: String,
    headers: Vec<(String, String)>,
    code: Option<i64>,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            headers: Vec::new(),
            code: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::new(406, message)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Application-level error code reported in structured payloads.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.code
    }
}

/// Boot-time failures surfaced by the kernel builder and the CLI.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}
